use std::net::SocketAddr;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;

use crate::monitor::UtilizationStore;
use crate::network::SubnetID;
use crate::utilization::UtilizationSample;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to bind status API to `{addr}`: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("status API stopped: {0}")]
    Serve(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, serde::Serialize)]
pub struct UtilizationResponse {
    pub subnets: Vec<UtilizationSample>,
}

async fn list_utilization(State(store): State<Arc<UtilizationStore>>) -> Json<UtilizationResponse> {
    Json(UtilizationResponse {
        subnets: store.snapshot(),
    })
}

async fn subnet_utilization(
    State(store): State<Arc<UtilizationStore>>,
    Path(subnet_id): Path<String>,
) -> Response {
    let Ok(subnet_id) = SubnetID::new(&subnet_id) else {
        return (StatusCode::BAD_REQUEST, "invalid subnet id").into_response();
    };
    match store.get(&subnet_id) {
        Some(sample) => (StatusCode::OK, Json(sample)).into_response(),
        None => (StatusCode::NOT_FOUND, "unknown subnet").into_response(),
    }
}

/// Read-only HTTP view of the latest utilization samples.
pub struct APIServer {
    router: axum::Router,
}

impl APIServer {
    pub fn new(store: Arc<UtilizationStore>) -> Self {
        let router = axum::Router::new()
            .route("/utilization", get(list_utilization))
            .route("/utilization/{subnet_id}", get(subnet_utilization))
            .with_state(store);
        Self { router }
    }

    /// Binds `addr` and serves requests until the server fails.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Bind`] if `addr` cannot be bound and [`Error::Serve`] if
    /// the server stops.
    pub async fn listen(self, addr: SocketAddr) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|source| Error::Bind { addr, source })?;
        log::info!(target: "api", "Serving utilization on http://{addr}/utilization");
        axum::serve(listener, self.router.into_make_service())
            .await
            .map_err(Error::Serve)
    }
}
