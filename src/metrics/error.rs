use crate::network::SubnetID;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to publish metric `{metric_name}` for subnet `{subnet_id}`: {source}")]
    Publish {
        subnet_id: SubnetID,
        metric_name: String,
        #[source]
        source: crate::error::BoxError,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
