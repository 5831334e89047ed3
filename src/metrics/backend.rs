use crate::error::BoxError;

/// Unit attached to a published value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricUnit {
    Percent,
}

impl MetricUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricUnit::Percent => "Percent",
        }
    }
}

/// A single data point, ready to be sent to the metrics backend.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricDatum {
    pub namespace: String,
    pub metric_name: String,
    pub dimensions: Vec<(String, String)>,
    pub value: f64,
    pub unit: MetricUnit,
    /// Storage resolution hint, in seconds.
    pub storage_resolution: u32,
    /// Timestamp (in UNIX epoch seconds)
    pub timestamp: u64,
}

pub trait MetricsBackend {
    fn put_metric(
        &self,
        datum: &MetricDatum,
    ) -> impl std::future::Future<Output = Result<(), BoxError>> + Send;
}
