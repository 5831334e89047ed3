use aws_sdk_cloudwatch::Client;
use aws_sdk_cloudwatch::primitives::DateTime;
use aws_sdk_cloudwatch::types::{Dimension, StandardUnit};

use crate::error::BoxError;

use super::{MetricDatum, MetricUnit, MetricsBackend};

/// Publishes data points as CloudWatch custom metrics.
#[derive(Debug, Clone)]
pub struct CloudWatchMetricsBackend {
    client: Client,
}

impl CloudWatchMetricsBackend {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_conf(config: &aws_config::SdkConfig) -> Self {
        Self::new(Client::new(config))
    }
}

pub(crate) fn standard_unit(unit: MetricUnit) -> StandardUnit {
    match unit {
        MetricUnit::Percent => StandardUnit::Percent,
    }
}

pub(crate) fn dimensions(pairs: &[(String, String)]) -> Vec<Dimension> {
    pairs
        .iter()
        .map(|(name, value)| Dimension::builder().name(name).value(value).build())
        .collect()
}

impl MetricsBackend for CloudWatchMetricsBackend {
    async fn put_metric(&self, datum: &MetricDatum) -> Result<(), BoxError> {
        let timestamp = i64::try_from(datum.timestamp)?;
        let storage_resolution = i32::try_from(datum.storage_resolution)?;
        let metric = aws_sdk_cloudwatch::types::MetricDatum::builder()
            .metric_name(&datum.metric_name)
            .set_dimensions(Some(dimensions(&datum.dimensions)))
            .value(datum.value)
            .unit(standard_unit(datum.unit))
            .storage_resolution(storage_resolution)
            .timestamp(DateTime::from_secs(timestamp))
            .build();

        self.client
            .put_metric_data()
            .namespace(&datum.namespace)
            .metric_data(metric)
            .send()
            .await?;

        Ok(())
    }
}
