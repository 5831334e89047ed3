use crate::utilization::UtilizationSample;

use super::{Error, MetricDatum, MetricUnit, MetricsBackend, Result};

/// Sends utilization samples to a [`MetricsBackend`].
///
/// Each call publishes exactly one datum; there is no batching, retrying or
/// deduplication.
#[derive(Debug, Clone)]
pub struct Publisher<B> {
    backend: B,
    namespace: String,
    prefix: String,
}

impl<B: MetricsBackend + Sync> Publisher<B> {
    pub fn new(backend: B, namespace: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            backend,
            namespace: namespace.into(),
            prefix: prefix.into(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Builds the datum for `sample`.
    pub fn datum(&self, sample: &UtilizationSample) -> MetricDatum {
        MetricDatum {
            namespace: self.namespace.clone(),
            metric_name: super::metric_name(&self.prefix, sample.subnet_id()),
            dimensions: vec![(
                super::SUBNET_DIMENSION.to_owned(),
                sample.subnet_id().to_string(),
            )],
            value: sample.percentage(),
            unit: MetricUnit::Percent,
            storage_resolution: super::STORAGE_RESOLUTION_SECS,
            timestamp: sample.timestamp(),
        }
    }

    /// Publishes `sample` under the subnet's own metric name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Publish`] if the backend rejects the datum.
    pub async fn publish(&self, sample: &UtilizationSample) -> Result<()> {
        let datum = self.datum(sample);
        self.backend
            .put_metric(&datum)
            .await
            .map_err(|source| Error::Publish {
                subnet_id: sample.subnet_id().clone(),
                metric_name: datum.metric_name.clone(),
                source,
            })?;
        log::trace!(
            target: "publisher",
            "Published `{}` = {:.1} to namespace `{}`",
            datum.metric_name,
            datum.value,
            datum.namespace
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeMetricsBackend, subnet};
    use crate::utilization;

    #[tokio::test]
    async fn test_publish_datum() {
        let publisher = Publisher::new(
            FakeMetricsBackend::default(),
            "IP Subnet Monitor",
            "Used IP's",
        );
        let subnet = subnet("subnet-1", "vpc-1", "10.0.1.0/24", 56);
        let sample = utilization::compute(&subnet, 42).unwrap();

        publisher.publish(&sample).await.unwrap();

        let published = publisher.backend().published();
        assert_eq!(published.len(), 1);
        let datum = &published[0];
        assert_eq!(datum.namespace, "IP Subnet Monitor");
        assert_eq!(datum.metric_name, "Used IP's - subnet-1");
        assert_eq!(
            datum.dimensions,
            vec![("Subnets".to_owned(), "subnet-1".to_owned())]
        );
        assert_eq!(datum.value, 78.125);
        assert_eq!(datum.unit, MetricUnit::Percent);
        assert!(datum.storage_resolution <= 60);
        assert_eq!(datum.timestamp, 42);
    }

    #[tokio::test]
    async fn test_publish_failure() {
        let publisher = Publisher::new(
            FakeMetricsBackend::default().failing_for("subnet-1"),
            "ns",
            "prefix",
        );
        let subnet = subnet("subnet-1", "vpc-1", "10.0.1.0/24", 56);
        let sample = utilization::compute(&subnet, 0).unwrap();

        let err = publisher.publish(&sample).await.unwrap_err();
        match err {
            Error::Publish {
                subnet_id,
                metric_name,
                ..
            } => {
                assert_eq!(subnet_id.as_str(), "subnet-1");
                assert_eq!(metric_name, "prefix - subnet-1");
            }
        }
        assert!(publisher.backend().published().is_empty());
    }

    #[tokio::test]
    async fn test_publish_duplicates_are_not_filtered() {
        let publisher = Publisher::new(FakeMetricsBackend::default(), "ns", "prefix");
        let subnet = subnet("subnet-1", "vpc-1", "10.0.1.0/24", 56);
        let sample = utilization::compute(&subnet, 0).unwrap();

        publisher.publish(&sample).await.unwrap();
        publisher.publish(&sample).await.unwrap();

        assert_eq!(publisher.backend().published().len(), 2);
    }
}
