//! Publication of utilization samples as per-subnet time series.
mod backend;
#[cfg(feature = "aws")]
pub(crate) mod cloudwatch;
mod error;
mod publisher;

pub use backend::{MetricDatum, MetricUnit, MetricsBackend};
#[cfg(feature = "aws")]
pub use cloudwatch::CloudWatchMetricsBackend;
pub use error::{Error, Result};
pub use publisher::Publisher;

use crate::network::SubnetID;

/// Name of the dimension carrying the subnet id.
pub const SUBNET_DIMENSION: &str = "Subnets";

/// Storage resolution hint, in seconds.
pub const STORAGE_RESOLUTION_SECS: u32 = 60;

/// Returns the metric name of `subnet_id`'s utilization time series.
///
/// Every subnet gets its own series, named `"{prefix} - {subnet_id}"`, so
/// dashboards and alarms can address a subnet by name.
///
/// # Examples
///
/// ```
/// # use subnet_monitor::metrics::metric_name;
/// # use subnet_monitor::network::SubnetID;
/// let subnet_id = SubnetID::new("subnet-0a1b2c3d").unwrap();
/// assert_eq!(metric_name("Used IP's", &subnet_id), "Used IP's - subnet-0a1b2c3d");
/// ```
pub fn metric_name(prefix: &str, subnet_id: &SubnetID) -> String {
    format!("{prefix} - {subnet_id}")
}
