use std::fmt;
use std::str::FromStr;

use crate::metrics::{self, MetricUnit};
use crate::network::{Pool, PoolID, Subnet, SubnetID};

/// Every alarm managed by the monitor is named `"Alarm Vpc: {pool} Subnet: {subnet}"`.
pub const ALARM_NAME_PREFIX: &str = "Alarm Vpc: ";
const ALARM_NAME_SUBNET_SEPARATOR: &str = " Subnet: ";

/// Alarms are evaluated over a single period of this length, in seconds.
pub const ALARM_PERIOD_SECS: u32 = 60;
pub const ALARM_EVALUATION_PERIODS: u32 = 1;

/// A standing "utilization ≥ threshold" rule for one subnet.
///
/// Rules are keyed by [`AlarmRule::subnet_id`].
#[derive(Debug, Clone, PartialEq)]
pub struct AlarmRule {
    pub subnet_id: SubnetID,
    pub pool_id: PoolID,
    /// Threshold in percent.
    pub threshold: f64,
    /// Identifier of the notification target fired by the alarm.
    pub notification_target: String,
}

impl AlarmRule {
    pub fn alarm_name(&self) -> String {
        format!(
            "{ALARM_NAME_PREFIX}{}{ALARM_NAME_SUBNET_SEPARATOR}{}",
            self.pool_id, self.subnet_id
        )
    }

    /// Returns `true` if threshold or notification target differ from `other`.
    pub fn differs_from(&self, other: &AlarmRule) -> bool {
        self.threshold != other.threshold || self.notification_target != other.notification_target
    }
}

/// Extracts pool and subnet id from a managed alarm name.
///
/// Returns `None` for alarms that were not created by the monitor.
///
/// # Examples
///
/// ```
/// # use subnet_monitor::alarm::parse_alarm_name;
/// let (pool_id, subnet_id) = parse_alarm_name("Alarm Vpc: vpc-1 Subnet: subnet-1").unwrap();
/// assert_eq!(pool_id.as_str(), "vpc-1");
/// assert_eq!(subnet_id.as_str(), "subnet-1");
/// assert!(parse_alarm_name("CPU high").is_none());
/// ```
pub fn parse_alarm_name(name: &str) -> Option<(PoolID, SubnetID)> {
    let rest = name.strip_prefix(ALARM_NAME_PREFIX)?;
    let (pool_id, subnet_id) = rest.split_once(ALARM_NAME_SUBNET_SEPARATOR)?;

    Some((PoolID::new(pool_id).ok()?, SubnetID::new(subnet_id).ok()?))
}

/// Configuration shared by every desired rule.
#[derive(Debug, Clone)]
pub struct AlarmSettings {
    pub threshold: f64,
    pub notification_target: String,
    pub namespace: String,
    pub metric_prefix: String,
}

/// Builds one desired rule per discovered subnet.
///
/// Threshold and notification target are taken from `settings`, never from
/// a previously provisioned rule.
pub fn desired_rules(discovered: &[(Pool, Subnet)], settings: &AlarmSettings) -> Vec<AlarmRule> {
    discovered
        .iter()
        .map(|(pool, subnet)| AlarmRule {
            subnet_id: subnet.id.clone(),
            pool_id: pool.id.clone(),
            threshold: settings.threshold,
            notification_target: settings.notification_target.clone(),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    GreaterThanOrEqualToThreshold,
}

/// Everything the alerting backend needs to provision a rule.
#[derive(Debug, Clone, PartialEq)]
pub struct AlarmDefinition {
    pub name: String,
    pub namespace: String,
    pub metric_name: String,
    pub dimensions: Vec<(String, String)>,
    pub unit: MetricUnit,
    pub comparison: Comparison,
    pub threshold: f64,
    pub evaluation_periods: u32,
    pub period_secs: u32,
    /// Notification targets fired when the alarm goes off.
    pub actions: Vec<String>,
}

impl AlarmDefinition {
    /// Wires `rule` to its subnet's utilization metric.
    ///
    /// A single sample at or above the threshold fires the alarm: there is one
    /// evaluation period and no smoothing.
    pub fn new(rule: &AlarmRule, settings: &AlarmSettings) -> Self {
        Self {
            name: rule.alarm_name(),
            namespace: settings.namespace.clone(),
            metric_name: metrics::metric_name(&settings.metric_prefix, &rule.subnet_id),
            dimensions: vec![(
                metrics::SUBNET_DIMENSION.to_owned(),
                rule.subnet_id.to_string(),
            )],
            unit: MetricUnit::Percent,
            comparison: Comparison::GreaterThanOrEqualToThreshold,
            threshold: rule.threshold,
            evaluation_periods: ALARM_EVALUATION_PERIODS,
            period_secs: ALARM_PERIOD_SECS,
            actions: vec![rule.notification_target.clone()],
        }
    }
}

/// What to do with alarms whose subnet is no longer discovered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StaleAlarms {
    #[default]
    Delete,
    /// Leave them in place and log them as drift.
    Retain,
}

/// What to do with existing alarms whose threshold or target no longer match
/// the configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ThresholdDrift {
    #[default]
    Update,
    /// Only newly discovered subnets get the current settings.
    Ignore,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown policy `{value}`, expected one of: {expected}")]
pub struct UnknownPolicy {
    value: String,
    expected: &'static str,
}

impl FromStr for StaleAlarms {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "delete" => Ok(StaleAlarms::Delete),
            "retain" => Ok(StaleAlarms::Retain),
            other => Err(UnknownPolicy {
                value: other.to_owned(),
                expected: "delete, retain",
            }),
        }
    }
}

impl FromStr for ThresholdDrift {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "update" => Ok(ThresholdDrift::Update),
            "ignore" => Ok(ThresholdDrift::Ignore),
            other => Err(UnknownPolicy {
                value: other.to_owned(),
                expected: "update, ignore",
            }),
        }
    }
}

impl fmt::Display for StaleAlarms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StaleAlarms::Delete => f.write_str("delete"),
            StaleAlarms::Retain => f.write_str("retain"),
        }
    }
}

impl fmt::Display for ThresholdDrift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThresholdDrift::Update => f.write_str("update"),
            ThresholdDrift::Ignore => f.write_str("ignore"),
        }
    }
}
