//! Monitor configuration.
//!
//! A [`Config`] is built once at process start, either from environment
//! variables ([`Config::from_env`]) or from a JSON file
//! ([`Config::from_file`]), and passed down to every component. Both sources
//! are validated by the same [`TryFrom<RawConfig>`] conversion.
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::alarm::{StaleAlarms, ThresholdDrift};
use crate::network::PoolID;

pub const DEFAULT_ALARM_THRESHOLD: f64 = 50.0;
pub const DEFAULT_NAMESPACE: &str = "IP Subnet Monitor";
pub const DEFAULT_METRIC_PREFIX: &str = "Used IP's";
pub const DEFAULT_REGION: &str = "eu-west-1";
pub const DEFAULT_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_MAX_CONCURRENT_PUBLISHES: usize = 8;

const SELECTOR_ALL: &str = "all";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("missing required setting `{0}`")]
    Missing(&'static str),
    #[error("pool selector is empty")]
    EmptySelector,
    #[error("pool selector `{0}` contains an empty pool id")]
    EmptyPoolID(String),
    #[error("pool selector contains an invalid pool id: {0}")]
    InvalidPoolID(#[source] crate::network::Error),
    #[error("invalid value `{value}` for `{key}`: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
    #[error("alarm threshold {0} is outside of 0..=100")]
    ThresholdOutOfRange(f64),
    #[error("failed to read config file `{path}`: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file `{path}`: {source}")]
    ParseFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Chooses which pools are monitored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// Every pool whose state is `available`.
    All,
    /// Exactly these pools, regardless of state. Never empty.
    Pools(Vec<PoolID>),
}

impl FromStr for Selector {
    type Err = Error;

    /// Parses `"all"` or a comma-separated list of pool ids.
    ///
    /// Surrounding whitespace around each id is ignored and repeated ids are
    /// dropped; an empty id (e.g., `"vpc-1,,vpc-2"`) is rejected.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::EmptySelector);
        }
        if s == SELECTOR_ALL {
            return Ok(Selector::All);
        }

        let mut pools: Vec<PoolID> = Vec::new();
        for id in s.split(',') {
            let id = id.trim();
            if id.is_empty() {
                return Err(Error::EmptyPoolID(s.to_owned()));
            }
            let id = PoolID::new(id).map_err(Error::InvalidPoolID)?;
            if !pools.contains(&id) {
                pools.push(id);
            }
        }

        Ok(Selector::Pools(pools))
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Selector::All => f.write_str(SELECTOR_ALL),
            Selector::Pools(pools) => {
                for (i, pool) in pools.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{pool}")?;
                }
                Ok(())
            }
        }
    }
}

/// Validated monitor configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub selector: Selector,
    /// Alarm threshold in percent.
    pub threshold: f64,
    pub namespace: String,
    pub metric_prefix: String,
    /// Identifier of the pre-existing notification target (e.g., an SNS topic ARN).
    pub notification_target: Option<String>,
    pub region: String,
    pub interval: Duration,
    pub max_concurrent_publishes: usize,
    /// Reconcile alarms every n-th cycle; `0` reconciles only at startup.
    pub reconcile_every: u64,
    pub stale_alarms: StaleAlarms,
    pub threshold_drift: ThresholdDrift,
    pub api_listen_addr: Option<SocketAddr>,
    pub run_once: bool,
}

/// Unvalidated settings as they appear in the environment or a config file.
///
/// File keys are camelCase and mirror the deployment context of the monitor
/// (`vpcs`, `alarmThreshold`, ...).
#[derive(Debug, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RawConfig {
    /// Where the settings were read from; names the keys in errors.
    #[serde(skip)]
    pub source: Source,
    pub vpcs: Option<String>,
    pub alarm_threshold: Option<f64>,
    pub alarm_namespace: Option<String>,
    pub prefix_metric_name: Option<String>,
    pub alarm_topic_arn: Option<String>,
    pub region: Option<String>,
    pub interval_secs: Option<u64>,
    pub max_concurrent_publishes: Option<usize>,
    pub reconcile_every: Option<u64>,
    pub stale_alarms: Option<String>,
    pub threshold_drift: Option<String>,
    pub api_listen_addr: Option<String>,
    pub run_once: Option<bool>,
}

/// Origin of a [`RawConfig`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Source {
    #[default]
    File,
    Env,
}

impl RawConfig {
    /// Reads settings through `lookup`, keyed by environment variable name.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            source: Source::Env,
            vpcs: lookup("SELECTED_VPC"),
            alarm_threshold: parse_var(&lookup, "ALARM_THRESHOLD")?,
            alarm_namespace: lookup("ALARM_NAMESPACE"),
            prefix_metric_name: lookup("PREFIX_METRIC_NAME"),
            alarm_topic_arn: lookup("ALARM_TOPIC_ARN"),
            region: lookup("REGION"),
            interval_secs: parse_var(&lookup, "MONITOR_INTERVAL_SECS")?,
            max_concurrent_publishes: parse_var(&lookup, "MAX_CONCURRENT_PUBLISHES")?,
            reconcile_every: parse_var(&lookup, "RECONCILE_EVERY")?,
            stale_alarms: lookup("STALE_ALARMS"),
            threshold_drift: lookup("THRESHOLD_DRIFT"),
            api_listen_addr: lookup("API_LISTEN_ADDR"),
            run_once: parse_var(&lookup, "RUN_ONCE")?,
        })
    }

    fn key(&self, env: &'static str, file: &'static str) -> &'static str {
        match self.source {
            Source::Env => env,
            Source::File => file,
        }
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &'static str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    parse_setting(key, lookup(key))
}

fn non_empty(key: &'static str, value: Option<String>, default: &str) -> Result<String> {
    match value {
        None => Ok(default.to_owned()),
        Some(value) if value.trim().is_empty() => Err(Error::InvalidValue {
            key,
            value,
            reason: "must not be empty".to_owned(),
        }),
        Some(value) => Ok(value),
    }
}

fn parse_setting<T>(key: &'static str, value: Option<String>) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .map(|value| {
            value.trim().parse::<T>().map_err(|err| Error::InvalidValue {
                key,
                reason: err.to_string(),
                value,
            })
        })
        .transpose()
}

impl TryFrom<RawConfig> for Config {
    type Error = Error;

    fn try_from(raw: RawConfig) -> Result<Self> {
        let selector = raw
            .vpcs
            .as_deref()
            .ok_or(Error::Missing(raw.key("SELECTED_VPC", "vpcs")))?
            .parse::<Selector>()?;

        let threshold = raw.alarm_threshold.unwrap_or(DEFAULT_ALARM_THRESHOLD);
        if !threshold.is_finite() || !(0.0..=100.0).contains(&threshold) {
            return Err(Error::ThresholdOutOfRange(threshold));
        }

        let interval_secs = raw.interval_secs.unwrap_or(DEFAULT_INTERVAL_SECS);
        if interval_secs == 0 {
            return Err(Error::InvalidValue {
                key: raw.key("MONITOR_INTERVAL_SECS", "intervalSecs"),
                value: interval_secs.to_string(),
                reason: "must be at least one second".to_owned(),
            });
        }

        let max_concurrent_publishes = raw
            .max_concurrent_publishes
            .unwrap_or(DEFAULT_MAX_CONCURRENT_PUBLISHES);
        if max_concurrent_publishes == 0 {
            return Err(Error::InvalidValue {
                key: raw.key("MAX_CONCURRENT_PUBLISHES", "maxConcurrentPublishes"),
                value: max_concurrent_publishes.to_string(),
                reason: "must be at least one".to_owned(),
            });
        }

        let notification_target = raw
            .alarm_topic_arn
            .as_deref()
            .map(|target| target.trim().to_owned())
            .filter(|target| !target.is_empty());

        let namespace = non_empty(
            raw.key("ALARM_NAMESPACE", "alarmNamespace"),
            raw.alarm_namespace.clone(),
            DEFAULT_NAMESPACE,
        )?;
        let metric_prefix = non_empty(
            raw.key("PREFIX_METRIC_NAME", "prefixMetricName"),
            raw.prefix_metric_name.clone(),
            DEFAULT_METRIC_PREFIX,
        )?;
        let region = non_empty(raw.key("REGION", "region"), raw.region.clone(), DEFAULT_REGION)?;
        let stale_alarms = parse_setting(
            raw.key("STALE_ALARMS", "staleAlarms"),
            raw.stale_alarms.clone(),
        )?;
        let threshold_drift = parse_setting(
            raw.key("THRESHOLD_DRIFT", "thresholdDrift"),
            raw.threshold_drift.clone(),
        )?;
        let api_listen_addr = parse_setting(
            raw.key("API_LISTEN_ADDR", "apiListenAddr"),
            raw.api_listen_addr.clone(),
        )?;

        Ok(Self {
            selector,
            threshold,
            namespace,
            metric_prefix,
            notification_target,
            region,
            interval: Duration::from_secs(interval_secs),
            max_concurrent_publishes,
            reconcile_every: raw.reconcile_every.unwrap_or(0),
            stale_alarms: stale_alarms.unwrap_or_default(),
            threshold_drift: threshold_drift.unwrap_or_default(),
            api_listen_addr,
            run_once: raw.run_once.unwrap_or(false),
        })
    }
}

impl Config {
    /// Builds the configuration from the process environment.
    ///
    /// If `MONITOR_CONFIG_FILE` is set, the file it points to is read instead.
    pub fn from_env() -> Result<Self> {
        if let Some(path) = std::env::var_os("MONITOR_CONFIG_FILE") {
            return Self::from_file(PathBuf::from(path));
        }

        RawConfig::from_lookup(|key| std::env::var(key).ok())?.try_into()
    }

    /// Builds the configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReadFile`] or [`Error::ParseFile`] if the file cannot
    /// be read or is not valid JSON, and a validation error otherwise.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| Error::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        let raw: RawConfig =
            serde_json::from_str(&contents).map_err(|source| Error::ParseFile {
                path: path.to_path_buf(),
                source,
            })?;

        raw.try_into()
    }
}
