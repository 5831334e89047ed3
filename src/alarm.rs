//! Per-subnet threshold alarms.
//!
//! Alarm provisioning is split into a pure diff ([`reconcile`]) between the
//! desired rules and a snapshot of the existing ones, and a side-effecting
//! [`Reconciler::apply`] step that creates, updates and deletes alarms through
//! an [`AlarmBackend`].
mod backend;
#[cfg(feature = "aws")]
mod cloudwatch;
mod error;
mod reconcile;
mod reconciler;
mod rule;

pub use backend::{AlarmBackend, AlarmScope};
#[cfg(feature = "aws")]
pub use cloudwatch::CloudWatchAlarmBackend;
pub use error::{Error, Result, RuleAction, RuleFailure};
pub use reconcile::{Matched, ReconcilePlan, reconcile};
pub use reconciler::{ApplyReport, Reconciler};
pub use rule::{
    ALARM_NAME_PREFIX, AlarmDefinition, AlarmRule, AlarmSettings, Comparison, StaleAlarms,
    ThresholdDrift, desired_rules, parse_alarm_name,
};
