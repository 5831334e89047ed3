use std::fmt;

use crate::error::BoxError;
use crate::network::SubnetID;

/// The side effect that was attempted for a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleAction {
    Create,
    Update,
    Delete,
}

impl fmt::Display for RuleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RuleAction::Create => "create",
            RuleAction::Update => "update",
            RuleAction::Delete => "delete",
        };
        write!(f, "{name}")
    }
}

/// A single rule that could not be applied.
#[derive(Debug, thiserror::Error)]
#[error("failed to {action} alarm `{alarm_name}` for subnet `{subnet_id}`: {source}")]
pub struct RuleFailure {
    pub subnet_id: SubnetID,
    pub alarm_name: String,
    pub action: RuleAction,
    #[source]
    pub source: BoxError,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("alarm reconciliation requires a notification target")]
    MissingNotificationTarget,
    #[error("failed to discover subnets for alarm reconciliation: {0}")]
    Discovery(#[from] crate::discovery::Error),
    #[error("failed to list existing alarms: {0}")]
    List(#[source] BoxError),
    #[error("failed to apply {} alarm change(s)", .failures.len())]
    Apply { failures: Vec<RuleFailure> },
}

pub type Result<T> = std::result::Result<T, Error>;
