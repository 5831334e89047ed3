use crate::error::BoxError;

use super::{AlarmDefinition, AlarmRule};

/// Selects the alarms that belong to the monitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmScope {
    pub namespace: String,
    pub name_prefix: String,
}

pub trait AlarmBackend {
    /// Lists the managed alarms within `scope`, read live from the backend.
    fn list_alarms(
        &self,
        scope: &AlarmScope,
    ) -> impl std::future::Future<Output = Result<Vec<AlarmRule>, BoxError>> + Send;

    /// Creates the alarm, or replaces an existing alarm with the same name.
    fn put_alarm(
        &self,
        definition: &AlarmDefinition,
    ) -> impl std::future::Future<Output = Result<(), BoxError>> + Send;

    fn delete_alarms(
        &self,
        names: &[String],
    ) -> impl std::future::Future<Output = Result<(), BoxError>> + Send;
}
