use crate::network::{Pool, PoolID, Subnet, SubnetID};

use super::{
    ALARM_NAME_PREFIX, AlarmBackend, AlarmDefinition, AlarmRule, AlarmScope, AlarmSettings, Error,
    ReconcilePlan, Result, RuleAction, RuleFailure, StaleAlarms, ThresholdDrift,
};

/// Outcome of [`Reconciler::apply`].
#[derive(Debug, Default)]
pub struct ApplyReport {
    pub created: Vec<SubnetID>,
    pub updated: Vec<SubnetID>,
    pub deleted: Vec<SubnetID>,
    /// Stale or drifted rules left in place by policy.
    pub retained: Vec<SubnetID>,
    pub unchanged: usize,
    pub failures: Vec<RuleFailure>,
}

impl ApplyReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Turns collected per-rule failures into a single error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Apply`] with every failure if at least one rule could not
    /// be applied.
    pub fn into_result(self) -> Result<Self> {
        if self.failures.is_empty() {
            Ok(self)
        } else {
            Err(Error::Apply {
                failures: self.failures,
            })
        }
    }
}

/// Keeps the provisioned alarm rules in sync with the discovered subnets.
#[derive(Debug, Clone)]
pub struct Reconciler<B> {
    backend: B,
    settings: AlarmSettings,
    stale_alarms: StaleAlarms,
    threshold_drift: ThresholdDrift,
    /// Pools whose alarms this reconciler owns; `None` owns every managed alarm.
    pools: Option<Vec<PoolID>>,
}

impl<B: AlarmBackend + Sync> Reconciler<B> {
    pub fn new(
        backend: B,
        settings: AlarmSettings,
        stale_alarms: StaleAlarms,
        threshold_drift: ThresholdDrift,
    ) -> Self {
        Self {
            backend,
            settings,
            stale_alarms,
            threshold_drift,
            pools: None,
        }
    }

    /// Restricts the existing-alarm snapshot to alarms of `pools`.
    ///
    /// Alarms of other pools are never classified as stale, so monitors with
    /// disjoint pool selections can share a namespace.
    pub fn with_pools(mut self, pools: Vec<PoolID>) -> Self {
        self.pools = Some(pools);
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn settings(&self) -> &AlarmSettings {
        &self.settings
    }

    pub fn scope(&self) -> AlarmScope {
        AlarmScope {
            namespace: self.settings.namespace.clone(),
            name_prefix: ALARM_NAME_PREFIX.to_owned(),
        }
    }

    /// Reads a single snapshot of the provisioned rules owned by this reconciler.
    ///
    /// # Errors
    ///
    /// Returns [`Error::List`] if the backend cannot be queried.
    pub async fn existing(&self) -> Result<Vec<AlarmRule>> {
        let mut rules = self
            .backend
            .list_alarms(&self.scope())
            .await
            .map_err(Error::List)?;
        if let Some(pools) = &self.pools {
            rules.retain(|rule| pools.contains(&rule.pool_id));
        }

        Ok(rules)
    }

    /// Computes the plan for `discovered` against the currently provisioned rules.
    pub async fn plan(&self, discovered: &[(Pool, Subnet)]) -> Result<ReconcilePlan> {
        let desired = super::desired_rules(discovered, &self.settings);
        let existing = self.existing().await?;
        log::debug!(
            target: "alarm reconciler",
            "Reconciling {} desired against {} existing alarms",
            desired.len(),
            existing.len()
        );

        Ok(super::reconcile(desired, existing))
    }

    /// Applies `plan` through the backend.
    ///
    /// Every rule is applied independently: a failing rule is recorded in
    /// [`ApplyReport::failures`] and does not prevent the remaining ones from
    /// being applied.
    pub async fn apply(&self, plan: &ReconcilePlan) -> ApplyReport {
        let mut report = ApplyReport::default();

        for rule in &plan.create {
            match self.put(rule, RuleAction::Create).await {
                Ok(()) => report.created.push(rule.subnet_id.clone()),
                Err(failure) => report.failures.push(failure),
            }
        }

        for matched in &plan.unchanged {
            if !matched.is_drifted() {
                report.unchanged += 1;
                continue;
            }
            match self.threshold_drift {
                ThresholdDrift::Update => {
                    match self.put(&matched.desired, RuleAction::Update).await {
                        Ok(()) => report.updated.push(matched.desired.subnet_id.clone()),
                        Err(failure) => report.failures.push(failure),
                    }
                }
                ThresholdDrift::Ignore => {
                    log::warn!(
                        target: "alarm reconciler",
                        "Alarm `{}` uses threshold {} instead of {}, leaving it unchanged",
                        matched.existing.alarm_name(),
                        matched.existing.threshold,
                        matched.desired.threshold
                    );
                    report.retained.push(matched.existing.subnet_id.clone());
                }
            }
        }

        for rule in &plan.stale {
            match self.stale_alarms {
                StaleAlarms::Delete => match self.delete(rule).await {
                    Ok(()) => report.deleted.push(rule.subnet_id.clone()),
                    Err(failure) => report.failures.push(failure),
                },
                StaleAlarms::Retain => {
                    log::warn!(
                        target: "alarm reconciler",
                        "Alarm `{}` refers to a subnet that is no longer discovered",
                        rule.alarm_name()
                    );
                    report.retained.push(rule.subnet_id.clone());
                }
            }
        }

        for failure in &report.failures {
            log::error!(target: "alarm reconciler", "{failure}");
        }
        log::info!(
            target: "alarm reconciler",
            "Alarms reconciled: created={}, updated={}, deleted={}, retained={}, unchanged={}, \
             failed={}",
            report.created.len(),
            report.updated.len(),
            report.deleted.len(),
            report.retained.len(),
            report.unchanged,
            report.failures.len()
        );

        report
    }

    async fn put(
        &self,
        rule: &AlarmRule,
        action: RuleAction,
    ) -> std::result::Result<(), RuleFailure> {
        let definition = AlarmDefinition::new(rule, &self.settings);
        self.backend
            .put_alarm(&definition)
            .await
            .map_err(|source| RuleFailure {
                subnet_id: rule.subnet_id.clone(),
                alarm_name: definition.name.clone(),
                action,
                source,
            })
    }

    async fn delete(&self, rule: &AlarmRule) -> std::result::Result<(), RuleFailure> {
        let name = rule.alarm_name();
        self.backend
            .delete_alarms(std::slice::from_ref(&name))
            .await
            .map_err(|source| RuleFailure {
                subnet_id: rule.subnet_id.clone(),
                alarm_name: name,
                action: RuleAction::Delete,
                source,
            })
    }
}
