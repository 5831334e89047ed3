use std::collections::HashSet;
use std::sync::Arc;

use futures::StreamExt;

use crate::alarm::{self, AlarmBackend, AlarmSettings, ApplyReport, Reconciler};
use crate::config::{Config, Selector};
use crate::discovery::{self, Discoverer, DiscoveryBackend};
use crate::metrics::{self, MetricsBackend, Publisher};
use crate::network::{Subnet, SubnetID};
use crate::utilization::{self, UtilizationSample};

use super::UtilizationStore;

/// Why a single subnet was skipped in a cycle.
#[derive(Debug, thiserror::Error)]
pub enum SubnetError {
    #[error(transparent)]
    Utilization(#[from] utilization::Error),
    #[error(transparent)]
    Publish(#[from] metrics::Error),
}

/// Outcome of a single monitoring cycle.
#[derive(Debug, Default)]
pub struct CycleReport {
    pub discovered: usize,
    pub published: Vec<UtilizationSample>,
    /// Published samples at or above the alarm threshold.
    pub over_threshold: usize,
    pub failed: Vec<(SubnetID, SubnetError)>,
}

/// Drives discovery, utilization computation, metric publication and alarm
/// reconciliation.
pub struct Monitor<D, M, A> {
    discoverer: Discoverer<D>,
    publisher: Publisher<M>,
    reconciler: Option<Reconciler<A>>,
    selector: Selector,
    threshold: f64,
    max_concurrent_publishes: usize,
    store: Arc<UtilizationStore>,
}

impl<D, M, A> Monitor<D, M, A>
where
    D: DiscoveryBackend + Sync,
    M: MetricsBackend + Sync,
    A: AlarmBackend + Sync,
{
    pub fn new(
        discoverer: Discoverer<D>,
        publisher: Publisher<M>,
        selector: Selector,
        threshold: f64,
    ) -> Self {
        Self {
            discoverer,
            publisher,
            reconciler: None,
            selector,
            threshold,
            max_concurrent_publishes: crate::config::DEFAULT_MAX_CONCURRENT_PUBLISHES,
            store: Arc::default(),
        }
    }

    /// Wires every component to its backend as described by `config`.
    ///
    /// Alarm reconciliation is only available if `config` names a
    /// notification target.
    pub fn from_config(config: &Config, discovery: D, metrics: M, alarms: A) -> Self {
        let publisher = Publisher::new(metrics, &config.namespace, &config.metric_prefix);
        let mut monitor = Self::new(
            Discoverer::new(discovery),
            publisher,
            config.selector.clone(),
            config.threshold,
        )
        .with_max_concurrent_publishes(config.max_concurrent_publishes);

        if let Some(target) = &config.notification_target {
            let settings = AlarmSettings {
                threshold: config.threshold,
                notification_target: target.clone(),
                namespace: config.namespace.clone(),
                metric_prefix: config.metric_prefix.clone(),
            };
            let mut reconciler = Reconciler::new(
                alarms,
                settings,
                config.stale_alarms,
                config.threshold_drift,
            );
            if let Selector::Pools(pools) = &config.selector {
                reconciler = reconciler.with_pools(pools.clone());
            }
            monitor = monitor.with_reconciler(reconciler);
        }

        monitor
    }

    pub fn with_reconciler(mut self, reconciler: Reconciler<A>) -> Self {
        self.reconciler = Some(reconciler);
        self
    }

    /// Shares `store` instead of a store owned by this monitor.
    pub fn with_store(mut self, store: Arc<UtilizationStore>) -> Self {
        self.store = store;
        self
    }

    pub fn with_max_concurrent_publishes(mut self, limit: usize) -> Self {
        self.max_concurrent_publishes = limit.max(1);
        self
    }

    pub fn store(&self) -> Arc<UtilizationStore> {
        Arc::clone(&self.store)
    }

    pub fn publisher(&self) -> &Publisher<M> {
        &self.publisher
    }

    pub fn reconciler(&self) -> Option<&Reconciler<A>> {
        self.reconciler.as_ref()
    }

    pub fn can_reconcile(&self) -> bool {
        self.reconciler.is_some()
    }

    /// Runs one monitoring cycle: discover, then compute and publish the
    /// utilization of every subnet.
    ///
    /// Subnets are processed concurrently, with at most
    /// `max_concurrent_publishes` outstanding publish calls. A subnet whose
    /// utilization cannot be computed or published is logged and reported in
    /// [`CycleReport::failed`]; the remaining subnets are still published.
    ///
    /// # Arguments
    ///
    /// * `timestamp` - UNIX timestamp attached to every sample of this cycle.
    ///
    /// # Errors
    ///
    /// Returns the discovery error if the subnets could not be discovered; in
    /// that case nothing is published.
    pub async fn run_cycle(&self, timestamp: u64) -> discovery::Result<CycleReport> {
        let discovered = self.discoverer.discover(&self.selector).await?;
        let subnet_ids: HashSet<SubnetID> = discovered
            .iter()
            .map(|(_, subnet)| subnet.id.clone())
            .collect();

        let results: Vec<(SubnetID, Result<UtilizationSample, SubnetError>)> =
            futures::stream::iter(discovered.iter())
                .map(|(_, subnet)| async move {
                    (subnet.id.clone(), self.sample(subnet, timestamp).await)
                })
                .buffer_unordered(self.max_concurrent_publishes)
                .collect()
                .await;

        let mut report = CycleReport {
            discovered: discovered.len(),
            ..CycleReport::default()
        };
        for (subnet_id, result) in results {
            match result {
                Ok(sample) => {
                    if sample.exceeds(self.threshold) {
                        report.over_threshold += 1;
                    }
                    self.store.record(sample.clone());
                    report.published.push(sample);
                }
                Err(err) => {
                    log::error!(
                        target: "monitor",
                        "failed to process subnet: subnet_id={}, error={}",
                        subnet_id,
                        err
                    );
                    report.failed.push((subnet_id, err));
                }
            }
        }
        self.store.retain_discovered(&subnet_ids);

        log::info!(
            target: "monitor",
            "Cycle finished: discovered={}, published={}, over_threshold={}, failed={}",
            report.discovered,
            report.published.len(),
            report.over_threshold,
            report.failed.len()
        );

        Ok(report)
    }

    async fn sample(
        &self,
        subnet: &Subnet,
        timestamp: u64,
    ) -> Result<UtilizationSample, SubnetError> {
        let sample = utilization::compute(subnet, timestamp)?;
        log::info!(
            target: "monitor",
            "Subnet id: {} Total Ips Subnet: {}, Available: {}, IP Used: {} - {:.1} %",
            sample.subnet_id(),
            sample.total(),
            sample.available(),
            sample.used(),
            sample.percentage()
        );
        if sample.exceeds(self.threshold) {
            log::warn!(
                target: "monitor",
                "Subnet `{}` is at {:.1} %, at or above the alarm threshold of {} %",
                sample.subnet_id(),
                sample.percentage(),
                self.threshold
            );
        }

        self.publisher.publish(&sample).await?;
        Ok(sample)
    }

    /// Brings the provisioned alarms in line with the currently discovered
    /// subnets.
    ///
    /// The existing alarms are read once and diffed against one desired rule
    /// per discovered subnet; the resulting plan is then applied rule by rule.
    /// Safe to re-run: a converged rule set results in no changes.
    ///
    /// # Errors
    ///
    /// - [`alarm::Error::MissingNotificationTarget`] if no reconciler is configured.
    /// - [`alarm::Error::Discovery`] or [`alarm::Error::List`] if the inputs of
    ///   the diff could not be read; nothing is applied in that case.
    /// - [`alarm::Error::Apply`] with every failed rule if some changes could
    ///   not be applied. All other rules are still applied.
    pub async fn reconcile_alarms(&self) -> alarm::Result<ApplyReport> {
        let reconciler = self
            .reconciler
            .as_ref()
            .ok_or(alarm::Error::MissingNotificationTarget)?;
        let discovered = self.discoverer.discover(&self.selector).await?;
        let plan = reconciler.plan(&discovered).await?;

        reconciler.apply(&plan).await.into_result()
    }
}
