//! In-memory backends for unit tests.
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};

use crate::alarm::{AlarmBackend, AlarmDefinition, AlarmRule, AlarmScope, parse_alarm_name};
use crate::discovery::{self, DiscoveryBackend, PoolFilter};
use crate::error::BoxError;
use crate::metrics::{MetricDatum, MetricsBackend};
use crate::network::{Pool, PoolID, PoolState, Subnet, SubnetID};

pub(crate) fn pool(id: &str, state: PoolState) -> Pool {
    Pool::new(PoolID::new(id).unwrap(), state)
}

pub(crate) fn subnet(id: &str, pool_id: &str, cidr_block: &str, available: u64) -> Subnet {
    Subnet::new(
        SubnetID::new(id).unwrap(),
        PoolID::new(pool_id).unwrap(),
        cidr_block,
        available,
    )
}

#[derive(Debug, thiserror::Error)]
#[error("injected failure: {0}")]
pub(crate) struct InjectedFailure(pub String);

#[derive(Debug, Default, Clone)]
pub(crate) struct FakeDiscoveryBackend {
    pools: Vec<(Pool, Vec<Subnet>)>,
    ignore_state_filter: bool,
    fail_pools: bool,
    described_subnets: Arc<Mutex<Vec<PoolID>>>,
}

impl FakeDiscoveryBackend {
    pub(crate) fn with_pool(mut self, pool: Pool, subnets: Vec<Subnet>) -> Self {
        self.pools.push((pool, subnets));
        self
    }

    pub(crate) fn without_pool(mut self, pool_id: &str) -> Self {
        self.pools.retain(|(pool, _)| pool.id.as_str() != pool_id);
        self
    }

    pub(crate) fn ignoring_state_filter(mut self) -> Self {
        self.ignore_state_filter = true;
        self
    }

    pub(crate) fn failing_pools(mut self) -> Self {
        self.fail_pools = true;
        self
    }

    pub(crate) fn described_subnets(&self) -> Vec<PoolID> {
        self.described_subnets.lock().unwrap().clone()
    }
}

impl DiscoveryBackend for FakeDiscoveryBackend {
    async fn describe_pools(&self, filter: &PoolFilter) -> discovery::Result<Vec<Pool>> {
        if self.fail_pools {
            return Err(discovery::Error::DescribePools(Box::new(InjectedFailure(
                "describe pools".to_owned(),
            ))));
        }

        let pools = self.pools.iter().map(|(pool, _)| pool);
        let out = match filter {
            PoolFilter::State(_) if self.ignore_state_filter => pools.cloned().collect(),
            PoolFilter::State(state) => {
                pools.filter(|pool| &pool.state == state).cloned().collect()
            }
            // Unknown ids are silently omitted, like a filtered provider query.
            PoolFilter::Ids(ids) => pools.filter(|pool| ids.contains(&pool.id)).cloned().collect(),
        };

        Ok(out)
    }

    async fn describe_subnets(&self, pool_id: &PoolID) -> discovery::Result<Vec<Subnet>> {
        self.described_subnets.lock().unwrap().push(pool_id.clone());
        Ok(self
            .pools
            .iter()
            .find(|(pool, _)| &pool.id == pool_id)
            .map(|(_, subnets)| subnets.clone())
            .unwrap_or_default())
    }
}

#[derive(Debug, Default, Clone)]
pub(crate) struct FakeMetricsBackend {
    failing_subnets: HashSet<String>,
    published: Arc<Mutex<Vec<MetricDatum>>>,
    attempts: Arc<Mutex<usize>>,
}

impl FakeMetricsBackend {
    pub(crate) fn failing_for(mut self, subnet_id: &str) -> Self {
        self.failing_subnets.insert(subnet_id.to_owned());
        self
    }

    pub(crate) fn published(&self) -> Vec<MetricDatum> {
        self.published.lock().unwrap().clone()
    }

    pub(crate) fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

impl MetricsBackend for FakeMetricsBackend {
    async fn put_metric(&self, datum: &MetricDatum) -> Result<(), BoxError> {
        *self.attempts.lock().unwrap() += 1;
        let failing = datum
            .dimensions
            .iter()
            .any(|(_, value)| self.failing_subnets.contains(value));
        if failing {
            return Err(Box::new(InjectedFailure(datum.metric_name.clone())));
        }

        self.published.lock().unwrap().push(datum.clone());
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub(crate) struct FakeAlarmBackend {
    failing_names: HashSet<String>,
    fail_list: bool,
    alarms: Arc<Mutex<BTreeMap<String, AlarmDefinition>>>,
    put_calls: Arc<Mutex<usize>>,
}

impl FakeAlarmBackend {
    pub(crate) fn failing_for(mut self, alarm_name: &str) -> Self {
        self.failing_names.insert(alarm_name.to_owned());
        self
    }

    pub(crate) fn failing_list(mut self) -> Self {
        self.fail_list = true;
        self
    }

    pub(crate) fn alarms(&self) -> BTreeMap<String, AlarmDefinition> {
        self.alarms.lock().unwrap().clone()
    }

    pub(crate) fn put_calls(&self) -> usize {
        *self.put_calls.lock().unwrap()
    }
}

impl AlarmBackend for FakeAlarmBackend {
    async fn list_alarms(&self, scope: &AlarmScope) -> Result<Vec<AlarmRule>, BoxError> {
        if self.fail_list {
            return Err(Box::new(InjectedFailure("list alarms".to_owned())));
        }

        Ok(self
            .alarms
            .lock()
            .unwrap()
            .values()
            .filter(|definition| {
                definition.namespace == scope.namespace
                    && definition.name.starts_with(&scope.name_prefix)
            })
            .filter_map(|definition| {
                let (pool_id, subnet_id) = parse_alarm_name(&definition.name)?;
                Some(AlarmRule {
                    subnet_id,
                    pool_id,
                    threshold: definition.threshold,
                    notification_target: definition.actions.first().cloned().unwrap_or_default(),
                })
            })
            .collect())
    }

    async fn put_alarm(&self, definition: &AlarmDefinition) -> Result<(), BoxError> {
        *self.put_calls.lock().unwrap() += 1;
        if self.failing_names.contains(&definition.name) {
            return Err(Box::new(InjectedFailure(definition.name.clone())));
        }

        self.alarms
            .lock()
            .unwrap()
            .insert(definition.name.clone(), definition.clone());
        Ok(())
    }

    async fn delete_alarms(&self, names: &[String]) -> Result<(), BoxError> {
        if let Some(name) = names.iter().find(|name| self.failing_names.contains(*name)) {
            return Err(Box::new(InjectedFailure(name.clone())));
        }

        let mut alarms = self.alarms.lock().unwrap();
        for name in names {
            alarms.remove(name);
        }
        Ok(())
    }
}
