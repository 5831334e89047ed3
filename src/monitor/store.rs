use std::collections::HashSet;

use dashmap::DashMap;

use crate::network::SubnetID;
use crate::utilization::UtilizationSample;

/// Latest utilization sample of every currently discovered subnet.
#[derive(Debug, Default)]
pub struct UtilizationStore {
    samples: DashMap<SubnetID, UtilizationSample>,
}

impl UtilizationStore {
    pub fn record(&self, sample: UtilizationSample) {
        self.samples.insert(sample.subnet_id().clone(), sample);
    }

    /// Removes every subnet that is not in `discovered`.
    pub fn retain_discovered(&self, discovered: &HashSet<SubnetID>) {
        self.samples
            .retain(|subnet_id, _| discovered.contains(subnet_id));
    }

    /// Returns the stored samples ordered by subnet id.
    pub fn snapshot(&self) -> Vec<UtilizationSample> {
        let mut out: Vec<UtilizationSample> =
            self.samples.iter().map(|entry| entry.value().clone()).collect();
        out.sort_by(|a, b| a.subnet_id().cmp(b.subnet_id()));
        out
    }

    pub fn get(&self, subnet_id: &SubnetID) -> Option<UtilizationSample> {
        self.samples.get(subnet_id).map(|entry| entry.value().clone())
    }

    pub fn size(&self) -> usize {
        self.samples.len()
    }
}
