use std::collections::{HashMap, HashSet};

use crate::network::SubnetID;

use super::AlarmRule;

/// A desired rule together with the existing rule that shares its key.
#[derive(Debug, Clone, PartialEq)]
pub struct Matched {
    pub desired: AlarmRule,
    pub existing: AlarmRule,
}

impl Matched {
    pub fn is_drifted(&self) -> bool {
        self.desired.differs_from(&self.existing)
    }
}

/// The difference between the desired and the existing alarm rules.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcilePlan {
    /// Desired rules without an existing counterpart.
    pub create: Vec<AlarmRule>,
    /// Desired rules that already exist, whether or not their settings match.
    pub unchanged: Vec<Matched>,
    /// Existing rules whose subnet is no longer discovered.
    pub stale: Vec<AlarmRule>,
}

impl ReconcilePlan {
    /// Existing rules whose threshold or notification target no longer match
    /// the configuration.
    pub fn drifted(&self) -> impl Iterator<Item = &Matched> {
        self.unchanged.iter().filter(|matched| matched.is_drifted())
    }

    pub fn is_converged(&self) -> bool {
        self.create.is_empty() && self.stale.is_empty() && self.drifted().next().is_none()
    }
}

/// Diffs `desired` against `existing`, keyed by subnet id.
///
/// Classification only looks at keys. Settings drift is reported through
/// [`ReconcilePlan::drifted`] and never moves a rule out of `unchanged`.
/// Repeated keys on either side are collapsed to their first occurrence, so
/// applying the plan never yields two rules for the same subnet.
///
/// `existing` must be a single snapshot of the provisioned rules.
pub fn reconcile(desired: Vec<AlarmRule>, existing: Vec<AlarmRule>) -> ReconcilePlan {
    let mut existing_by_key: HashMap<SubnetID, AlarmRule> = HashMap::with_capacity(existing.len());
    let mut existing_order = Vec::with_capacity(existing.len());
    for rule in existing {
        if !existing_by_key.contains_key(&rule.subnet_id) {
            existing_order.push(rule.subnet_id.clone());
            existing_by_key.insert(rule.subnet_id.clone(), rule);
        }
    }

    let mut plan = ReconcilePlan::default();
    let mut desired_keys = HashSet::with_capacity(desired.len());
    for rule in desired {
        if !desired_keys.insert(rule.subnet_id.clone()) {
            continue;
        }
        match existing_by_key.get(&rule.subnet_id) {
            Some(existing) => plan.unchanged.push(Matched {
                existing: existing.clone(),
                desired: rule,
            }),
            None => plan.create.push(rule),
        }
    }

    plan.stale = existing_order
        .into_iter()
        .filter(|key| !desired_keys.contains(key))
        .filter_map(|key| existing_by_key.remove(&key))
        .collect();

    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::PoolID;

    fn rule(subnet_id: &str, threshold: f64) -> AlarmRule {
        AlarmRule {
            subnet_id: SubnetID::new(subnet_id).unwrap(),
            pool_id: PoolID::new("vpc-1").unwrap(),
            threshold,
            notification_target: "topic".to_owned(),
        }
    }

    fn keys(rules: &[AlarmRule]) -> Vec<&str> {
        rules.iter().map(|r| r.subnet_id.as_str()).collect()
    }

    #[test]
    fn test_reconcile_empty_existing() {
        let desired = vec![rule("s1", 50.0), rule("s2", 50.0), rule("s3", 50.0)];
        let plan = reconcile(desired, vec![]);

        assert_eq!(keys(&plan.create), vec!["s1", "s2", "s3"]);
        assert!(plan.unchanged.is_empty());
        assert!(plan.stale.is_empty());
    }

    #[test]
    fn test_reconcile_identical_keys() {
        let desired = vec![rule("s1", 50.0), rule("s2", 50.0), rule("s3", 50.0)];
        let plan = reconcile(desired.clone(), desired);

        assert!(plan.create.is_empty());
        assert_eq!(plan.unchanged.len(), 3);
        assert!(plan.stale.is_empty());
        assert!(plan.is_converged());
    }

    #[test]
    fn test_reconcile_disappeared_subnet() {
        let existing = vec![rule("s1", 50.0), rule("s2", 50.0), rule("s3", 50.0)];
        let desired = vec![rule("s1", 50.0), rule("s3", 50.0)];
        let plan = reconcile(desired, existing);

        assert!(plan.create.is_empty());
        assert_eq!(plan.unchanged.len(), 2);
        assert_eq!(keys(&plan.stale), vec!["s2"]);
    }

    #[test]
    fn test_reconcile_mixed() {
        let existing = vec![rule("s1", 50.0), rule("gone", 50.0)];
        let desired = vec![rule("s1", 50.0), rule("new", 50.0)];
        let plan = reconcile(desired, existing);

        assert_eq!(keys(&plan.create), vec!["new"]);
        assert_eq!(plan.unchanged[0].desired.subnet_id.as_str(), "s1");
        assert_eq!(keys(&plan.stale), vec!["gone"]);
    }

    #[test]
    fn test_reconcile_threshold_change_stays_unchanged() {
        let plan = reconcile(vec![rule("s1", 80.0)], vec![rule("s1", 50.0)]);

        assert!(plan.create.is_empty());
        assert_eq!(plan.unchanged.len(), 1);
        assert!(plan.stale.is_empty());

        let drifted: Vec<_> = plan.drifted().collect();
        assert_eq!(drifted.len(), 1);
        assert_eq!(drifted[0].existing.threshold, 50.0);
        assert_eq!(drifted[0].desired.threshold, 80.0);
        assert!(!plan.is_converged());
    }

    #[test]
    fn test_reconcile_target_change_is_drift() {
        let mut desired = rule("s1", 50.0);
        desired.notification_target = "other-topic".to_owned();
        let plan = reconcile(vec![desired], vec![rule("s1", 50.0)]);

        assert_eq!(plan.drifted().count(), 1);
    }

    #[test]
    fn test_reconcile_collapses_repeated_keys() {
        let plan = reconcile(
            vec![rule("s1", 50.0), rule("s1", 60.0)],
            vec![rule("s2", 50.0), rule("s2", 50.0)],
        );

        assert_eq!(plan.create.len(), 1);
        assert_eq!(plan.create[0].threshold, 50.0);
        assert_eq!(keys(&plan.stale), vec!["s2"]);
    }

    #[test]
    fn test_reconcile_is_idempotent_after_apply() {
        let desired = vec![rule("s1", 50.0), rule("s2", 50.0)];
        let existing = vec![rule("s1", 50.0)];

        let first = reconcile(desired.clone(), existing.clone());
        let second = reconcile(desired.clone(), existing.clone());
        assert_eq!(first, second);

        // Apply only the creates, then reconcile again.
        let mut applied = existing;
        applied.extend(first.create);
        let converged = reconcile(desired, applied);
        assert!(converged.create.is_empty());
        assert_eq!(converged.unchanged.len(), 2);
        assert!(converged.is_converged());
    }
}
