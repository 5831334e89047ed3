use crate::config::Selector;
use crate::network::{Pool, PoolState, Subnet};

use super::{DiscoveryBackend, Error, PoolFilter, Result};

/// Resolves a [`Selector`] into the concrete `(Pool, Subnet)` pairs to monitor.
#[derive(Debug, Clone)]
pub struct Discoverer<B> {
    backend: B,
}

impl<B: DiscoveryBackend + Sync> Discoverer<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Discovers all subnets selected by `selector`.
    ///
    /// - [`Selector::All`] resolves every pool in state `available`; subnets of
    ///   pools in any other state are never returned.
    /// - [`Selector::Pools`] resolves exactly the named pools, whatever their
    ///   state, in the configured order.
    ///
    /// Subnets are returned in provider order, grouped by pool in the order
    /// the pools were resolved.
    ///
    /// # Errors
    ///
    /// - [`Error::PoolNotFound`] if a named pool does not exist.
    /// - [`Error::NoPools`] if no pool could be resolved at all.
    /// - [`Error::NoSubnets`] if the resolved pools hold no subnet at all.
    /// - Any backend error; nothing is returned for a partially resolved selector.
    pub async fn discover(&self, selector: &Selector) -> Result<Vec<(Pool, Subnet)>> {
        let pools = self.resolve_pools(selector).await?;
        if pools.is_empty() {
            return Err(Error::NoPools);
        }
        log::debug!(target: "discovery", "Resolved {} pools", pools.len());

        let mut out = Vec::new();
        for pool in pools {
            log::debug!(
                target: "discovery",
                "Listing subnets of pool `{}` (state={})",
                pool.id,
                pool.state
            );
            let subnets = self.backend.describe_subnets(&pool.id).await?;
            if subnets.is_empty() {
                log::warn!(target: "discovery", "Pool `{}` has no subnets", pool.id);
            }
            out.extend(subnets.into_iter().map(|subnet| (pool.clone(), subnet)));
        }
        if out.is_empty() {
            return Err(Error::NoSubnets);
        }

        Ok(out)
    }

    async fn resolve_pools(&self, selector: &Selector) -> Result<Vec<Pool>> {
        match selector {
            Selector::All => {
                let pools = self
                    .backend
                    .describe_pools(&PoolFilter::State(PoolState::Available))
                    .await?;
                // Guards against backends that ignore the state filter.
                Ok(pools.into_iter().filter(Pool::is_available).collect())
            }
            Selector::Pools(ids) => {
                let described = self
                    .backend
                    .describe_pools(&PoolFilter::Ids(ids.clone()))
                    .await?;

                let mut out = Vec::with_capacity(ids.len());
                for id in ids {
                    let pool = described
                        .iter()
                        .find(|pool| &pool.id == id)
                        .ok_or_else(|| Error::PoolNotFound(id.clone()))?;
                    out.push(pool.clone());
                }
                Ok(out)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::PoolID;
    use crate::testing::{FakeDiscoveryBackend, pool, subnet};

    fn backend() -> FakeDiscoveryBackend {
        FakeDiscoveryBackend::default()
            .with_pool(
                pool("vpc-a", PoolState::Available),
                vec![
                    subnet("subnet-a1", "vpc-a", "10.0.0.0/24", 200),
                    subnet("subnet-a2", "vpc-a", "10.0.1.0/24", 10),
                ],
            )
            .with_pool(
                pool("vpc-b", PoolState::Pending),
                vec![subnet("subnet-b1", "vpc-b", "10.1.0.0/24", 100)],
            )
            .with_pool(
                pool("vpc-c", PoolState::Available),
                vec![subnet("subnet-c1", "vpc-c", "10.2.0.0/28", 3)],
            )
    }

    fn subnet_ids(discovered: &[(Pool, Subnet)]) -> Vec<&str> {
        discovered.iter().map(|(_, s)| s.id.as_str()).collect()
    }

    fn selector(ids: &[&str]) -> Selector {
        Selector::Pools(ids.iter().map(|id| PoolID::new(id).unwrap()).collect())
    }

    #[tokio::test]
    async fn test_discover_all_only_available_pools() {
        let discoverer = Discoverer::new(backend());
        let discovered = discoverer.discover(&Selector::All).await.unwrap();

        assert_eq!(
            subnet_ids(&discovered),
            vec!["subnet-a1", "subnet-a2", "subnet-c1"]
        );
        assert!(discovered.iter().all(|(pool, _)| pool.is_available()));
    }

    #[tokio::test]
    async fn test_discover_all_ignores_backend_without_state_filter() {
        let discoverer = Discoverer::new(backend().ignoring_state_filter());
        let discovered = discoverer.discover(&Selector::All).await.unwrap();

        assert_eq!(
            subnet_ids(&discovered),
            vec!["subnet-a1", "subnet-a2", "subnet-c1"]
        );
    }

    #[tokio::test]
    async fn test_discover_explicit_bypasses_state_filter() {
        let discoverer = Discoverer::new(backend());
        let discovered = discoverer.discover(&selector(&["vpc-b"])).await.unwrap();

        assert_eq!(subnet_ids(&discovered), vec!["subnet-b1"]);
        assert_eq!(discovered[0].0.state, PoolState::Pending);
    }

    #[tokio::test]
    async fn test_discover_explicit_keeps_configured_order() {
        let discoverer = Discoverer::new(backend());
        let discovered = discoverer
            .discover(&selector(&["vpc-c", "vpc-a"]))
            .await
            .unwrap();

        assert_eq!(
            subnet_ids(&discovered),
            vec!["subnet-c1", "subnet-a1", "subnet-a2"]
        );
        assert_eq!(discovered[0].0.id.as_str(), "vpc-c");
        assert_eq!(discovered[1].0.id.as_str(), "vpc-a");
    }

    #[tokio::test]
    async fn test_discover_missing_pool() {
        let discoverer = Discoverer::new(backend());
        let err = discoverer
            .discover(&selector(&["vpc-a", "vpc-missing"]))
            .await
            .unwrap_err();

        match err {
            Error::PoolNotFound(id) => assert_eq!(id.as_str(), "vpc-missing"),
            other => panic!("unexpected error: {other}"),
        }
        // Nothing is listed for a partially resolved selector.
        assert!(discoverer.backend().described_subnets().is_empty());
    }

    #[tokio::test]
    async fn test_discover_no_available_pools() {
        let discoverer = Discoverer::new(
            FakeDiscoveryBackend::default()
                .with_pool(pool("vpc-b", PoolState::Pending), vec![]),
        );
        let err = discoverer.discover(&Selector::All).await.unwrap_err();
        assert!(matches!(err, Error::NoPools));
    }

    #[tokio::test]
    async fn test_discover_backend_failure() {
        let discoverer = Discoverer::new(backend().failing_pools());
        let err = discoverer.discover(&Selector::All).await.unwrap_err();
        assert!(matches!(err, Error::DescribePools(_)));
    }

    #[tokio::test]
    async fn test_discover_pool_without_subnets() {
        let discoverer = Discoverer::new(
            backend().with_pool(pool("vpc-empty", PoolState::Available), vec![]),
        );
        let discovered = discoverer
            .discover(&selector(&["vpc-empty", "vpc-c"]))
            .await
            .unwrap();
        assert_eq!(subnet_ids(&discovered), vec!["subnet-c1"]);
    }

    #[tokio::test]
    async fn test_discover_pools_without_any_subnet() {
        let discoverer = Discoverer::new(
            backend().with_pool(pool("vpc-empty", PoolState::Available), vec![]),
        );
        let err = discoverer
            .discover(&selector(&["vpc-empty"]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NoSubnets));
        assert_eq!(discoverer.backend().described_subnets().len(), 1);
    }
}
