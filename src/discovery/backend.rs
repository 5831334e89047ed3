use crate::network::{Pool, PoolID, PoolState, Subnet};

use super::Result;

/// Which pools to request from the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolFilter {
    /// Every pool in the given lifecycle state.
    State(PoolState),
    /// Exactly the given pools, regardless of their state.
    Ids(Vec<PoolID>),
}

/// Read-only access to the provider's pool and subnet inventory.
pub trait DiscoveryBackend {
    /// Describes the pools matching `filter`.
    ///
    /// For [`PoolFilter::Ids`], implementations either fail with
    /// [`Error::PoolNotFound`](super::Error::PoolNotFound) or omit unknown
    /// pools from the answer; the [`Discoverer`](super::Discoverer) treats both
    /// the same way.
    fn describe_pools(
        &self,
        filter: &PoolFilter,
    ) -> impl std::future::Future<Output = Result<Vec<Pool>>> + Send;

    /// Describes all subnets of `pool_id`, in provider order.
    fn describe_subnets(
        &self,
        pool_id: &PoolID,
    ) -> impl std::future::Future<Output = Result<Vec<Subnet>>> + Send;
}
