use crate::error::BoxError;
use crate::network::PoolID;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to describe pools: {0}")]
    DescribePools(#[source] BoxError),
    #[error("failed to describe subnets of pool `{pool_id}`: {source}")]
    DescribeSubnets {
        pool_id: PoolID,
        #[source]
        source: BoxError,
    },
    #[error("pool `{0}` does not exist")]
    PoolNotFound(PoolID),
    #[error("no available pools found")]
    NoPools,
    #[error("the selected pools hold no subnets")]
    NoSubnets,
    #[error("provider returned an invalid resource: {0}")]
    InvalidResource(#[source] crate::network::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
