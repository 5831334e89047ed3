//! Resolution of a [`Selector`](crate::config::Selector) into the pools and
//! subnets to monitor.
mod backend;
mod discoverer;
#[cfg(feature = "aws")]
mod ec2;
mod error;

pub use backend::{DiscoveryBackend, PoolFilter};
pub use discoverer::Discoverer;
#[cfg(feature = "aws")]
pub use ec2::Ec2DiscoveryBackend;
pub use error::{Error, Result};
