//! Subnet address utilization.
//!
//! Turns a [`Subnet`] descriptor into a [`UtilizationSample`]: the share of the
//! subnet's address range that is currently in use, as a percentage.

use crate::network::{self, Subnet, SubnetID};

/// Largest range whose utilization still changes with every single address.
pub const MAX_ADDRESS_COUNT: u128 = 1 << 32;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid address range for subnet `{subnet_id}`: {source}")]
    InvalidCidr {
        subnet_id: SubnetID,
        #[source]
        source: network::Error,
    },
    #[error("address range `{cidr_block}` of subnet `{subnet_id}` is too large: {total} addresses")]
    RangeTooLarge {
        subnet_id: SubnetID,
        cidr_block: String,
        total: u128,
    },
    #[error(
        "subnet `{subnet_id}` reports {available} available addresses, \
         but its range only holds {total}"
    )]
    AvailableExceedsTotal {
        subnet_id: SubnetID,
        available: u64,
        total: u128,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Utilization of a single subnet at a point in time.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct UtilizationSample {
    subnet_id: SubnetID,
    total: u128,
    available: u64,
    used: u128,
    percentage: f64,
    /// Timestamp (in UNIX epoch seconds)
    timestamp: u64,
}

impl UtilizationSample {
    pub fn subnet_id(&self) -> &SubnetID {
        &self.subnet_id
    }

    pub fn total(&self) -> u128 {
        self.total
    }

    pub fn available(&self) -> u64 {
        self.available
    }

    pub fn used(&self) -> u128 {
        self.used
    }

    /// Percentage of the address range in use, within `0.0..=100.0`.
    pub fn percentage(&self) -> f64 {
        self.percentage
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Returns `true` if this sample would trigger an alarm with the given threshold.
    pub fn exceeds(&self, threshold: f64) -> bool {
        self.percentage >= threshold
    }
}

/// Computes the address utilization of `subnet`.
///
/// The total capacity is the full size of the subnet's CIDR block, reserved
/// addresses included. The percentage is `100 - available * 100 / total`.
///
/// # Errors
///
/// - [`Error::InvalidCidr`] if the subnet's CIDR block cannot be parsed.
/// - [`Error::RangeTooLarge`] if the range holds more than
///   [`MAX_ADDRESS_COUNT`] addresses. A range always holds at least one.
/// - [`Error::AvailableExceedsTotal`] if the provider reports more available
///   addresses than the range can hold.
///
/// # Examples
///
/// ```
/// # use subnet_monitor::network::{PoolID, Subnet, SubnetID};
/// # use subnet_monitor::utilization;
/// let subnet = Subnet::new(
///     SubnetID::new("subnet-1").unwrap(),
///     PoolID::new("vpc-1").unwrap(),
///     "10.0.1.0/24",
///     56,
/// );
/// let sample = utilization::compute(&subnet, 0).unwrap();
/// assert_eq!(sample.used(), 200);
/// assert_eq!(format!("{:.1}", sample.percentage()), "78.1");
/// ```
pub fn compute(subnet: &Subnet, timestamp: u64) -> Result<UtilizationSample> {
    let cidr = subnet.cidr().map_err(|source| Error::InvalidCidr {
        subnet_id: subnet.id.clone(),
        source,
    })?;
    let total = cidr.address_count();
    if total > MAX_ADDRESS_COUNT {
        return Err(Error::RangeTooLarge {
            subnet_id: subnet.id.clone(),
            cidr_block: subnet.cidr_block.clone(),
            total,
        });
    }

    let available = subnet.available;
    if u128::from(available) > total {
        return Err(Error::AvailableExceedsTotal {
            subnet_id: subnet.id.clone(),
            available,
            total,
        });
    }

    let used = total - u128::from(available);
    let percentage = 100.0 - (available as f64 * 100.0) / total as f64;

    Ok(UtilizationSample {
        subnet_id: subnet.id.clone(),
        total,
        available,
        used,
        percentage: percentage.clamp(0.0, 100.0),
        timestamp,
    })
}
