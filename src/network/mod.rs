//! Address pool (VPC) and subnet descriptors as reported by the provider.
//!
//! The monitor only reads these; it never modifies pools or subnets.
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

mod cidr;
mod error;

pub use cidr::Cidr;
pub use error::{Error, Result};

/// The maximum allowed length for a [`PoolID`] or [`SubnetID`].
const RESOURCE_ID_MAX_LEN: usize = 255;

fn validate_resource_id(src: &str) -> bool {
    !src.is_empty() && src.len() <= RESOURCE_ID_MAX_LEN && !src.chars().any(char::is_whitespace)
}

/// A validated address pool identifier (e.g., `vpc-01e52581bab413b49`).
///
/// # Examples
///
/// ```
/// # use subnet_monitor::network::PoolID;
/// let pool_id = PoolID::new("vpc-01e52581bab413b49").unwrap();
/// assert_eq!(pool_id.as_ref(), "vpc-01e52581bab413b49");
/// assert!(PoolID::new("").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PoolID(Arc<str>);

impl PoolID {
    /// Creates a new `PoolID` from the given raw id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPoolID`] if the id is empty, contains whitespace
    /// or exceeds [`RESOURCE_ID_MAX_LEN`].
    pub fn new(src: impl AsRef<str>) -> Result<Self> {
        let src = src.as_ref();
        if !validate_resource_id(src) {
            return Err(Error::InvalidPoolID(src.to_owned()));
        }

        Ok(Self(src.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for PoolID {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl AsRef<str> for PoolID {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for PoolID {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PoolID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated subnet identifier (e.g., `subnet-0a1b2c3d`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubnetID(Arc<str>);

impl SubnetID {
    /// Creates a new `SubnetID` from the given raw id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSubnetID`] if the id is empty, contains whitespace
    /// or exceeds [`RESOURCE_ID_MAX_LEN`].
    pub fn new(src: impl AsRef<str>) -> Result<Self> {
        let src = src.as_ref();
        if !validate_resource_id(src) {
            return Err(Error::InvalidSubnetID(src.to_owned()));
        }

        Ok(Self(src.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for SubnetID {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl AsRef<str> for SubnetID {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for SubnetID {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubnetID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl serde::Serialize for SubnetID {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

/// Lifecycle state of an address pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolState {
    Available,
    Pending,
    /// Any state the provider reports that the monitor does not know about.
    Other(String),
}

impl PoolState {
    pub fn as_str(&self) -> &str {
        match self {
            PoolState::Available => "available",
            PoolState::Pending => "pending",
            PoolState::Other(state) => state,
        }
    }
}

impl From<&str> for PoolState {
    fn from(value: &str) -> Self {
        match value {
            "available" => PoolState::Available,
            "pending" => PoolState::Pending,
            other => PoolState::Other(other.to_owned()),
        }
    }
}

impl fmt::Display for PoolState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A logical network address container (a cloud VPC).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pool {
    pub id: PoolID,
    pub state: PoolState,
}

impl Pool {
    pub fn new(id: PoolID, state: PoolState) -> Self {
        Self { id, state }
    }

    pub fn is_available(&self) -> bool {
        self.state == PoolState::Available
    }
}

/// A contiguous address range within a [`Pool`].
///
/// `cidr_block` is kept as reported by the provider; it is parsed when the
/// utilization is computed so that a malformed range surfaces as an error for
/// that subnet only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subnet {
    pub id: SubnetID,
    pub pool_id: PoolID,
    pub cidr_block: String,
    /// Number of currently available addresses, as reported by the provider.
    pub available: u64,
}

impl Subnet {
    pub fn new(
        id: SubnetID,
        pool_id: PoolID,
        cidr_block: impl Into<String>,
        available: u64,
    ) -> Self {
        Self {
            id,
            pool_id,
            cidr_block: cidr_block.into(),
            available,
        }
    }

    pub fn cidr(&self) -> Result<Cidr> {
        self.cidr_block.parse()
    }
}
