//! CIDR block parsing for subnet address ranges.
//!
//! Accepts the `<address>/<prefix>` notation reported by the provider for both
//! IPv4 (`10.0.1.0/24`) and IPv6 (`2001:db8::/64`) ranges.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use super::{Error, Result};

/// A parsed address range in CIDR notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cidr {
    address: IpAddr,
    prefix: u8,
}

impl Cidr {
    /// Creates a [`Cidr`] from an address and a prefix length.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PrefixTooLong`] if `prefix` exceeds the address width
    /// (32 bits for IPv4, 128 bits for IPv6).
    pub fn new(address: IpAddr, prefix: u8) -> Result<Self> {
        let max = max_prefix(&address);
        if prefix > max {
            return Err(Error::PrefixTooLong {
                value: format!("{address}/{prefix}"),
                prefix,
                max,
            });
        }

        Ok(Self { address, prefix })
    }

    pub fn address(&self) -> IpAddr {
        self.address
    }

    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    /// Returns the number of addresses representable by this range.
    ///
    /// Reserved addresses (network, broadcast, provider-reserved) are included.
    /// A `/32` IPv4 or `/128` IPv6 range holds exactly one address. The count
    /// saturates at [`u128::MAX`] for an IPv6 `/0`, which cannot be represented.
    ///
    /// # Examples
    ///
    /// ```
    /// # use subnet_monitor::network::Cidr;
    /// let cidr: Cidr = "10.0.1.0/24".parse().unwrap();
    /// assert_eq!(cidr.address_count(), 256);
    /// ```
    pub fn address_count(&self) -> u128 {
        let host_bits = u32::from(max_prefix(&self.address) - self.prefix);
        1u128.checked_shl(host_bits).unwrap_or(u128::MAX)
    }
}

fn max_prefix(address: &IpAddr) -> u8 {
    match address {
        IpAddr::V4(_) => 32,
        IpAddr::V6(_) => 128,
    }
}

impl FromStr for Cidr {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (address, prefix) = s
            .split_once('/')
            .ok_or_else(|| Error::MissingPrefix(s.to_owned()))?;
        let address = address
            .parse::<IpAddr>()
            .map_err(|source| Error::InvalidAddress {
                value: s.to_owned(),
                source,
            })?;
        let prefix = prefix
            .parse::<u8>()
            .map_err(|source| Error::InvalidPrefix {
                value: s.to_owned(),
                source,
            })?;

        Cidr::new(address, prefix)
    }
}

impl fmt::Display for Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_count_ipv4() {
        let cases: [(&str, u128); 5] = [
            ("10.0.0.0/16", 65_536),
            ("10.0.1.0/24", 256),
            ("10.0.1.0/28", 16),
            ("10.0.1.7/32", 1),
            ("0.0.0.0/0", 1 << 32),
        ];
        for (raw, expected) in cases {
            let cidr: Cidr = raw.parse().unwrap();
            assert_eq!(cidr.address_count(), expected, "{raw}");
        }
    }

    #[test]
    fn test_address_count_ipv6() {
        let cidr: Cidr = "2001:db8::/64".parse().unwrap();
        assert_eq!(cidr.address_count(), 1u128 << 64);

        let host: Cidr = "2001:db8::1/128".parse().unwrap();
        assert_eq!(host.address_count(), 1);

        let everything: Cidr = "::/0".parse().unwrap();
        assert_eq!(everything.address_count(), u128::MAX);
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let cidr: Cidr = " 172.31.0.0/20\n".parse().unwrap();
        assert_eq!(cidr.prefix(), 20);
        assert_eq!(cidr.to_string(), "172.31.0.0/20");
    }

    #[test]
    fn test_parse_missing_prefix() {
        let err = "10.0.0.0".parse::<Cidr>().unwrap_err();
        assert!(matches!(err, Error::MissingPrefix(_)));
    }

    #[test]
    fn test_parse_invalid_address() {
        let err = "10.0.0.300/24".parse::<Cidr>().unwrap_err();
        assert!(matches!(err, Error::InvalidAddress { .. }));
    }

    #[test]
    fn test_parse_invalid_prefix() {
        let err = "10.0.0.0/abc".parse::<Cidr>().unwrap_err();
        assert!(matches!(err, Error::InvalidPrefix { .. }));

        let err = "10.0.0.0/".parse::<Cidr>().unwrap_err();
        assert!(matches!(err, Error::InvalidPrefix { .. }));
    }

    #[test]
    fn test_parse_prefix_too_long() {
        let err = "10.0.0.0/33".parse::<Cidr>().unwrap_err();
        match err {
            Error::PrefixTooLong { prefix, max, .. } => {
                assert_eq!(prefix, 33);
                assert_eq!(max, 32);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
