#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid pool id: `{0}`")]
    InvalidPoolID(String),
    #[error("invalid subnet id: `{0}`")]
    InvalidSubnetID(String),
    #[error("invalid cidr block `{0}`: missing `/` separator")]
    MissingPrefix(String),
    #[error("invalid cidr block `{value}`: {source}")]
    InvalidAddress {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("invalid prefix length in cidr block `{value}`: {source}")]
    InvalidPrefix {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("prefix length /{prefix} exceeds {max} bits in cidr block `{value}`")]
    PrefixTooLong { value: String, prefix: u8, max: u8 },
}

pub type Result<T> = std::result::Result<T, Error>;
