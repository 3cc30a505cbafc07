use thiserror::Error;

/// Rejected [`ValidationConfig`](super::ValidationConfig) values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} = {value} is out of range ({min}..={max})")]
    OutOfRange {
        name: &'static str,
        value: u64,
        min: u64,
        max: u64,
    },
    #[error("HELO domain must not be empty")]
    EmptyHeloDomain,
    #[error("MAIL FROM sender '{0}' is not an address")]
    InvalidMailFrom(String),
    #[error("strict SMTP requires the SMTP check to be enabled")]
    StrictWithoutSmtp,
}

impl ConfigError {
    pub(crate) fn out_of_range(name: &'static str, value: u64, min: u64, max: u64) -> Self {
        Self::OutOfRange {
            name,
            value,
            min,
            max,
        }
    }
}
