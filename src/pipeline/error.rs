use thiserror::Error;

use crate::config::ConfigError;
use crate::mx::DnsError;

/// Reasons a pipeline cannot be built. Validating an address never fails.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Dns(#[from] DnsError),
}
