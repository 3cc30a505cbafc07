use thiserror::Error;

use crate::mx::DnsError;

/// Failures inside one SMTP session. The probe never returns these to the
/// pipeline; they end up as the reason of an inconclusive verdict.
#[derive(Debug, Error)]
pub enum SmtpError {
    #[error("connection to {host} failed: {source}")]
    Connect {
        host: String,
        #[source]
        source: std::io::Error,
    },
    #[error("address lookup for {host} failed: {source}")]
    Resolve {
        host: String,
        #[source]
        source: DnsError,
    },
    #[error("I/O error: {source}")]
    Io {
        #[source]
        source: std::io::Error,
    },
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl SmtpError {
    pub(crate) fn connect(host: impl Into<String>, source: std::io::Error) -> Self {
        Self::Connect {
            host: host.into(),
            source,
        }
    }

    pub(crate) fn resolve(host: impl Into<String>, source: DnsError) -> Self {
        Self::Resolve {
            host: host.into(),
            source,
        }
    }

    pub(crate) fn io(source: std::io::Error) -> Self {
        Self::Io { source }
    }

    pub(crate) fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }
}
