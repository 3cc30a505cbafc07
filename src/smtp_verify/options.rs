use std::time::Duration;

use crate::config::ValidationConfig;

/// Configuration knobs for [`probe_mailbox`](super::probe_mailbox).
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpProbeOptions {
    pub port: u16,
    pub helo_domain: String,
    pub mail_from: String,
    /// Connect, read and write deadline.
    pub timeout: Duration,
    pub max_exchangers: usize,
    /// A definitive rejection (550/551/553) becomes fatal.
    pub strict: bool,
}

impl Default for SmtpProbeOptions {
    fn default() -> Self {
        Self::from(&ValidationConfig::default())
    }
}

impl From<&ValidationConfig> for SmtpProbeOptions {
    fn from(config: &ValidationConfig) -> Self {
        Self {
            port: config.smtp_port,
            helo_domain: config.helo_domain.trim().to_string(),
            mail_from: config.mail_from.clone(),
            timeout: config.smtp_timeout(),
            max_exchangers: 3,
            strict: config.strict_smtp,
        }
    }
}
