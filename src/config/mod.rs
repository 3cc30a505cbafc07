//! Immutable switches and limits for a validation run.

mod error;

pub use error::ConfigError;

use std::time::Duration;

pub const RFC_MAX_LOCAL_LENGTH: usize = 64;
pub const RFC_MAX_DOMAIN_LENGTH: usize = 255;
pub const RFC_MAX_TOTAL_LENGTH: usize = 254;
const MAX_TIMEOUT_SECS: u64 = 300;

/// Settings for [`ValidationPipeline`](crate::ValidationPipeline).
///
/// Built once per invocation; the pipeline takes ownership and only hands out
/// shared references afterwards.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationConfig {
    pub check_dns: bool,
    pub check_disposable: bool,
    pub check_smtp: bool,
    /// Render every stage outcome, not just the verdict. Read by callers
    /// when presenting reports; the checks themselves ignore it.
    pub verbose: bool,
    /// Treat a 550/551/553 RCPT TO rejection as fatal.
    pub strict_smtp: bool,
    pub max_local_length: usize,
    pub max_domain_length: usize,
    pub max_total_length: usize,
    pub smtp_timeout_seconds: u64,
    pub dns_timeout_seconds: u64,
    pub smtp_port: u16,
    pub helo_domain: String,
    pub mail_from: String,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            check_dns: true,
            check_disposable: true,
            check_smtp: true,
            verbose: false,
            strict_smtp: false,
            max_local_length: RFC_MAX_LOCAL_LENGTH,
            max_domain_length: RFC_MAX_DOMAIN_LENGTH,
            max_total_length: RFC_MAX_TOTAL_LENGTH,
            smtp_timeout_seconds: 5,
            dns_timeout_seconds: 5,
            smtp_port: 25,
            helo_domain: "localhost".to_string(),
            mail_from: "verify@localhost".to_string(),
        }
    }
}

impl ValidationConfig {
    /// Format and disposable checks only; no network access.
    pub fn offline() -> Self {
        Self {
            check_dns: false,
            check_smtp: false,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range(
            "max_local_length",
            self.max_local_length as u64,
            1,
            RFC_MAX_LOCAL_LENGTH as u64,
        )?;
        check_range(
            "max_domain_length",
            self.max_domain_length as u64,
            1,
            RFC_MAX_DOMAIN_LENGTH as u64,
        )?;
        // shortest acceptable address: a@b.cc
        check_range(
            "max_total_length",
            self.max_total_length as u64,
            6,
            RFC_MAX_TOTAL_LENGTH as u64,
        )?;
        check_range(
            "smtp_timeout_seconds",
            self.smtp_timeout_seconds,
            1,
            MAX_TIMEOUT_SECS,
        )?;
        check_range(
            "dns_timeout_seconds",
            self.dns_timeout_seconds,
            1,
            MAX_TIMEOUT_SECS,
        )?;
        check_range("smtp_port", u64::from(self.smtp_port), 1, u64::from(u16::MAX))?;

        if self.helo_domain.trim().is_empty() {
            return Err(ConfigError::EmptyHeloDomain);
        }
        match self.mail_from.rsplit_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
            _ => return Err(ConfigError::InvalidMailFrom(self.mail_from.clone())),
        }
        if self.strict_smtp && !self.check_smtp {
            return Err(ConfigError::StrictWithoutSmtp);
        }
        Ok(())
    }

    pub fn smtp_timeout(&self) -> Duration {
        Duration::from_secs(self.smtp_timeout_seconds)
    }

    pub fn dns_timeout(&self) -> Duration {
        Duration::from_secs(self.dns_timeout_seconds)
    }
}

fn check_range(name: &'static str, value: u64, min: u64, max: u64) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::out_of_range(name, value, min, max))
    }
}
