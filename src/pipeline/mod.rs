//! Ordered validation: format, disposable, DNS, SMTP.
//!
//! A failed format check stops the run. A failed DNS check skips SMTP. The
//! disposable check never stops anything. Disabled or skipped stages leave no
//! outcome in the report.

mod error;

pub use error::PipelineError;

use crate::config::ValidationConfig;
use crate::disposable::{self, DisposableRegistry};
use crate::mx::{MailHostLookup, SystemResolver, check_dns};
use crate::report::ValidationReport;
use crate::smtp_verify::{Connector, SmtpProbeOptions, TcpConnector, probe_mailbox};
use crate::validator::check_format;

pub struct ValidationPipeline<R = SystemResolver, C = TcpConnector> {
    config: ValidationConfig,
    smtp_options: SmtpProbeOptions,
    registry: &'static DisposableRegistry,
    resolver: R,
    connector: C,
}

impl ValidationPipeline {
    /// System resolver and plain TCP for SMTP.
    pub fn new(config: ValidationConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        let resolver = SystemResolver::new(config.dns_timeout())?;
        let connector = TcpConnector::new(resolver.clone());
        Ok(Self::assemble(config, resolver, connector))
    }
}

impl<R, C> ValidationPipeline<R, C>
where
    R: MailHostLookup,
    C: Connector,
{
    pub fn with_parts(
        config: ValidationConfig,
        resolver: R,
        connector: C,
    ) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self::assemble(config, resolver, connector))
    }

    fn assemble(config: ValidationConfig, resolver: R, connector: C) -> Self {
        Self {
            smtp_options: SmtpProbeOptions::from(&config),
            registry: disposable::global(),
            config,
            resolver,
            connector,
        }
    }

    pub fn with_registry(mut self, registry: &'static DisposableRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    #[tracing::instrument(level = "debug", skip(self), fields(valid))]
    pub fn validate(&self, email: &str) -> ValidationReport {
        let report = self.run(email);
        tracing::Span::current().record("valid", report.is_valid());
        report
    }

    pub fn validate_all<I, S>(&self, emails: I) -> Vec<ValidationReport>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        emails
            .into_iter()
            .map(|email| self.validate(email.as_ref()))
            .collect()
    }

    fn run(&self, email: &str) -> ValidationReport {
        let mut report = ValidationReport::new(email.trim());

        let format = check_format(email, &self.config);
        tracing::debug!(outcome = %format.outcome, "format stage");
        report.push(format.outcome);
        let Some(address) = format.address else {
            return report;
        };

        if self.config.check_disposable {
            let outcome = self.registry.check(address.domain());
            tracing::debug!(%outcome, "disposable stage");
            report.push(outcome);
        }

        if !self.config.check_dns {
            return report;
        }
        let dns = check_dns(&self.resolver, address.domain());
        let dns_passed = dns.outcome.passed;
        report.push(dns.outcome);
        report.exchangers = dns.exchangers;
        if !dns_passed || !self.config.check_smtp {
            return report;
        }

        let probe = probe_mailbox(
            &self.connector,
            &report.exchangers,
            &address,
            &self.smtp_options,
        );
        for line in &probe.transcript {
            tracing::debug!("{line}");
        }
        if !probe.outcome.passed {
            tracing::debug!(address = %address, verdict = %probe.verdict, "mailbox not confirmed");
        }
        report.push(probe.outcome);
        report
    }
}

/// Builds a system pipeline for `config` and validates a single address.
pub fn validate_email(
    email: &str,
    config: ValidationConfig,
) -> Result<ValidationReport, PipelineError> {
    Ok(ValidationPipeline::new(config)?.validate(email))
}
