//! Mail-routing lookup: MX records with the RFC 5321 A/AAAA fallback.
//!
//! [`check_dns`] never fails: resolver errors are folded into a fatal
//! [`CheckOutcome`] so the pipeline can report them like any other verdict.

mod error;
mod resolver;
mod types;

pub use error::DnsError;
pub use resolver::{MailHostLookup, SystemResolver};
pub use types::{DnsCheck, MailExchanger, Resolution};

use crate::report::{CheckOutcome, Severity, Stage};

const NO_MAIL_RECORDS: &str = "domain has no mail-capable DNS records";

/// Resolves the mail exchangers for `domain` using `lookup`.
pub fn resolve_exchangers<L>(lookup: &L, domain: &str) -> Result<Resolution, DnsError>
where
    L: MailHostLookup + ?Sized,
{
    let ascii = resolver::normalize_domain(domain)?;
    resolver::resolve_with(lookup, &ascii)
}

pub fn check_dns<L>(lookup: &L, domain: &str) -> DnsCheck
where
    L: MailHostLookup + ?Sized,
{
    let resolution = match resolve_exchangers(lookup, domain) {
        Ok(resolution) => resolution,
        Err(err) => {
            tracing::debug!(domain, error = %err, "DNS check failed");
            return DnsCheck {
                outcome: CheckOutcome::fail(
                    Stage::Dns,
                    Severity::Fatal,
                    format!("{NO_MAIL_RECORDS} ({err})"),
                ),
                exchangers: Vec::new(),
            };
        }
    };

    let outcome = match &resolution {
        Resolution::Mx(records) => CheckOutcome::pass(
            Stage::Dns,
            Severity::Fatal,
            format!("{} MX record(s), preferred {}", records.len(), records[0].host),
        ),
        Resolution::Implicit(record) => CheckOutcome::pass(
            Stage::Dns,
            Severity::Fatal,
            format!("no MX record, {} has A/AAAA records", record.host),
        ),
        Resolution::NullMx => CheckOutcome::fail(
            Stage::Dns,
            Severity::Fatal,
            "domain does not accept mail (null MX)",
        ),
        Resolution::NoRecords => CheckOutcome::fail(Stage::Dns, Severity::Fatal, NO_MAIL_RECORDS),
    };
    tracing::debug!(domain, ?resolution, "DNS check done");

    DnsCheck {
        outcome,
        exchangers: resolution.exchangers().to_vec(),
    }
}
