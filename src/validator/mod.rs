mod domain;
mod local;
mod types;

pub use types::{EmailAddress, StructureError};

use domain::check_domain;
use local::check_local;

use crate::config::ValidationConfig;
use crate::report::{CheckOutcome, Severity, Stage};

/// Result of the format stage. `address` is present only when the input
/// passed every rule, so later stages never see a malformed address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatCheck {
    pub outcome: CheckOutcome,
    pub address: Option<EmailAddress>,
}

pub fn check_format(email: &str, config: &ValidationConfig) -> FormatCheck {
    let input = email.trim();

    let mut reasons = Vec::new();

    if input.len() > config.max_total_length {
        reasons.push(format!(
            "total length {} > {}",
            input.len(),
            config.max_total_length
        ));
    }

    let address = match EmailAddress::parse(input) {
        Ok(address) => address,
        Err(err) => {
            reasons.push(err.to_string());
            return FormatCheck {
                outcome: CheckOutcome::fail(Stage::Format, Severity::Fatal, reasons.join("; ")),
                address: None,
            };
        }
    };
    let (local, domain) = (address.local_part(), address.domain());

    if local.len() > config.max_local_length {
        reasons.push(format!(
            "local part length {} > {}",
            local.len(),
            config.max_local_length
        ));
    }
    if domain.len() > config.max_domain_length {
        reasons.push(format!(
            "domain length {} > {}",
            domain.len(),
            config.max_domain_length
        ));
    }

    check_local(local, &mut reasons);
    check_domain(domain, &mut reasons);

    if reasons.is_empty() {
        FormatCheck {
            outcome: CheckOutcome::pass(Stage::Format, Severity::Fatal, "valid format"),
            address: Some(address),
        }
    } else {
        FormatCheck {
            outcome: CheckOutcome::fail(Stage::Format, Severity::Fatal, reasons.join("; ")),
            address: None,
        }
    }
}
