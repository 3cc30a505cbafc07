use std::sync::LazyLock;

use regex::Regex;

static LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9-]+$").expect("label pattern"));
static TLD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z]{2,}$").expect("tld pattern"));

const MAX_LABEL_LENGTH: usize = 63;

/// Checks the domain: DNS labels and an alphabetic TLD of at least two
/// letters. Every failed rule is pushed onto `reasons`.
pub(crate) fn check_domain(domain: &str, reasons: &mut Vec<String>) {
    let labels: Vec<&str> = domain.split('.').collect();

    // at least two labels
    if labels.len() < 2 {
        reasons.push("domain must contain at least one dot".to_string());
    }

    for label in &labels {
        if label.is_empty() {
            reasons.push("empty domain label".to_string());
            continue;
        }
        if label.len() > MAX_LABEL_LENGTH {
            reasons.push(format!(
                "domain label '{}' length {} > {MAX_LABEL_LENGTH}",
                label,
                label.len()
            ));
        }
        if label.starts_with('-') || label.ends_with('-') {
            reasons.push(format!(
                "domain label '{}' cannot start/end with '-'",
                label
            ));
        }
        if !LABEL.is_match(label) {
            reasons.push(format!("domain label '{}' has invalid chars", label));
        }
    }

    if labels.len() >= 2 {
        if let Some(tld) = labels.last().filter(|tld| !tld.is_empty()) {
            if !TLD.is_match(tld) {
                reasons.push(format!(
                    "top-level domain '{}' must be alphabetic (2+ letters)",
                    tld
                ));
            }
        }
    }
}
