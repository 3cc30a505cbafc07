use std::sync::LazyLock;

use regex::Regex;

/// Practical subset: letters, digits and `. _ % + -`.
static LOCAL_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._%+-]+$").expect("local-part pattern"));

/// Checks the local part, pushing every failed rule onto `reasons`.
pub(crate) fn check_local(local: &str, reasons: &mut Vec<String>) {
    if !LOCAL_CHARS.is_match(local) {
        reasons.push("local part has invalid characters".to_string());
    }
    if local.starts_with('.') || local.ends_with('.') {
        reasons.push("local part cannot start/end with '.'".to_string());
    }
    if local.contains("..") {
        reasons.push("local part cannot contain consecutive dots".to_string());
    }
}
