use std::fmt;

use crate::mx::MailExchanger;

/// Weight of a check outcome. Only [`Severity::Fatal`] outcomes take part in
/// the final verdict.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "with-serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Fatal,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fatal => f.write_str("FATAL"),
            Self::Warning => f.write_str("WARNING"),
            Self::Info => f.write_str("INFO"),
        }
    }
}

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "with-serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Format,
    Disposable,
    Dns,
    Smtp,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Format => f.write_str("format"),
            Self::Disposable => f.write_str("disposable"),
            Self::Dns => f.write_str("dns"),
            Self::Smtp => f.write_str("smtp"),
        }
    }
}

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub stage: Stage,
    pub passed: bool,
    pub severity: Severity,
    pub message: String,
}

impl CheckOutcome {
    pub fn new(stage: Stage, passed: bool, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            stage,
            passed,
            severity,
            message: message.into(),
        }
    }

    pub fn pass(stage: Stage, severity: Severity, message: impl Into<String>) -> Self {
        Self::new(stage, true, severity, message)
    }

    pub fn fail(stage: Stage, severity: Severity, message: impl Into<String>) -> Self {
        Self::new(stage, false, severity, message)
    }

    /// True when this outcome invalidates the address.
    pub fn is_blocking(&self) -> bool {
        self.severity == Severity::Fatal && !self.passed
    }
}

impl fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match (self.passed, self.severity) {
            (true, _) => "ok",
            (false, Severity::Fatal) => "fatal",
            (false, Severity::Warning) => "warning",
            (false, Severity::Info) => "info",
        };
        write!(f, "{}: {status} - {}", self.stage, self.message)
    }
}

/// Ordered result of one pipeline run.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub address: String,
    pub outcomes: Vec<CheckOutcome>,
    pub exchangers: Vec<MailExchanger>,
}

impl ValidationReport {
    pub(crate) fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            outcomes: Vec::new(),
            exchangers: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, outcome: CheckOutcome) {
        self.outcomes.push(outcome);
    }

    /// AND over every executed fatal-severity outcome. Skipped stages leave
    /// no outcome behind and therefore do not count.
    pub fn is_valid(&self) -> bool {
        !self.outcomes.iter().any(CheckOutcome::is_blocking)
    }

    pub fn outcome(&self, stage: Stage) -> Option<&CheckOutcome> {
        self.outcomes.iter().find(|o| o.stage == stage)
    }

    pub fn ran(&self, stage: Stage) -> bool {
        self.outcome(stage).is_some()
    }
}

/// One line per executed stage, then the verdict.
impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for outcome in &self.outcomes {
            writeln!(f, "{outcome}")?;
        }
        let verdict = if self.is_valid() { "valid" } else { "invalid" };
        write!(f, "{}: {verdict}", self.address)
    }
}
