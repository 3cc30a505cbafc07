use std::fmt;

use crate::report::CheckOutcome;

/// Classification of the observed SMTP behaviour for a mailbox.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MailboxVerdict {
    /// RCPT TO answered 250 or 251.
    Exists { code: u16 },
    /// RCPT TO answered 550, 551 or 553.
    Rejected { code: u16 },
    /// No exchanger gave a definitive answer. Holds the last reason seen
    /// (unreachable host, temporary failure, policy, timeout...).
    Unverified(String),
}

impl MailboxVerdict {
    pub fn is_conclusive(&self) -> bool {
        matches!(self, Self::Exists { .. } | Self::Rejected { .. })
    }
}

impl fmt::Display for MailboxVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exists { code } => write!(f, "Exists ({code})"),
            Self::Rejected { code } => write!(f, "Rejected ({code})"),
            Self::Unverified(reason) => write!(f, "Unverified ({reason})"),
        }
    }
}

/// Final report produced by [`probe_mailbox`](super::probe_mailbox).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpProbeReport {
    pub outcome: CheckOutcome,
    pub verdict: MailboxVerdict,
    pub exchangers_tried: Vec<String>,
    pub transcript: Vec<String>,
}
