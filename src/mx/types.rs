use crate::report::CheckOutcome;

/// Host allowed to accept mail for a domain. Lower `priority` is preferred.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailExchanger {
    pub host: String,
    pub priority: u16,
}

impl MailExchanger {
    pub fn new(host: impl Into<String>, priority: u16) -> Self {
        Self {
            host: host.into(),
            priority,
        }
    }
}

/// What DNS says about a domain's mail routing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// MX records, sorted ascending by priority.
    Mx(Vec<MailExchanger>),
    /// No MX, but the domain itself has A/AAAA records.
    Implicit(MailExchanger),
    /// RFC 7505: the domain publishes an MX of `.`.
    NullMx,
    NoRecords,
}

impl Resolution {
    pub fn exchangers(&self) -> &[MailExchanger] {
        match self {
            Self::Mx(records) => records.as_slice(),
            Self::Implicit(record) => std::slice::from_ref(record),
            Self::NullMx | Self::NoRecords => &[],
        }
    }
}

/// Output of the DNS stage: the outcome plus the exchangers SMTP may probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsCheck {
    pub outcome: CheckOutcome,
    pub exchangers: Vec<MailExchanger>,
}
