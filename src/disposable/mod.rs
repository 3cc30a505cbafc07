//! Known throwaway-mailbox providers.
//!
//! The registry is process-wide and read-only: [`global`] initialises it on
//! first use with the built-in list, unless [`install`] provided another one
//! before that.

mod error;

pub use error::RegistryError;

use std::collections::HashSet;
use std::io::BufRead;
use std::sync::OnceLock;

use phf::phf_set;

use crate::report::{CheckOutcome, Severity, Stage};

static BUILTIN: phf::Set<&'static str> = phf_set! {
    "10minutemail.com",
    "20minutemail.com",
    "33mail.com",
    "dispostable.com",
    "emailondeck.com",
    "fakeinbox.com",
    "getairmail.com",
    "getnada.com",
    "guerrillamail.biz",
    "guerrillamail.com",
    "guerrillamail.de",
    "guerrillamail.net",
    "guerrillamail.org",
    "guerrillamailblock.com",
    "harakirimail.com",
    "incognitomail.org",
    "jetable.org",
    "mailcatch.com",
    "maildrop.cc",
    "mailinator.com",
    "mailinator.net",
    "mailnesia.com",
    "mintemail.com",
    "moakt.com",
    "mohmal.com",
    "mytemp.email",
    "sharklasers.com",
    "spamgourmet.com",
    "temp-mail.org",
    "tempail.com",
    "tempinbox.com",
    "tempmail.net",
    "tempmailo.com",
    "tempr.email",
    "throwawaymail.com",
    "trashmail.com",
    "trashmail.de",
    "yopmail.com",
    "yopmail.fr",
    "yopmail.net",
};

static REGISTRY: OnceLock<DisposableRegistry> = OnceLock::new();

/// Registry used by the pipeline. Built-in list unless [`install`] ran first.
pub fn global() -> &'static DisposableRegistry {
    REGISTRY.get_or_init(DisposableRegistry::builtin)
}

/// Replaces the built-in list for the whole process. Only possible before the
/// first call to [`global`].
pub fn install(registry: DisposableRegistry) -> Result<(), RegistryError> {
    REGISTRY
        .set(registry)
        .map_err(|_| RegistryError::AlreadyInitialised)
}

#[derive(Debug, Clone, Default)]
pub struct DisposableRegistry {
    use_builtin: bool,
    extra: HashSet<String>,
}

impl DisposableRegistry {
    pub fn builtin() -> Self {
        Self {
            use_builtin: true,
            extra: HashSet::new(),
        }
    }

    /// Registry made only of `domains`, without the built-in list.
    pub fn from_domains<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            use_builtin: false,
            extra: collect_domains(domains),
        }
    }

    /// Built-in list plus `domains`.
    pub fn with_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extra.extend(collect_domains(domains));
        self
    }

    /// One domain per line; blank lines and `#` comments are skipped.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, RegistryError> {
        Ok(Self::from_domains(read_list(reader)?))
    }

    /// Current list plus the domains read from `reader`.
    pub fn extend_from_reader<R: BufRead>(self, reader: R) -> Result<Self, RegistryError> {
        Ok(self.with_domains(read_list(reader)?))
    }

    pub fn len(&self) -> usize {
        if !self.use_builtin {
            return self.extra.len();
        }
        let extra = self
            .extra
            .iter()
            .filter(|d| !BUILTIN.contains(d.as_str()))
            .count();
        BUILTIN.len() + extra
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_disposable(&self, domain: &str) -> bool {
        let key = normalize_domain(domain);
        (self.use_builtin && BUILTIN.contains(key.as_str())) || self.extra.contains(&key)
    }

    pub fn check(&self, domain: &str) -> CheckOutcome {
        if self.is_disposable(domain) {
            CheckOutcome::fail(
                Stage::Disposable,
                Severity::Warning,
                "known disposable provider",
            )
        } else {
            CheckOutcome::pass(
                Stage::Disposable,
                Severity::Info,
                "not a known disposable provider",
            )
        }
    }
}

fn read_list<R: BufRead>(reader: R) -> Result<Vec<String>, RegistryError> {
    let mut domains = Vec::new();
    for line in reader.lines() {
        let line = line.map_err(RegistryError::read)?;
        let entry = line.split('#').next().unwrap_or_default().trim();
        if !entry.is_empty() {
            domains.push(entry.to_string());
        }
    }
    Ok(domains)
}

fn collect_domains<I, S>(domains: I) -> HashSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    domains
        .into_iter()
        .map(|d| normalize_domain(d.as_ref()))
        .filter(|d| !d.is_empty())
        .collect()
}

fn normalize_domain(domain: &str) -> String {
    domain.trim().trim_end_matches('.').to_ascii_lowercase()
}
