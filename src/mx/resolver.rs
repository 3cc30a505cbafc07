use std::collections::HashSet;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use trust_dns_resolver::{
    Resolver,
    config::{ResolverConfig, ResolverOpts},
    error::{ResolveError, ResolveErrorKind},
    system_conf::read_system_conf,
};

use super::{DnsError, MailExchanger, Resolution};

/// DNS queries the mail-routing check needs. Implemented by
/// [`SystemResolver`]; tests substitute stubs.
pub trait MailHostLookup {
    /// MX records for `domain`, in resolver order. An empty list means the
    /// domain has no MX records.
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MailExchanger>, DnsError>;

    /// Whether `domain` itself has at least one A or AAAA record.
    fn has_address_records(&self, domain: &str) -> Result<bool, DnsError>;
}

impl<T: MailHostLookup + ?Sized> MailHostLookup for &T {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MailExchanger>, DnsError> {
        (**self).lookup_mx(domain)
    }

    fn has_address_records(&self, domain: &str) -> Result<bool, DnsError> {
        (**self).has_address_records(domain)
    }
}

/// Blocking resolver built from the system configuration, with a single
/// attempt bounded by `timeout`. Clones share the same resolver.
#[derive(Clone)]
pub struct SystemResolver {
    inner: Arc<Resolver>,
}

impl SystemResolver {
    pub fn new(timeout: Duration) -> Result<Self, DnsError> {
        let (config, mut opts) = match read_system_conf() {
            Ok(pair) => pair,
            Err(err) => {
                tracing::warn!(error = %err, "system resolver configuration unavailable, using defaults");
                (ResolverConfig::default(), ResolverOpts::default())
            }
        };
        opts.timeout = timeout;
        opts.attempts = 1;
        let inner = Resolver::new(config, opts).map_err(DnsError::resolver_init)?;
        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// A/AAAA addresses of `host`, empty when it has none.
    pub fn lookup_addresses(&self, host: &str) -> Result<Vec<IpAddr>, DnsError> {
        match self.inner.lookup_ip(host) {
            Ok(lookup) => Ok(lookup.iter().collect()),
            Err(err) if is_no_records(&err) => Ok(Vec::new()),
            Err(err) => Err(DnsError::lookup("A/AAAA", host, err)),
        }
    }
}

impl MailHostLookup for SystemResolver {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MailExchanger>, DnsError> {
        let lookup = match self.inner.mx_lookup(domain) {
            Ok(lookup) => lookup,
            Err(err) if is_no_records(&err) => return Ok(Vec::new()),
            Err(err) => return Err(DnsError::lookup("MX", domain, err)),
        };
        let mut records = Vec::new();
        for mx in lookup.iter() {
            let host = normalize_exchange(&mx.exchange().to_utf8());
            records.push(MailExchanger::new(host, mx.preference()));
        }
        Ok(records)
    }

    fn has_address_records(&self, domain: &str) -> Result<bool, DnsError> {
        Ok(!self.lookup_addresses(domain)?.is_empty())
    }
}

fn is_no_records(err: &ResolveError) -> bool {
    matches!(err.kind(), ResolveErrorKind::NoRecordsFound { .. })
}

/// MX first, A/AAAA fallback. Equal priorities keep the resolver's order.
pub(crate) fn resolve_with<L>(lookup: &L, ascii_domain: &str) -> Result<Resolution, DnsError>
where
    L: MailHostLookup + ?Sized,
{
    let mut records = lookup.lookup_mx(ascii_domain)?;

    if !records.is_empty() {
        if records.iter().all(|r| r.host.is_empty()) {
            return Ok(Resolution::NullMx);
        }
        records.retain(|r| !r.host.is_empty());
        records.sort_by_key(|r| r.priority);
        let mut seen = HashSet::new();
        records.retain(|r| seen.insert(r.host.clone()));
        return Ok(Resolution::Mx(records));
    }

    if lookup.has_address_records(ascii_domain)? {
        Ok(Resolution::Implicit(MailExchanger::new(ascii_domain, 0)))
    } else {
        Ok(Resolution::NoRecords)
    }
}

pub(crate) fn normalize_domain(domain: &str) -> Result<String, DnsError> {
    let trimmed = domain.trim().trim_end_matches('.');
    if trimmed.is_empty() {
        return Err(DnsError::EmptyDomain);
    }
    idna::domain_to_ascii(trimmed).map_err(DnsError::idna)
}

/// `.` (null MX) becomes the empty string.
pub(crate) fn normalize_exchange(exchange: &str) -> String {
    let trimmed = exchange.trim_end_matches('.');
    trimmed.to_ascii_lowercase()
}
