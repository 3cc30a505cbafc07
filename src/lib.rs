#![forbid(unsafe_code)]
//! mailvalid_lib: layered e-mail validation (format, disposable providers, DNS, SMTP).

pub mod config;
pub mod disposable;
pub mod mx;
pub mod pipeline;
pub mod report;
pub mod smtp_verify;
pub mod validator;

pub use config::{ConfigError, ValidationConfig};
pub use disposable::{DisposableRegistry, RegistryError};
pub use mx::{DnsError, MailExchanger, MailHostLookup, SystemResolver, check_dns};
pub use pipeline::{PipelineError, ValidationPipeline, validate_email};
pub use report::{CheckOutcome, Severity, Stage, ValidationReport};
pub use smtp_verify::{
    Connector, MailboxVerdict, SmtpError, SmtpProbeOptions, TcpConnector, probe_mailbox,
};
pub use validator::{EmailAddress, FormatCheck, StructureError, check_format};
