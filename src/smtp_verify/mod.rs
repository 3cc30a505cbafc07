//! Mailbox probing over SMTP.
//!
//! The public entry point is [`probe_mailbox`], which walks the exchangers
//! found by the DNS stage and runs greeting, EHLO, MAIL FROM and RCPT TO
//! against each until one of them answers definitively. The dialogue always
//! ends with QUIT; no message is ever transmitted.

mod error;
mod options;
mod probe;
mod session;
mod types;

pub use error::SmtpError;
pub use options::SmtpProbeOptions;
pub use probe::probe_mailbox;
pub use session::{Connector, SmtpReply, TcpConnector};
pub use types::{MailboxVerdict, SmtpProbeReport};

#[cfg(test)]
pub(crate) mod tests;
