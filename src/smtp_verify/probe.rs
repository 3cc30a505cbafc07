use crate::mx::MailExchanger;
use crate::report::{CheckOutcome, Severity, Stage};
use crate::smtp_verify::error::SmtpError;
use crate::smtp_verify::options::SmtpProbeOptions;
use crate::smtp_verify::session::{Connector, SmtpCommand, SmtpReply, SmtpSession};
use crate::smtp_verify::types::{MailboxVerdict, SmtpProbeReport};
use crate::validator::EmailAddress;

const EXISTS: &str = "email address exists and can receive emails";
const REJECTED: &str = "mailbox rejected by server";
const UNVERIFIED: &str = "could not verify mailbox";

/// Asks the exchangers, in order, whether they would accept mail for
/// `address`. Stops at the first definitive answer. Never sends `DATA`.
pub fn probe_mailbox<C: Connector>(
    connector: &C,
    exchangers: &[MailExchanger],
    address: &EmailAddress,
    options: &SmtpProbeOptions,
) -> SmtpProbeReport {
    let mut exchangers_tried = Vec::new();
    let mut transcript = Vec::new();
    let mut verdict = MailboxVerdict::Unverified("no mail exchanger to probe".to_string());

    for exchanger in exchangers.iter().take(options.max_exchangers.max(1)) {
        exchangers_tried.push(exchanger.host.clone());
        let stream = match connector.connect(&exchanger.host, options.port, options.timeout) {
            Ok(stream) => stream,
            Err(err) => {
                tracing::debug!(host = %exchanger.host, error = %err, "SMTP connect failed");
                transcript.push(format!("[{}] ! {err}", exchanger.host));
                verdict = MailboxVerdict::Unverified(format!("{}: {err}", exchanger.host));
                continue;
            }
        };

        let mut session =
            SmtpSession::new(exchanger.host.clone(), stream).with_reply_timeout(options.timeout);
        let host_verdict = converse(&mut session, address, options).unwrap_or_else(|err| {
            MailboxVerdict::Unverified(format!("{}: {err}", exchanger.host))
        });
        session.quit();
        transcript.extend(session.into_transcript());

        tracing::debug!(host = %exchanger.host, verdict = %host_verdict, "SMTP probe step");
        verdict = host_verdict;
        if verdict.is_conclusive() {
            break;
        }
    }

    SmtpProbeReport {
        outcome: outcome_for(&verdict, options.strict),
        verdict,
        exchangers_tried,
        transcript,
    }
}

/// Greeting, EHLO (HELO fallback), MAIL FROM, RCPT TO. The caller sends QUIT.
fn converse<S>(
    session: &mut SmtpSession<S>,
    address: &EmailAddress,
    options: &SmtpProbeOptions,
) -> Result<MailboxVerdict, SmtpError>
where
    S: std::io::Read + std::io::Write,
{
    let greeting = session.read_greeting()?;
    if !greeting.is_positive_completion() {
        return Ok(unverified("greeting", &greeting));
    }

    let mut hello = session.send(SmtpCommand::Ehlo(&options.helo_domain))?;
    if hello.is_permanent_failure() {
        hello = session.send(SmtpCommand::Helo(&options.helo_domain))?;
    }
    if !hello.is_positive_completion() {
        return Ok(unverified("HELO/EHLO", &hello));
    }

    let sender = session.send(SmtpCommand::MailFrom(&options.mail_from))?;
    if !sender.is_positive_completion() {
        return Ok(unverified("MAIL FROM", &sender));
    }

    let rcpt = session.send(SmtpCommand::RcptTo(address.as_str()))?;
    Ok(classify_recipient(&rcpt))
}

fn classify_recipient(reply: &SmtpReply) -> MailboxVerdict {
    match reply.code {
        250 | 251 => MailboxVerdict::Exists { code: reply.code },
        550 | 551 | 553 => MailboxVerdict::Rejected { code: reply.code },
        _ => unverified("RCPT TO", reply),
    }
}

fn unverified(step: &str, reply: &SmtpReply) -> MailboxVerdict {
    let kind = if reply.is_transient_failure() {
        "temporary failure"
    } else if reply.is_permanent_failure() {
        "refused"
    } else {
        "inconclusive reply"
    };
    MailboxVerdict::Unverified(format!("{step} {kind} ({})", reply.code))
}

pub(crate) fn outcome_for(verdict: &MailboxVerdict, strict: bool) -> CheckOutcome {
    match verdict {
        MailboxVerdict::Exists { .. } => CheckOutcome::pass(Stage::Smtp, Severity::Info, EXISTS),
        MailboxVerdict::Rejected { code } => {
            let severity = if strict {
                Severity::Fatal
            } else {
                Severity::Warning
            };
            CheckOutcome::fail(Stage::Smtp, severity, format!("{REJECTED} ({code})"))
        }
        MailboxVerdict::Unverified(reason) => CheckOutcome::fail(
            Stage::Smtp,
            Severity::Warning,
            format!("{UNVERIFIED} ({reason})"),
        ),
    }
}
