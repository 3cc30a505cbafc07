use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::io::{self, Read, Write};
use std::rc::Rc;
use std::time::Duration;

use proptest::prelude::*;

use super::{
    Connector, MailboxVerdict, SmtpError, SmtpProbeOptions, TcpConnector, probe_mailbox,
};
use crate::mx::{MailExchanger, SystemResolver};
use crate::report::Severity;
use crate::validator::EmailAddress;

type CommandLog = Rc<RefCell<Vec<(String, String)>>>;

/// Plays a canned server: one greeting, then one reply per command line.
pub(crate) struct ScriptedStream {
    host: String,
    log: CommandLog,
    replies: VecDeque<String>,
    readable: Vec<u8>,
    partial: Vec<u8>,
}

impl Read for ScriptedStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf.len().min(self.readable.len());
        buf[..n].copy_from_slice(&self.readable[..n]);
        self.readable.drain(..n);
        Ok(n)
    }
}

impl Write for ScriptedStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.partial.extend_from_slice(buf);
        while let Some(pos) = self.partial.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.partial.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw).trim_end().to_string();
            self.log.borrow_mut().push((self.host.clone(), line));
            if let Some(reply) = self.replies.pop_front() {
                self.readable.extend_from_slice(reply.as_bytes());
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Hosts without a script refuse the connection.
#[derive(Default)]
pub(crate) struct ScriptedConnector {
    scripts: RefCell<HashMap<String, (String, VecDeque<String>)>>,
    log: CommandLog,
    pub connects: RefCell<Vec<String>>,
}

impl ScriptedConnector {
    pub(crate) fn host(self, host: &str, greeting: &str, replies: &[&str]) -> Self {
        self.scripts.borrow_mut().insert(
            host.to_string(),
            (
                greeting.to_string(),
                replies.iter().map(|r| r.to_string()).collect(),
            ),
        );
        self
    }

    /// Server that accepts everything up to and including RCPT TO.
    pub(crate) fn accepting(host: &str) -> Self {
        Self::default().host(
            host,
            "220 mx ESMTP\r\n",
            &["250 hello\r\n", "250 ok\r\n", "250 ok\r\n", "221 bye\r\n"],
        )
    }

    pub(crate) fn commands(&self) -> Vec<String> {
        self.log.borrow().iter().map(|(_, c)| c.clone()).collect()
    }

    pub(crate) fn commands_for(&self, host: &str) -> Vec<String> {
        self.log
            .borrow()
            .iter()
            .filter(|(h, _)| h == host)
            .map(|(_, c)| c.clone())
            .collect()
    }
}

impl Connector for ScriptedConnector {
    type Stream = ScriptedStream;

    fn connect(
        &self,
        host: &str,
        _port: u16,
        _timeout: Duration,
    ) -> Result<Self::Stream, SmtpError> {
        self.connects.borrow_mut().push(host.to_string());
        match self.scripts.borrow_mut().remove(host) {
            Some((greeting, replies)) => Ok(ScriptedStream {
                host: host.to_string(),
                log: Rc::clone(&self.log),
                replies,
                readable: greeting.into_bytes(),
                partial: Vec::new(),
            }),
            None => Err(SmtpError::connect(
                host,
                io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused"),
            )),
        }
    }
}

fn target() -> EmailAddress {
    EmailAddress::parse("user@example.com").expect("address")
}

fn mx(hosts: &[&str]) -> Vec<MailExchanger> {
    hosts
        .iter()
        .enumerate()
        .map(|(i, h)| MailExchanger::new(*h, (i as u16 + 1) * 10))
        .collect()
}

#[test]
fn accepted_on_first_exchanger() {
    let connector = ScriptedConnector::accepting("mx1.example.com");
    let report = probe_mailbox(
        &connector,
        &mx(&["mx1.example.com", "mx2.example.com"]),
        &target(),
        &SmtpProbeOptions::default(),
    );

    assert_eq!(report.verdict, MailboxVerdict::Exists { code: 250 });
    assert!(report.outcome.passed);
    assert_eq!(report.outcome.severity, Severity::Info);
    assert_eq!(
        report.outcome.message,
        "email address exists and can receive emails"
    );
    assert_eq!(report.exchangers_tried, ["mx1.example.com"]);
    assert_eq!(
        connector.commands(),
        [
            "EHLO localhost",
            "MAIL FROM:<verify@localhost>",
            "RCPT TO:<user@example.com>",
            "QUIT",
        ]
    );
}

#[test]
fn skips_unreachable_exchanger() {
    let connector = ScriptedConnector::accepting("mx2.example.com");
    let report = probe_mailbox(
        &connector,
        &mx(&["mx1.example.com", "mx2.example.com"]),
        &target(),
        &SmtpProbeOptions::default(),
    );
    assert!(report.verdict.is_conclusive());
    assert_eq!(
        report.exchangers_tried,
        ["mx1.example.com", "mx2.example.com"]
    );
    assert!(report.transcript[0].contains("connection refused"));
}

fn rejecting() -> ScriptedConnector {
    ScriptedConnector::default().host(
        "mx1.example.com",
        "220 mx\r\n",
        &[
            "250 hello\r\n",
            "250 ok\r\n",
            "550 5.1.1 user unknown\r\n",
            "221 bye\r\n",
        ],
    )
}

#[test]
fn rejection_is_warning_by_default() {
    let connector = rejecting();
    let report = probe_mailbox(
        &connector,
        &mx(&["mx1.example.com", "mx2.example.com"]),
        &target(),
        &SmtpProbeOptions::default(),
    );
    assert_eq!(report.verdict, MailboxVerdict::Rejected { code: 550 });
    assert!(!report.outcome.passed);
    assert_eq!(report.outcome.severity, Severity::Warning);
    assert_eq!(report.outcome.message, "mailbox rejected by server (550)");
    // definitive answer: second exchanger never contacted
    assert_eq!(*connector.connects.borrow(), ["mx1.example.com"]);
}

#[test]
fn rejection_is_fatal_when_strict() {
    let options = SmtpProbeOptions {
        strict: true,
        ..SmtpProbeOptions::default()
    };
    let report = probe_mailbox(&rejecting(), &mx(&["mx1.example.com"]), &target(), &options);
    assert!(report.outcome.is_blocking());
}

#[test]
fn helo_fallback_after_ehlo_refused() {
    let connector = ScriptedConnector::default().host(
        "mx1.example.com",
        "220 old smtpd\r\n",
        &[
            "502 command not implemented\r\n",
            "250 hello\r\n",
            "250 ok\r\n",
            "251 will forward\r\n",
            "221 bye\r\n",
        ],
    );
    let report = probe_mailbox(
        &connector,
        &mx(&["mx1.example.com"]),
        &target(),
        &SmtpProbeOptions::default(),
    );
    assert_eq!(report.verdict, MailboxVerdict::Exists { code: 251 });
    let commands = connector.commands();
    assert_eq!(commands[0], "EHLO localhost");
    assert_eq!(commands[1], "HELO localhost");
}

#[test]
fn temporary_failure_tries_next_exchanger() {
    let greylisting = ["250 hello\r\n", "250 ok\r\n", "451 4.7.1 greylisted\r\n", "221 bye\r\n"];
    let connector = ScriptedConnector::default()
        .host("mx1.example.com", "220 a\r\n", &greylisting)
        .host("mx2.example.com", "220 b\r\n", &greylisting);
    let report = probe_mailbox(
        &connector,
        &mx(&["mx1.example.com", "mx2.example.com"]),
        &target(),
        &SmtpProbeOptions::default(),
    );
    assert!(!report.verdict.is_conclusive());
    assert_eq!(report.outcome.severity, Severity::Warning);
    assert!(
        report
            .outcome
            .message
            .starts_with("could not verify mailbox (")
    );
    assert!(report.outcome.message.contains("temporary failure (451)"));
    for host in ["mx1.example.com", "mx2.example.com"] {
        assert_eq!(connector.commands_for(host).last().map(String::as_str), Some("QUIT"));
    }
}

#[test]
fn disconnect_mid_dialogue_is_inconclusive() {
    let connector = ScriptedConnector::default().host(
        "mx1.example.com",
        "220 mx\r\n",
        &["250 hello\r\n"],
    );
    let report = probe_mailbox(
        &connector,
        &mx(&["mx1.example.com"]),
        &target(),
        &SmtpProbeOptions::default(),
    );
    assert!(matches!(report.verdict, MailboxVerdict::Unverified(_)));
    assert_eq!(report.outcome.severity, Severity::Warning);
    assert_eq!(
        connector.commands(),
        ["EHLO localhost", "MAIL FROM:<verify@localhost>", "QUIT"]
    );
}

#[test]
fn refused_greeting_moves_on() {
    let connector = ScriptedConnector::default()
        .host("mx1.example.com", "554 no service\r\n", &["221 bye\r\n"])
        .host(
            "mx2.example.com",
            "220 mx\r\n",
            &["250 hi\r\n", "250 ok\r\n", "250 ok\r\n", "221 bye\r\n"],
        );
    let report = probe_mailbox(
        &connector,
        &mx(&["mx1.example.com", "mx2.example.com"]),
        &target(),
        &SmtpProbeOptions::default(),
    );
    assert_eq!(report.verdict, MailboxVerdict::Exists { code: 250 });
    assert_eq!(connector.commands_for("mx1.example.com"), ["QUIT"]);
}

#[test]
fn all_unreachable_is_warning() {
    let connector = ScriptedConnector::default();
    let report = probe_mailbox(
        &connector,
        &mx(&["mx1.example.com", "mx2.example.com"]),
        &target(),
        &SmtpProbeOptions::default(),
    );
    assert!(!report.outcome.passed);
    assert_eq!(report.outcome.severity, Severity::Warning);
    assert!(report.outcome.message.starts_with("could not verify mailbox"));
    assert!(connector.commands().is_empty());
}

#[test]
fn honours_max_exchangers() {
    let connector = ScriptedConnector::default();
    let options = SmtpProbeOptions {
        max_exchangers: 2,
        ..SmtpProbeOptions::default()
    };
    let report = probe_mailbox(
        &connector,
        &mx(&["a.example.com", "b.example.com", "c.example.com"]),
        &target(),
        &options,
    );
    assert_eq!(report.exchangers_tried.len(), 2);
}

#[test]
fn no_exchangers_is_unverified() {
    let report = probe_mailbox(
        &ScriptedConnector::default(),
        &[],
        &target(),
        &SmtpProbeOptions::default(),
    );
    assert_eq!(
        report.verdict,
        MailboxVerdict::Unverified("no mail exchanger to probe".to_string())
    );
}

#[test]
fn endless_greeting_is_unverified() {
    let greeting = "220-still talking\r\n".repeat(150);
    let connector = ScriptedConnector::default().host("mx1.example.com", &greeting, &[]);
    let report = probe_mailbox(
        &connector,
        &mx(&["mx1.example.com"]),
        &target(),
        &SmtpProbeOptions::default(),
    );
    match &report.verdict {
        MailboxVerdict::Unverified(reason) => {
            assert!(reason.contains("reply exceeds 100 lines"), "{reason}")
        }
        other => panic!("expected unverified, got {other:?}"),
    }
    assert_eq!(report.outcome.severity, Severity::Warning);
    assert_eq!(connector.commands(), ["QUIT"]);
}

fn reply_line() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(200u16),
        Just(220),
        Just(250),
        Just(251),
        Just(252),
        Just(354),
        Just(421),
        Just(450),
        Just(451),
        Just(500),
        Just(502),
        Just(550),
        Just(551),
        Just(553),
        Just(554),
    ]
    .prop_map(|code| format!("{code} scripted\r\n"))
}

proptest! {
    #[test]
    fn never_sends_data(greeting in reply_line(), replies in prop::collection::vec(reply_line(), 0..8)) {
        let replies: Vec<&str> = replies.iter().map(String::as_str).collect();
        let connector = ScriptedConnector::default().host("mx1.example.com", &greeting, &replies);
        let report = probe_mailbox(
            &connector,
            &mx(&["mx1.example.com"]),
            &target(),
            &SmtpProbeOptions::default(),
        );
        let commands = connector.commands();
        prop_assert!(commands.iter().all(|c| !c.starts_with("DATA")));
        prop_assert_eq!(commands.last().map(String::as_str), Some("QUIT"));
        prop_assert_ne!(report.outcome.severity, Severity::Fatal);
    }
}

#[test]
#[ignore = "requires loopback TCP binding"]
fn probes_over_tcp() {
    use std::io::{BufRead, BufReader};
    use std::net::TcpListener;
    use std::thread;

    let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock server");
    let port = listener.local_addr().expect("addr").port();
    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept");
        let mut reader = BufReader::new(stream.try_clone().expect("clone"));
        stream.write_all(b"220 mock.smtp.test ESMTP\r\n").expect("greet");
        let script = [
            ("EHLO", "250-mock.smtp.test\r\n250 PIPELINING\r\n"),
            ("MAIL FROM:", "250 2.1.0 Ok\r\n"),
            ("RCPT TO:", "250 2.1.5 Ok\r\n"),
            ("QUIT", "221 2.0.0 Bye\r\n"),
        ];
        for (expected, response) in script {
            let mut line = String::new();
            reader.read_line(&mut line).expect("command");
            assert!(line.starts_with(expected), "expected '{expected}', got '{line}'");
            stream.write_all(response.as_bytes()).expect("reply");
        }
    });

    let options = SmtpProbeOptions {
        port,
        ..SmtpProbeOptions::default()
    };
    let resolver = SystemResolver::new(Duration::from_secs(1)).expect("resolver");
    let connector = TcpConnector::new(resolver);
    let report = probe_mailbox(&connector, &mx(&["127.0.0.1"]), &target(), &options);
    assert_eq!(report.verdict, MailboxVerdict::Exists { code: 250 });
    handle.join().expect("server thread");
}
