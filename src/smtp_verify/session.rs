use std::fmt;
use std::io::{self, Read, Write};
use std::net::{IpAddr, SocketAddr, TcpStream};
use std::time::{Duration, Instant};

use crate::mx::SystemResolver;
use crate::smtp_verify::error::SmtpError;

/// Longest reply line accepted before the server is considered broken.
const MAX_LINE_LENGTH: usize = 4096;
/// Continuation lines accepted in a single reply.
const MAX_REPLY_LINES: usize = 100;

/// Opens the byte stream a session talks over.
pub trait Connector {
    type Stream: Read + Write;

    fn connect(&self, host: &str, port: u16, timeout: Duration)
    -> Result<Self::Stream, SmtpError>;
}

impl<C: Connector + ?Sized> Connector for &C {
    type Stream = C::Stream;

    fn connect(
        &self,
        host: &str,
        port: u16,
        timeout: Duration,
    ) -> Result<Self::Stream, SmtpError> {
        (**self).connect(host, port, timeout)
    }
}

/// Plain TCP. Exchanger names go through the DNS resolver, so the lookup is
/// bounded by the DNS timeout; every address then shares one connect deadline.
#[derive(Clone)]
pub struct TcpConnector {
    resolver: SystemResolver,
}

impl TcpConnector {
    pub fn new(resolver: SystemResolver) -> Self {
        Self { resolver }
    }

    fn addresses(&self, host: &str, port: u16) -> Result<Vec<SocketAddr>, SmtpError> {
        if let Ok(ip) = host.parse::<IpAddr>() {
            return Ok(vec![SocketAddr::new(ip, port)]);
        }
        let ips = self
            .resolver
            .lookup_addresses(host)
            .map_err(|err| SmtpError::resolve(host, err))?;
        Ok(ips.into_iter().map(|ip| SocketAddr::new(ip, port)).collect())
    }
}

impl Connector for TcpConnector {
    type Stream = TcpStream;

    fn connect(
        &self,
        host: &str,
        port: u16,
        timeout: Duration,
    ) -> Result<Self::Stream, SmtpError> {
        let addrs = self.addresses(host, port)?;
        let stream = connect_within(&addrs, timeout).map_err(|err| SmtpError::connect(host, err))?;
        stream
            .set_read_timeout(Some(timeout))
            .map_err(SmtpError::io)?;
        stream
            .set_write_timeout(Some(timeout))
            .map_err(SmtpError::io)?;
        Ok(stream)
    }
}

/// Tries `addrs` in order until one connects or `timeout` has elapsed overall.
pub(crate) fn connect_within(addrs: &[SocketAddr], timeout: Duration) -> io::Result<TcpStream> {
    let deadline = Instant::now() + timeout;
    let mut last_err = None;
    for addr in addrs {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            last_err = Some(io::Error::new(
                io::ErrorKind::TimedOut,
                "connect deadline exceeded",
            ));
            break;
        }
        match TcpStream::connect_timeout(addr, remaining) {
            Ok(stream) => return Ok(stream),
            Err(err) => last_err = Some(err),
        }
    }
    Err(last_err.unwrap_or_else(|| {
        io::Error::new(io::ErrorKind::AddrNotAvailable, "no socket address resolved")
    }))
}

/// Commands the probe may issue; `DATA` is not one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SmtpCommand<'a> {
    Ehlo(&'a str),
    Helo(&'a str),
    MailFrom(&'a str),
    RcptTo(&'a str),
    Quit,
}

impl fmt::Display for SmtpCommand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ehlo(name) => write!(f, "EHLO {name}"),
            Self::Helo(name) => write!(f, "HELO {name}"),
            Self::MailFrom(sender) => write!(f, "MAIL FROM:<{sender}>"),
            Self::RcptTo(rcpt) => write!(f, "RCPT TO:<{rcpt}>"),
            Self::Quit => f.write_str("QUIT"),
        }
    }
}

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpReply {
    pub code: u16,
    pub lines: Vec<String>,
}

impl SmtpReply {
    pub fn is_positive_completion(&self) -> bool {
        (200..300).contains(&self.code)
    }

    pub fn is_transient_failure(&self) -> bool {
        (400..500).contains(&self.code)
    }

    pub fn is_permanent_failure(&self) -> bool {
        (500..600).contains(&self.code)
    }
}

/// One SMTP conversation with one exchanger.
pub(crate) struct SmtpSession<S> {
    host: String,
    stream: S,
    buffer: Vec<u8>,
    transcript: Vec<String>,
    reply_timeout: Option<Duration>,
    deadline: Option<Instant>,
}

impl<S: Read + Write> SmtpSession<S> {
    pub(crate) fn new(host: impl Into<String>, stream: S) -> Self {
        Self {
            host: host.into(),
            stream,
            buffer: Vec::new(),
            transcript: Vec::new(),
            reply_timeout: None,
            deadline: None,
        }
    }

    /// Upper bound for a whole reply, however the server paces its bytes.
    pub(crate) fn with_reply_timeout(mut self, timeout: Duration) -> Self {
        self.reply_timeout = Some(timeout);
        self
    }

    pub(crate) fn read_greeting(&mut self) -> Result<SmtpReply, SmtpError> {
        let reply = self.read_reply()?;
        self.record_reply(&reply);
        Ok(reply)
    }

    pub(crate) fn send(&mut self, command: SmtpCommand<'_>) -> Result<SmtpReply, SmtpError> {
        let line = command.to_string();
        self.record("C", &line);
        self.write_line(&line)?;
        let reply = self.read_reply()?;
        self.record_reply(&reply);
        Ok(reply)
    }

    /// Best effort: the server may already be gone.
    pub(crate) fn quit(&mut self) {
        if let Err(err) = self.send(SmtpCommand::Quit) {
            self.record("!", &err.to_string());
        }
    }

    pub(crate) fn into_transcript(self) -> Vec<String> {
        self.transcript
    }

    fn record(&mut self, direction: &str, message: &str) {
        self.transcript
            .push(format!("[{}] {direction}: {message}", self.host));
    }

    fn record_reply(&mut self, reply: &SmtpReply) {
        if reply.lines.is_empty() {
            self.record("S", &reply.code.to_string());
        } else {
            for line in &reply.lines {
                self.record("S", &format!("{} {}", reply.code, line));
            }
        }
    }

    fn write_line(&mut self, line: &str) -> Result<(), SmtpError> {
        let mut data = line.as_bytes().to_vec();
        data.extend_from_slice(b"\r\n");
        self.stream.write_all(&data).map_err(SmtpError::io)?;
        self.stream.flush().map_err(SmtpError::io)
    }

    pub(crate) fn read_reply(&mut self) -> Result<SmtpReply, SmtpError> {
        self.deadline = self.reply_timeout.map(|timeout| Instant::now() + timeout);
        let mut lines = Vec::new();
        let mut code: Option<u16> = None;
        loop {
            if lines.len() >= MAX_REPLY_LINES {
                return Err(SmtpError::protocol(format!(
                    "reply exceeds {MAX_REPLY_LINES} lines"
                )));
            }
            let line = self.read_line()?;
            if line.len() < 3 {
                return Err(SmtpError::protocol(format!("invalid reply: {line}")));
            }
            let parsed_code = line
                .get(..3)
                .and_then(|c| c.parse::<u16>().ok())
                .ok_or_else(|| SmtpError::protocol(format!("invalid code in line: {line}")))?;
            if let Some(existing) = code {
                if existing != parsed_code {
                    return Err(SmtpError::protocol(format!(
                        "inconsistent reply codes: {existing} vs {parsed_code}"
                    )));
                }
            } else {
                code = Some(parsed_code);
            }
            let is_last = line.as_bytes().get(3) != Some(&b'-');
            lines.push(line.get(4..).unwrap_or_default().to_string());
            if is_last {
                break;
            }
        }
        let code = code.ok_or_else(|| SmtpError::protocol("reply missing status code"))?;
        Ok(SmtpReply { code, lines })
    }

    fn read_line(&mut self) -> Result<String, SmtpError> {
        loop {
            if let Some(pos) = self.buffer.iter().position(|byte| *byte == b'\n') {
                let mut line = self.buffer.drain(..=pos).collect::<Vec<_>>();
                if line.ends_with(b"\r\n") {
                    line.truncate(line.len() - 2);
                } else {
                    line.truncate(line.len() - 1);
                }
                return Ok(String::from_utf8_lossy(&line).into_owned());
            }
            if self.buffer.len() > MAX_LINE_LENGTH {
                return Err(SmtpError::protocol("reply line too long"));
            }
            if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                return Err(SmtpError::io(io::Error::new(
                    io::ErrorKind::TimedOut,
                    "reply deadline exceeded",
                )));
            }

            let mut buf = [0u8; 512];
            let read = self.stream.read(&mut buf).map_err(SmtpError::io)?;
            if read == 0 {
                return Err(SmtpError::io(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "connection closed",
                )));
            }
            self.buffer.extend_from_slice(&buf[..read]);
        }
    }
}
