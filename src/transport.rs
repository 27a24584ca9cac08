//! AT command transport.
//!
//! [`AtTransport`] owns the serial port for the lifetime of the driver. Every
//! exchange is a single [`AtTransport::transact`]: write one command line,
//! then accumulate input until one of the command's [`Terminator`]s matches
//! on a line boundary or the command's timeout elapses.

use atat::AtatCmd;
use embassy_time::{block_for, Duration, Instant};
use embedded_io::{Read, ReadReady, Write};
use heapless::{String, Vec};

use crate::error::{Error, ModemError};
use crate::fmt::Bytes;

/// Longest command line, without the line terminator.
pub const MAX_COMMAND_LEN: usize = 256;

/// Largest number of terminators a single command can wait for.
pub const MAX_TERMINATORS: usize = 6;

/// Default size of the response buffer.
pub const DEFAULT_RESPONSE_LEN: usize = 1024;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

const LINE_TERMINATOR: &[u8] = b"\r\n";
const POLL_INTERVAL: Duration = Duration::from_millis(1);
const READ_CHUNK: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TerminatorClass {
    Success,
    Error,
}

/// How a terminator token is located in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Matching {
    /// A complete line equal to the token
    Line,
    /// A complete line starting with the token, e.g. `+CME ERROR: 10`
    Prefix,
    /// The unterminated tail of the input equal to the token, e.g. the `>`
    /// data prompt
    Prompt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Terminator {
    pub token: &'static str,
    pub class: TerminatorClass,
    pub matching: Matching,
}

impl Terminator {
    pub const OK: Self = Self::line("OK", TerminatorClass::Success);
    pub const ERROR: Self = Self::line("ERROR", TerminatorClass::Error);
    pub const CME_ERROR: Self = Self::prefix("+CME ERROR:", TerminatorClass::Error);
    pub const CMS_ERROR: Self = Self::prefix("+CMS ERROR:", TerminatorClass::Error);
    pub const PROMPT: Self = Self::prompt(">");

    pub const fn line(token: &'static str, class: TerminatorClass) -> Self {
        Self {
            token,
            class,
            matching: Matching::Line,
        }
    }

    pub const fn prefix(token: &'static str, class: TerminatorClass) -> Self {
        Self {
            token,
            class,
            matching: Matching::Prefix,
        }
    }

    pub const fn prompt(token: &'static str) -> Self {
        Self {
            token,
            class: TerminatorClass::Success,
            matching: Matching::Prompt,
        }
    }

    fn matches_line(&self, line: &[u8]) -> bool {
        let line = trim_ascii(line);
        match self.matching {
            Matching::Line => line == self.token.as_bytes(),
            Matching::Prefix => line.starts_with(self.token.as_bytes()),
            Matching::Prompt => false,
        }
    }

    fn matches_tail(&self, tail: &[u8]) -> bool {
        self.matching == Matching::Prompt && trim_ascii(tail) == self.token.as_bytes()
    }
}

/// Non-empty set of terminators a command waits for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Terminators(Vec<Terminator, MAX_TERMINATORS>);

impl Terminators {
    pub fn new(terminators: &[Terminator]) -> Result<Self, Error> {
        if terminators.is_empty() {
            return Err(Error::EmptyTerminatorSet);
        }
        Vec::from_slice(terminators)
            .map(Self)
            .map_err(|_| Error::TooManyTerminators)
    }

    fn from_fixed<const L: usize>(terminators: [Terminator; L]) -> Self {
        let mut set = Vec::new();
        for t in terminators {
            set.push(t).ok();
        }
        Self(set)
    }

    /// `OK` only
    pub fn ok() -> Self {
        Self::from_fixed([Terminator::OK])
    }

    /// `OK`, `ERROR` and the numeric error result codes
    pub fn ok_or_error() -> Self {
        Self::from_fixed([
            Terminator::OK,
            Terminator::ERROR,
            Terminator::CME_ERROR,
            Terminator::CMS_ERROR,
        ])
    }

    /// The `>` data prompt, or an error
    pub fn prompt() -> Self {
        Self::from_fixed([Terminator::PROMPT, Terminator::ERROR, Terminator::CME_ERROR])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Terminator> {
        self.0.iter()
    }

    fn find_line(&self, line: &[u8]) -> Option<Terminator> {
        self.0.iter().find(|t| t.matches_line(line)).copied()
    }

    fn find_tail(&self, tail: &[u8]) -> Option<Terminator> {
        self.0.iter().find(|t| t.matches_tail(tail)).copied()
    }
}

impl Default for Terminators {
    fn default() -> Self {
        Self::ok_or_error()
    }
}

/// An outbound AT command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    text: String<MAX_COMMAND_LEN>,
    timeout: Duration,
    terminators: Terminators,
}

impl Command {
    /// A command waiting up to [`DEFAULT_TIMEOUT`] for `OK` or an error.
    pub fn new(text: &str) -> Result<Self, Error> {
        if !text.is_ascii() {
            return Err(Error::InvalidCommand);
        }
        let text = String::try_from(text).map_err(|_| Error::CommandTooLong)?;
        Ok(Self {
            text,
            timeout: DEFAULT_TIMEOUT,
            terminators: Terminators::default(),
        })
    }

    /// Build a command line from a typed `atat` command, including its
    /// maximum response time.
    pub fn from_atat<C: AtatCmd>(cmd: &C) -> Result<Self, Error> {
        let mut buf = [0u8; MAX_COMMAND_LEN + 2];
        if C::MAX_LEN > buf.len() {
            return Err(Error::CommandTooLong);
        }
        let len = cmd.write(&mut buf);
        let text = core::str::from_utf8(&buf[..len]).map_err(|_| Error::InvalidCommand)?;
        Ok(Self::new(text.trim_end_matches(|c| c == '\r' || c == '\n'))?
            .with_timeout(Duration::from_millis(C::MAX_TIMEOUT_MS as u64)))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_terminators(mut self, terminators: Terminators) -> Self {
        self.terminators = terminators;
        self
    }

    pub fn as_str(&self) -> &str {
        self.text.as_str()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn terminators(&self) -> &Terminators {
        &self.terminators
    }

    /// Bytes written to the serial port for this command.
    pub fn encode(&self) -> Vec<u8, { MAX_COMMAND_LEN + 2 }> {
        let mut bytes = Vec::new();
        // Capacity covers the longest command plus terminator
        bytes.extend_from_slice(self.text.as_bytes()).ok();
        bytes.extend_from_slice(LINE_TERMINATOR).ok();
        bytes
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResponseTag {
    /// A success terminator matched
    Success,
    /// An error terminator matched
    Failed,
    /// No terminator matched before the timeout
    TimedOut,
    /// The received bytes are not valid text
    DecodeError,
    /// Every attempt of a retried transaction failed
    Exhausted,
}

/// Bytes received for one command, tagged with how the exchange ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response<const N: usize = DEFAULT_RESPONSE_LEN> {
    tag: ResponseTag,
    raw: Vec<u8, N>,
    terminator: Option<Terminator>,
    /// End of the echoed command line, 0 without echo
    echo_end: usize,
    /// Start of the terminator line, `raw.len()` when none matched
    body_end: usize,
    attempts: u8,
}

impl<const N: usize> Response<N> {
    /// Build a response from already received bytes, locating the echo of
    /// `command` and the terminator line.
    pub fn from_parts(
        command: &Command,
        raw: &[u8],
        terminator: Option<Terminator>,
    ) -> Result<Self, Error> {
        let raw: Vec<u8, N> = Vec::from_slice(raw).map_err(|_| Error::ResponseOverflow)?;
        let mut scanner = Scanner::default();
        let located = terminator.and_then(|_| scanner.scan(&raw, command.terminators()));
        let body_end = located.map(|(_, start)| start).unwrap_or(raw.len());
        let tag = if core::str::from_utf8(&raw).is_err() {
            ResponseTag::DecodeError
        } else {
            match terminator {
                Some(t) if t.class == TerminatorClass::Success => ResponseTag::Success,
                Some(_) => ResponseTag::Failed,
                None => ResponseTag::TimedOut,
            }
        };
        let echo_end = echo_end(&raw, command.as_str()).min(body_end);

        Ok(Self {
            tag,
            raw,
            terminator,
            echo_end,
            body_end,
            attempts: 1,
        })
    }

    pub fn tag(&self) -> ResponseTag {
        self.tag
    }

    pub fn is_success(&self) -> bool {
        self.tag == ResponseTag::Success
    }

    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// The terminator that ended the exchange, if any.
    pub fn terminator(&self) -> Option<Terminator> {
        self.terminator
    }

    /// Number of transactions that led to this response.
    pub fn attempts(&self) -> u8 {
        self.attempts
    }

    /// The whole response as text.
    pub fn text(&self) -> Result<&str, Error> {
        core::str::from_utf8(&self.raw).map_err(|_| Error::TransportDecode)
    }

    /// The command line echoed back by the modem, when echo is enabled.
    pub fn echo(&self) -> Option<&str> {
        if self.echo_end == 0 {
            return None;
        }
        core::str::from_utf8(trim_ascii(&self.raw[..self.echo_end])).ok()
    }

    /// Payload between the echo and the final result line, trimmed.
    pub fn body(&self) -> Result<&str, Error> {
        let body = trim_ascii(&self.raw[self.echo_end..self.body_end]);
        core::str::from_utf8(body).map_err(|_| Error::TransportDecode)
    }

    /// Received bytes between the echo and the terminator line, untrimmed.
    pub fn payload(&self) -> &[u8] {
        &self.raw[self.echo_end..self.body_end]
    }

    /// The line that matched the terminator, e.g. a `+HTTPACTION:` result.
    pub fn terminator_line(&self) -> Option<&str> {
        self.terminator?;
        let tail = &self.raw[self.body_end..];
        let end = tail.iter().position(|&b| b == b'\n').unwrap_or(tail.len());
        core::str::from_utf8(trim_ascii(&tail[..end])).ok()
    }

    /// Error result code carried by a failed response.
    pub fn modem_error(&self) -> Option<ModemError> {
        if self.terminator?.class != TerminatorClass::Error {
            return None;
        }
        let tail = core::str::from_utf8(&self.raw[self.body_end..]).ok()?;
        tail.lines().find_map(|line| line.parse().ok())
    }

    /// Map every tag other than [`ResponseTag::Success`] to an error.
    pub fn into_result(self) -> Result<Self, Error> {
        match self.tag {
            ResponseTag::Success => Ok(self),
            ResponseTag::Failed => Err(Error::CommandFailed(
                self.modem_error().unwrap_or(ModemError::Generic),
            )),
            ResponseTag::TimedOut => Err(Error::TransportTimeout),
            ResponseTag::DecodeError => Err(Error::TransportDecode),
            ResponseTag::Exhausted => Err(Error::RetryExhausted),
        }
    }

    pub(crate) fn exhausted(mut self, attempts: u8) -> Self {
        self.tag = ResponseTag::Exhausted;
        self.attempts = attempts;
        self
    }

    pub(crate) fn with_attempts(mut self, attempts: u8) -> Self {
        self.attempts = attempts;
        self
    }
}

/// Incremental line-anchored terminator search.
#[derive(Default)]
struct Scanner {
    line_start: usize,
}

impl Scanner {
    /// Scan lines completed since the last call. Returns the matched
    /// terminator and the index where its line starts.
    fn scan(&mut self, buf: &[u8], terminators: &Terminators) -> Option<(Terminator, usize)> {
        while let Some(pos) = buf[self.line_start..].iter().position(|&b| b == b'\n') {
            let start = self.line_start;
            let end = start + pos;
            self.line_start = end + 1;
            if let Some(t) = terminators.find_line(&buf[start..end]) {
                return Some((t, start));
            }
        }
        terminators
            .find_tail(&buf[self.line_start..])
            .map(|t| (t, self.line_start))
    }
}

/// Length of the first line if it echoes `command`.
fn echo_end(raw: &[u8], command: &str) -> usize {
    let end = raw
        .iter()
        .position(|&b| b == b'\n')
        .map(|pos| pos + 1)
        .unwrap_or(raw.len());
    if !command.is_empty() && trim_ascii(&raw[..end]) == command.as_bytes() {
        end
    } else {
        0
    }
}

pub(crate) fn trim_ascii(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map(|pos| pos + 1)
        .unwrap_or(start);
    &bytes[start..end]
}

/// Exclusive owner of the modem UART.
pub struct AtTransport<S, const N: usize = DEFAULT_RESPONSE_LEN> {
    serial: S,
}

impl<S, const N: usize> AtTransport<S, N>
where
    S: Read + ReadReady + Write,
{
    pub fn new(serial: S) -> Self {
        Self { serial }
    }

    /// Give the serial port back.
    pub fn release(self) -> S {
        self.serial
    }

    /// Send `cmd` and collect the reply.
    ///
    /// A timeout or an error result is reported through the response tag,
    /// `Err` is reserved for serial port failures and buffer overflow.
    pub fn transact(&mut self, cmd: &Command) -> Result<Response<N>, Error> {
        self.discard_pending()?;

        debug!("Sending command: {:?}", cmd.as_str());
        self.write(&cmd.encode())?;
        self.collect(cmd)
    }

    /// Write a data payload after the modem asked for it (`>` prompt or
    /// `DOWNLOAD`) and wait up to `timeout` for the final result.
    pub fn transact_data(&mut self, data: &[u8], timeout: Duration) -> Result<Response<N>, Error> {
        let done = Command::new("")?.with_timeout(timeout);
        debug!("Sending {} data bytes", data.len());
        self.write(data)?;
        self.collect(&done)
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.serial.write_all(bytes).map_err(|_| Error::Io)?;
        self.serial.flush().map_err(|_| Error::Io)
    }

    fn collect(&mut self, cmd: &Command) -> Result<Response<N>, Error> {
        let deadline = Instant::now() + cmd.timeout();
        let mut raw: Vec<u8, N> = Vec::new();
        let mut scanner = Scanner::default();
        let mut chunk = [0u8; READ_CHUNK];

        let matched = loop {
            if Instant::now() >= deadline {
                break None;
            }

            if !self.serial.read_ready().map_err(|_| Error::Io)? {
                block_for(POLL_INTERVAL);
                continue;
            }

            let n = self.serial.read(&mut chunk).map_err(|_| Error::Io)?;
            if n == 0 {
                block_for(POLL_INTERVAL);
                continue;
            }
            if raw.extend_from_slice(&chunk[..n]).is_err() {
                error!("Response to {:?} overflowed {} bytes", cmd.as_str(), N);
                return Err(Error::ResponseOverflow);
            }

            if let Some(found) = scanner.scan(&raw, cmd.terminators()) {
                break Some(found);
            }
        };

        let tag = if core::str::from_utf8(&raw).is_err() {
            ResponseTag::DecodeError
        } else {
            match matched {
                Some((t, _)) if t.class == TerminatorClass::Success => ResponseTag::Success,
                Some(_) => ResponseTag::Failed,
                None => ResponseTag::TimedOut,
            }
        };

        match tag {
            ResponseTag::Success => trace!("Response: {:?}", Bytes(&raw)),
            ResponseTag::TimedOut => warn!(
                "Timeout after {} ms waiting for {:?}, got {:?}",
                cmd.timeout().as_millis(),
                cmd.as_str(),
                Bytes(&raw)
            ),
            _ => warn!(
                "{:?} response to {:?}: {:?}",
                tag,
                cmd.as_str(),
                Bytes(&raw)
            ),
        }

        let body_end = matched.map(|(_, start)| start).unwrap_or(raw.len());
        let echo_end = echo_end(&raw, cmd.as_str()).min(body_end);

        Ok(Response {
            tag,
            raw,
            terminator: matched.map(|(t, _)| t),
            echo_end,
            body_end,
            attempts: 1,
        })
    }

    /// Send a typed command and parse its response.
    pub fn send<C: AtatCmd>(&mut self, cmd: &C) -> Result<C::Response, Error> {
        let command = Command::from_atat(cmd)?;
        let response = self.transact(&command)?.into_result()?;
        let body = response.body()?;
        cmd.parse(Ok(body.as_bytes())).map_err(Error::from)
    }

    /// Drop input left over from earlier exchanges, such as unsolicited
    /// result codes or NMEA output.
    fn discard_pending(&mut self) -> Result<(), Error> {
        let mut chunk = [0u8; READ_CHUNK];
        let mut discarded = 0usize;
        // A modem streaming NMEA never goes quiet, stop after one buffer's worth
        while discarded < N && self.serial.read_ready().map_err(|_| Error::Io)? {
            let n = self.serial.read(&mut chunk).map_err(|_| Error::Io)?;
            if n == 0 {
                break;
            }
            discarded += n;
        }
        if discarded > 0 {
            debug!("Discarded {} stale bytes", discarded);
        }
        Ok(())
    }
}
