use core::str::FromStr;

use crate::config::Signal;
use crate::parse::ParseError;

/// Final result codes reported by the modem when a command is rejected.
///
/// `+CME ERROR` and `+CMS ERROR` carry a numeric code when verbose errors are
/// disabled (`AT+CMEE=1`). With `AT+CMEE=2` the modem sends text instead,
/// which is reported as code `0xFFFF`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModemError {
    /// Plain `ERROR`
    Generic,
    /// Mobile termination error `+CME ERROR: <n>`
    Cme(u16),
    /// Message service error `+CMS ERROR: <n>`
    Cms(u16),
}

/// Code reported for verbose (textual) error results.
pub const VERBOSE_ERROR_CODE: u16 = u16::MAX;

impl FromStr for ModemError {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(err) = s.strip_prefix("+CME ERROR:") {
            Ok(Self::Cme(err.trim().parse().unwrap_or(VERBOSE_ERROR_CODE)))
        } else if let Some(err) = s.strip_prefix("+CMS ERROR:") {
            Ok(Self::Cms(err.trim().parse().unwrap_or(VERBOSE_ERROR_CODE)))
        } else if s == "ERROR" {
            Ok(Self::Generic)
        } else {
            Err(())
        }
    }
}

#[derive(Debug, PartialEq)]
#[non_exhaustive]
pub enum Error {
    // Transport errors
    TransportTimeout,
    TransportDecode,
    Io,
    ResponseOverflow,
    CommandTooLong,
    /// Command text with bytes outside printable ASCII
    InvalidCommand,
    EmptyTerminatorSet,
    TooManyTerminators,
    CommandFailed(ModemError),

    // Response parsing
    Parse(ParseError),

    // Power sequencing
    PowerHandshakeTimeout,
    PinUnavailable(Signal),
    PinWriteFailed(Signal),

    RetryExhausted,

    /// The modem has not been powered on and initialized
    Uninitialized,

    /// Operation not available on the detected module
    Unsupported,

    Atat(atat::Error),
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter<'_>) {
        match self {
            Self::TransportTimeout => defmt::write!(f, "TransportTimeout"),
            Self::TransportDecode => defmt::write!(f, "TransportDecode"),
            Self::Io => defmt::write!(f, "Io"),
            Self::ResponseOverflow => defmt::write!(f, "ResponseOverflow"),
            Self::CommandTooLong => defmt::write!(f, "CommandTooLong"),
            Self::InvalidCommand => defmt::write!(f, "InvalidCommand"),
            Self::EmptyTerminatorSet => defmt::write!(f, "EmptyTerminatorSet"),
            Self::TooManyTerminators => defmt::write!(f, "TooManyTerminators"),
            Self::CommandFailed(e) => defmt::write!(f, "CommandFailed({:?})", e),
            Self::Parse(e) => defmt::write!(f, "Parse({:?})", e),
            Self::PowerHandshakeTimeout => defmt::write!(f, "PowerHandshakeTimeout"),
            Self::PinUnavailable(s) => defmt::write!(f, "PinUnavailable({:?})", s),
            Self::PinWriteFailed(s) => defmt::write!(f, "PinWriteFailed({:?})", s),
            Self::RetryExhausted => defmt::write!(f, "RetryExhausted"),
            Self::Uninitialized => defmt::write!(f, "Uninitialized"),
            Self::Unsupported => defmt::write!(f, "Unsupported"),
            Self::Atat(e) => defmt::write!(f, "Atat({:?})", e),
        }
    }
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Self::Parse(e)
    }
}

impl From<atat::Error> for Error {
    fn from(e: atat::Error) -> Self {
        Self::Atat(e)
    }
}
