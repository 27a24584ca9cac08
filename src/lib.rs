#![cfg_attr(not(test), no_std)]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod client;
pub mod command;
pub mod config;
pub mod error;
pub mod gnss;
pub mod http;
pub mod modules;
pub mod parse;
pub mod power;
pub mod retry;
pub mod transport;

#[cfg(test)]
mod test_helpers;

pub use client::Modem;
pub use config::{Board, BoardConfig, ModemPins, NoPin, Pins, Signal};
pub use error::{Error, ModemError};
pub use http::{HttpMethod, HttpResponse};
pub use modules::{ModuleKind, ModuleParams};
pub use parse::{parse_csv, Field, Fields, ParseError};
pub use power::{PowerSequencer, PowerState};
pub use retry::{with_retry, Backoff, RetryPolicy};
pub use transport::{AtTransport, Command, Response, ResponseTag, Terminator, Terminators};
