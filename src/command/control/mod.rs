//! ### V.25TER and control commands
pub mod types;

use super::NoResponse;
use atat::atat_derive::AtatCmd;
use types::{Echo, SlowClock, TerminationErrorMode};

/// Echo command E
///
/// Controls whether the modem echoes characters received from the host while
/// in command state.
#[derive(Clone, AtatCmd)]
#[at_cmd("E", NoResponse, value_sep = false)]
pub struct SetEcho {
    #[at_arg(position = 0)]
    pub enabled: Echo,
}

/// Report mobile equipment error +CMEE
///
/// Selects whether a failed command ends in `ERROR`, a numeric
/// `+CME ERROR: <n>` or a verbose `+CME ERROR: <text>` result code.
#[derive(Clone, AtatCmd)]
#[at_cmd("+CMEE", NoResponse)]
pub struct SetReportMobileTerminationError {
    #[at_arg(position = 0)]
    pub n: TerminationErrorMode,
}

/// Configure slow clock +CSCLK
///
/// With the DTR controlled setting the module enters sleep mode when DTR is
/// pulled high and the UART has been idle, and wakes when DTR is pulled low.
#[derive(Clone, AtatCmd)]
#[at_cmd("+CSCLK", NoResponse)]
pub struct SetSlowClock {
    #[at_arg(position = 0)]
    pub mode: SlowClock,
}
