//! ### Mobile equipment control and status
pub mod types;

use super::NoResponse;
use atat::atat_derive::AtatCmd;
use types::*;

/// Set phone functionality +CFUN
#[derive(Clone, AtatCmd)]
#[at_cmd("+CFUN", NoResponse, timeout_ms = 9000)]
pub struct SetModuleFunctionality {
    #[at_arg(position = 0)]
    pub fun: Functionality,
    #[at_arg(position = 1)]
    pub rst: Option<ResetMode>,
}

/// Power down the module +CPOF
///
/// A76XX and SIM7670 series. Answers `OK` and starts the power-down.
#[derive(Clone, AtatCmd)]
#[at_cmd("+CPOF", NoResponse, timeout_ms = 9000)]
pub struct PowerOff;

/// Power off +CPOWD
///
/// SIM7000 and SIM7600 series. A normal power-down answers
/// `NORMAL POWER DOWN` instead of `OK`.
#[derive(Clone, AtatCmd)]
#[at_cmd("+CPOWD", NoResponse, timeout_ms = 9000)]
pub struct PowerDown {
    #[at_arg(position = 0)]
    pub mode: PowerDownMode,
}
