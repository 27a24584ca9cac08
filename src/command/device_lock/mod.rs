//! ### SIM card status
pub mod responses;

use atat::atat_derive::AtatCmd;
use responses::PinStatus;

/// Enter PIN +CPIN
///
/// Read whether a password is required before the SIM can be used.
#[derive(Clone, AtatCmd)]
#[at_cmd("+CPIN?", PinStatus, timeout_ms = 5000)]
pub struct GetPinStatus;
