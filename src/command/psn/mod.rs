//! ### Packet domain
pub mod responses;
pub mod types;

use super::NoResponse;
use atat::atat_derive::AtatCmd;
use responses::*;
use types::*;

/// Define PDP context +CGDCONT
#[derive(Clone, AtatCmd)]
#[at_cmd("+CGDCONT", NoResponse)]
pub struct SetPDPContextDefinition<'a> {
    #[at_arg(position = 0)]
    pub cid: u8,
    #[at_arg(position = 1, len = 6)]
    pub pdp_type: &'a str,
    #[at_arg(position = 2, len = 99)]
    pub apn: &'a str,
}

/// PS attach or detach +CGATT
///
/// If the MT is already in the requested state the command is ignored and
/// `OK` is returned.
#[derive(Clone, AtatCmd)]
#[at_cmd("+CGATT", NoResponse, timeout_ms = 75000)]
pub struct SetGPRSAttached {
    #[at_arg(position = 0)]
    pub state: GPRSAttachedState,
}

/// Read PS attach state +CGATT
#[derive(Clone, AtatCmd)]
#[at_cmd("+CGATT?", GPRSAttached)]
pub struct GetGPRSAttached;
