//! ### General Commands
pub mod responses;

use atat::atat_derive::AtatCmd;
use responses::*;

/// Request model identification +CGMM
///
/// Text string identifying the model, e.g. `A7670E-LASE` or
/// `SIMCOM_SIM7600G-H`.
#[derive(Clone, AtatCmd)]
#[at_cmd("+CGMM", ModelId)]
pub struct GetModelId;

/// Request product serial number identification +CGSN
///
/// Returns the International Mobile Equipment Identity (IMEI).
#[derive(Clone, AtatCmd)]
#[at_cmd("+CGSN", IMEI)]
pub struct GetIMEI;

/// Card identification +CCID
///
/// Returns the ICCID (Integrated Circuit Card ID) of the SIM-card.
#[derive(Clone, AtatCmd)]
#[at_cmd("+CCID", CCID, timeout_ms = 2000)]
pub struct GetCCID;
