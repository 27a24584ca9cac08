//! Responses for General Commands
use atat::atat_derive::AtatResp;
use atat::heapless_bytes::Bytes;

/// Model identification +CGMM
///
/// The model is sent unquoted and may contain `-` or `_`, e.g.
/// `SIMCOM_SIM7600G-H`.
#[derive(Debug, Clone, PartialEq, AtatResp)]
pub struct ModelId {
    #[at_arg(position = 0)]
    pub model: Bytes<32>,
}

/// IMEI identification +CGSN
#[derive(Debug, Clone, PartialEq, AtatResp)]
pub struct IMEI {
    #[at_arg(position = 0)]
    pub imei: u64,
}

/// Card identification +CCID
#[derive(Debug, Clone, PartialEq, AtatResp)]
pub struct CCID {
    #[at_arg(position = 0)]
    pub ccid: u128,
}
