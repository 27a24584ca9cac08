//! Responses for Network service Commands
use super::types::*;
use atat::atat_derive::AtatResp;

/// Signal quality report +CSQ
#[derive(Debug, Clone, PartialEq, AtatResp)]
pub struct SignalQuality {
    /// 0..=31, or 99 when not known or not detectable
    #[at_arg(position = 0)]
    pub rssi: u8,
    #[at_arg(position = 1)]
    pub ber: u8,
}

impl SignalQuality {
    /// Received signal strength in dBm.
    pub fn dbm(&self) -> Option<i16> {
        match self.rssi {
            0..=31 => Some(-113 + 2 * i16::from(self.rssi)),
            _ => None,
        }
    }
}

/// Network registration +CREG
#[derive(Debug, Clone, PartialEq, AtatResp)]
pub struct NetworkRegistrationStatus {
    #[at_arg(position = 0)]
    pub n: u8,
    #[at_arg(position = 1)]
    pub stat: NetworkRegistrationStat,
}
