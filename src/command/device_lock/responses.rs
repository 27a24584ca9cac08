//! Responses for SIM card status Commands
use core::str::FromStr;

use atat::atat_derive::AtatResp;
use atat::heapless_bytes::Bytes;

/// Enter PIN +CPIN
#[derive(Debug, Clone, PartialEq, AtatResp)]
pub struct PinStatus {
    #[at_arg(position = 0)]
    pub code: Bytes<16>,
}

impl PinStatus {
    pub fn status(&self) -> SimStatus {
        core::str::from_utf8(&self.code)
            .ok()
            .and_then(|code| code.parse().ok())
            .unwrap_or(SimStatus::Unknown)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SimStatus {
    /// READY: MT is not pending for any password
    Ready,
    /// SIM PIN: MT is waiting SIM PIN to be given
    SimPin,
    /// SIM PUK: MT is waiting SIM PUK to be given
    SimPuk,
    /// PH-SIM PIN: MT is waiting phone to SIM card password to be given
    PhSimPin,
    /// SIM PIN2: MT is waiting SIM PIN2 to be given
    SimPin2,
    /// SIM PUK2: MT is waiting SIM PUK2 to be given
    SimPuk2,
    /// PH-NET PIN: MT is waiting network personalization password to be given
    PhNetPin,
    Unknown,
}

impl FromStr for SimStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "READY" => Self::Ready,
            "SIM PIN" => Self::SimPin,
            "SIM PUK" => Self::SimPuk,
            "PH-SIM PIN" => Self::PhSimPin,
            "SIM PIN2" => Self::SimPin2,
            "SIM PUK2" => Self::SimPuk2,
            "PH-NET PIN" => Self::PhNetPin,
            _ => return Err(()),
        })
    }
}
