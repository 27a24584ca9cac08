//! Argument and parameter types used by Network service Commands and Responses
use atat::atat_derive::AtatEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, AtatEnum)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NetworkRegistrationStat {
    /// 0: not registered, the MT is not currently searching an operator
    NotRegistered = 0,
    /// 1: registered, home network
    Registered = 1,
    /// 2: not registered, but the MT is currently searching a new operator
    Searching = 2,
    /// 3: registration denied
    Denied = 3,
    /// 4: unknown
    Unknown = 4,
    /// 5: registered, roaming
    Roaming = 5,
}

impl NetworkRegistrationStat {
    pub fn is_registered(&self) -> bool {
        matches!(self, Self::Registered | Self::Roaming)
    }
}
