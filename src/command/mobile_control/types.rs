//! Argument and parameter types used by Mobile equipment control Commands
use atat::atat_derive::AtatEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, AtatEnum)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Functionality {
    /// 0: minimum functionality
    Minimum = 0,
    /// 1: full functionality (default)
    Full = 1,
    /// 4: disable both transmit and receive RF circuits
    DisableRf = 4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, AtatEnum)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResetMode {
    /// 0: do not reset the MT before setting it to <fun> power level
    DontReset = 0,
    /// 1: reset the MT before setting it to <fun> power level
    Reset = 1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, AtatEnum)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerDownMode {
    /// 0: power off urgently
    Urgent = 0,
    /// 1: normal power off
    Normal = 1,
}
