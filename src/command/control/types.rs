//! Argument and parameter types used by control Commands
use atat::atat_derive::AtatEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, AtatEnum)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Echo {
    Disable = 0,
    Enable = 1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, AtatEnum)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TerminationErrorMode {
    /// 0: `+CME ERROR: <err>` result code disabled and ERROR used
    Disabled = 0,
    /// 1: `+CME ERROR: <err>` result code enabled and numeric <err> values used
    Enabled = 1,
    /// 2: `+CME ERROR: <err>` result code enabled and verbose <err> values used
    Verbose = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, AtatEnum)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SlowClock {
    /// 0: disable slow clock, the module never sleeps
    Disabled = 0,
    /// 1: sleep is controlled by the DTR pin
    DtrControlled = 1,
    /// 2: the module decides when to sleep on its own
    Automatic = 2,
}
