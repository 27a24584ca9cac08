//! ### GNSS receiver
//!
//! A76XX, SIM7600 and SIM7670 use the `+CGNSS*` family, SIM7000 the older
//! `+CGNS*` family. Location reports (`+CGNSSINFO`, `+CGNSINF`, `+CLBS`) are
//! parsed by [`crate::gnss`].
pub mod types;

use super::{NoResponse, OnOff};
use atat::atat_derive::AtatCmd;
use types::*;

/// GNSS power control +CGNSSPWR
#[derive(Clone, AtatCmd)]
#[at_cmd("+CGNSSPWR", NoResponse, timeout_ms = 10000)]
pub struct SetGnssPower {
    #[at_arg(position = 0)]
    pub state: OnOff,
}

/// GNSS constellation selection +CGNSSMODE
#[derive(Clone, AtatCmd)]
#[at_cmd("+CGNSSMODE", NoResponse)]
pub struct SetGnssMode {
    #[at_arg(position = 0)]
    pub mode: GnssMode,
}

/// GNSS power control +CGNSPWR (SIM7000)
#[derive(Clone, AtatCmd)]
#[at_cmd("+CGNSPWR", NoResponse, timeout_ms = 10000)]
pub struct SetGnsPower {
    #[at_arg(position = 0)]
    pub state: OnOff,
}

/// GNSS work mode +CGNSMOD (SIM7000)
#[derive(Clone, AtatCmd)]
#[at_cmd("+CGNSMOD", NoResponse)]
pub struct SetGnsMode {
    #[at_arg(position = 0)]
    pub gps: OnOff,
    #[at_arg(position = 1)]
    pub glonass: OnOff,
    #[at_arg(position = 2)]
    pub beidou: OnOff,
    #[at_arg(position = 3)]
    pub galileo: OnOff,
}

impl From<GnssMode> for SetGnsMode {
    fn from(mode: GnssMode) -> Self {
        Self {
            gps: OnOff::On,
            glonass: mode.glonass().into(),
            beidou: mode.beidou().into(),
            galileo: mode.galileo().into(),
        }
    }
}

/// Auxiliary voltage output +CVAUXS
///
/// Powers the active GNSS antenna on A76XX boards.
#[derive(Clone, AtatCmd)]
#[at_cmd("+CVAUXS", NoResponse)]
pub struct SetAuxVoltage {
    #[at_arg(position = 0)]
    pub state: OnOff,
}

/// Module GPIO control +CGPIO (SIM7000)
///
/// On the T-SIM7000G the GNSS antenna power switch hangs off module GPIO 48.
#[derive(Clone, AtatCmd)]
#[at_cmd("+CGPIO", NoResponse)]
pub struct SetModuleGpio {
    /// 0: set the GPIO level
    #[at_arg(position = 0)]
    pub operation: u8,
    #[at_arg(position = 1)]
    pub pin: u8,
    /// 1: output
    #[at_arg(position = 2)]
    pub direction: u8,
    #[at_arg(position = 3)]
    pub level: OnOff,
}
