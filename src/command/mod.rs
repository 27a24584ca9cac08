//! AT Commands for the SIMCom A76XX / SIM7000 / SIM7600 / SIM7670 family\
//! Following the SIMCom AT command manuals of the respective module series.

pub mod control;
pub mod device_lock;
pub mod general;
pub mod gnss;
pub mod http;
pub mod mobile_control;
pub mod network_service;
pub mod psn;
pub mod tcpip;

use atat::atat_derive::{AtatCmd, AtatEnum, AtatResp};

#[derive(Debug, Clone, PartialEq, Eq, AtatResp)]
pub struct NoResponse;

#[derive(Clone, AtatCmd)]
#[at_cmd("", NoResponse)]
pub struct AT;

/// Generic on/off argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AtatEnum)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OnOff {
    Off = 0,
    On = 1,
}

impl From<bool> for OnOff {
    fn from(on: bool) -> Self {
        if on {
            Self::On
        } else {
            Self::Off
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atat::AtatCmd;

    #[test]
    fn at_probe() {
        let mut buf = [0u8; 16];
        let len = AT.write(&mut buf);
        assert_eq!(&buf[..len], b"AT\r\n");
    }
}
