//! ### TCP/IP context
//!
//! A76XX, SIM7600 and SIM7670 only. `+NETOPEN` activates the PDP context
//! defined with `+CGDCONT` for the internal IP stack used by the HTTP(S),
//! MQTT(S) and socket services.
pub mod responses;

use super::NoResponse;
use atat::atat_derive::AtatCmd;
use responses::*;

/// Start socket service +NETOPEN
///
/// Answers `OK` at once and reports the outcome later as `+NETOPEN: <err>`.
/// An already opened network answers `+IP ERROR: Network is already opened`
/// followed by `ERROR`.
#[derive(Clone, AtatCmd)]
#[at_cmd("+NETOPEN", NoResponse, timeout_ms = 120000)]
pub struct OpenNetwork;

/// Stop socket service +NETCLOSE
#[derive(Clone, AtatCmd)]
#[at_cmd("+NETCLOSE", NoResponse, timeout_ms = 120000)]
pub struct CloseNetwork;

/// Inquire socket PDP address +IPADDR
#[derive(Clone, AtatCmd)]
#[at_cmd("+IPADDR", IpAddress)]
pub struct GetIpAddress;

#[cfg(test)]
mod tests {
    use super::*;
    use atat::AtatCmd;

    #[test]
    fn network_commands() {
        let mut buf = [0u8; 16];
        let len = OpenNetwork.write(&mut buf);
        assert_eq!(&buf[..len], b"AT+NETOPEN\r\n");

        let len = GetIpAddress.write(&mut buf);
        assert_eq!(&buf[..len], b"AT+IPADDR\r\n");
    }
}
