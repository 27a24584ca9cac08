//! Responses for TCP/IP context Commands
use atat::atat_derive::AtatResp;
use atat::heapless_bytes::Bytes;
use no_std_net::IpAddr;

/// Socket PDP address +IPADDR
///
/// The address is sent unquoted in dotted decimal or IPv6 notation.
#[derive(Debug, Clone, PartialEq, AtatResp)]
pub struct IpAddress {
    #[at_arg(position = 0)]
    pub address: Bytes<46>,
}

impl IpAddress {
    pub fn ip(&self) -> Option<IpAddr> {
        core::str::from_utf8(&self.address).ok()?.trim().parse().ok()
    }
}

/// Outcome reported by `+NETOPEN: <err>`, 0 on success.
#[derive(Debug, Clone, PartialEq, AtatResp)]
pub struct NetworkOpened {
    #[at_arg(position = 0)]
    pub err: u8,
}
