//! ### Network service
pub mod responses;
pub mod types;

use atat::atat_derive::AtatCmd;
use responses::*;

/// Signal quality report +CSQ
///
/// Returns the received signal strength indication <rssi> and channel bit
/// error rate <ber>.
#[derive(Clone, AtatCmd)]
#[at_cmd("+CSQ", SignalQuality)]
pub struct GetSignalQuality;

/// Network registration +CREG
#[derive(Clone, AtatCmd)]
#[at_cmd("+CREG?", NetworkRegistrationStatus)]
pub struct GetNetworkRegistrationStatus;
