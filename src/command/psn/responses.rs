//! Responses for Packet domain Commands
use super::types::*;
use atat::atat_derive::AtatResp;

/// PS attach or detach +CGATT
#[derive(Debug, Clone, PartialEq, AtatResp)]
pub struct GPRSAttached {
    #[at_arg(position = 0)]
    pub state: GPRSAttachedState,
}

#[cfg(test)]
mod tests {
    use super::*;
    use atat::serde_at::de::from_str;

    #[test]
    fn attached() {
        let res: GPRSAttached = from_str("+CGATT: 1").unwrap();
        assert_eq!(res.state, GPRSAttachedState::Attached);
    }
}
