pub(crate) mod a76xx;
pub(crate) mod sim7000;
pub(crate) mod sim7600;
pub(crate) mod sim7670;

use embassy_time::Duration;

/// Command used to switch the module off gracefully.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerOffCommand {
    /// `AT+CPOF`
    Cpof,
    /// `AT+CPOWD=1`
    Cpowd,
}

/// Command family used to power and query the built-in GNSS receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GnssCommandSet {
    /// `AT+CGNSSPWR` / `AT+CGNSSINFO`
    Cgnss,
    /// `AT+CGNSPWR` / `AT+CGNSINF`
    Cgns,
}

pub trait ModuleParams: Copy {
    /// How long RESET is held deasserted before the reset pulse
    fn reset_pre_hold(&self) -> Duration {
        Duration::from_millis(100)
    }

    /// How long RESET is held asserted
    fn reset_hold(&self) -> Duration {
        Duration::from_millis(2600)
    }

    /// How long PWRKEY is held low before the power-on pulse
    fn pwrkey_pre_low(&self) -> Duration {
        Duration::from_millis(100)
    }

    /// The time for which PWRKEY must be pulsed to effect power-on
    fn pwrkey_on_pulse(&self) -> Duration {
        Duration::from_millis(1000)
    }

    /// The time for which PWRKEY must be pulsed to effect power-off
    fn pwrkey_off_pulse(&self) -> Duration {
        Duration::from_millis(3000)
    }

    /// How long to wait after the power-on pulse before polling `AT`
    fn boot_wait(&self) -> Duration {
        Duration::from_secs(3)
    }

    /// How long to wait for an organised power-down to complete
    fn power_down_wait(&self) -> Duration {
        Duration::from_secs(10)
    }

    /// How long to wait for the UART to come back after DTR is lowered
    fn dtr_wake_wait(&self) -> Duration {
        Duration::from_secs(2)
    }

    /// Timeout of a single `AT` probe during the handshake
    fn handshake_timeout(&self) -> Duration {
        Duration::from_secs(1)
    }

    /// Number of `AT` probes per power-on pulse
    fn handshake_attempts(&self) -> u8 {
        10
    }

    /// Number of power-on pulses before giving up
    fn power_on_rounds(&self) -> u8 {
        2
    }

    fn power_off_command(&self) -> PowerOffCommand {
        PowerOffCommand::Cpof
    }

    fn has_builtin_gnss(&self) -> bool {
        true
    }

    fn gnss_command_set(&self) -> GnssCommandSet {
        GnssCommandSet::Cgnss
    }

    /// `+NETOPEN` socket service and the `+HTTP*` client
    fn has_ip_stack(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModuleKind {
    A76xx,
    /// A7670G variant, which has no GNSS receiver
    A7670g,
    Sim7670,
    Sim7000,
    Sim7600,
    Generic,
}

impl ModuleKind {
    /// Identify the module from the `AT+CGMM` model identification.
    pub fn from_model_id(model: &[u8]) -> Self {
        let model = crate::transport::trim_ascii(model);
        let model = model.strip_prefix(b"SIMCOM_").unwrap_or(model);
        match model {
            m if m.starts_with(b"A7670G") => Self::A7670g,
            m if m.starts_with(b"A76") => Self::A76xx,
            m if m.starts_with(b"SIM767") => Self::Sim7670,
            m if m.starts_with(b"SIM7000") => Self::Sim7000,
            m if m.starts_with(b"SIM7600") => Self::Sim7600,
            id => {
                warn!(
                    "Attempting to run {:?} using generic module parameters! This may or may not work.",
                    crate::fmt::Bytes(id)
                );
                Self::Generic
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Generic;

impl ModuleParams for Generic {}

macro_rules! inner {
    ($self: ident, $fn: ident) => {
        match $self {
            Self::A76xx => a76xx::A76xx.$fn(),
            Self::A7670g => a76xx::A7670g.$fn(),
            Self::Sim7670 => sim7670::Sim7670.$fn(),
            Self::Sim7000 => sim7000::Sim7000.$fn(),
            Self::Sim7600 => sim7600::Sim7600.$fn(),
            Self::Generic => Generic.$fn(),
        }
    };
}

impl ModuleParams for ModuleKind {
    fn reset_pre_hold(&self) -> Duration {
        inner!(self, reset_pre_hold)
    }

    fn reset_hold(&self) -> Duration {
        inner!(self, reset_hold)
    }

    fn pwrkey_pre_low(&self) -> Duration {
        inner!(self, pwrkey_pre_low)
    }

    fn pwrkey_on_pulse(&self) -> Duration {
        inner!(self, pwrkey_on_pulse)
    }

    fn pwrkey_off_pulse(&self) -> Duration {
        inner!(self, pwrkey_off_pulse)
    }

    fn boot_wait(&self) -> Duration {
        inner!(self, boot_wait)
    }

    fn power_down_wait(&self) -> Duration {
        inner!(self, power_down_wait)
    }

    fn dtr_wake_wait(&self) -> Duration {
        inner!(self, dtr_wake_wait)
    }

    fn handshake_timeout(&self) -> Duration {
        inner!(self, handshake_timeout)
    }

    fn handshake_attempts(&self) -> u8 {
        inner!(self, handshake_attempts)
    }

    fn power_on_rounds(&self) -> u8 {
        inner!(self, power_on_rounds)
    }

    fn power_off_command(&self) -> PowerOffCommand {
        inner!(self, power_off_command)
    }

    fn has_builtin_gnss(&self) -> bool {
        inner!(self, has_builtin_gnss)
    }

    fn gnss_command_set(&self) -> GnssCommandSet {
        inner!(self, gnss_command_set)
    }

    fn has_ip_stack(&self) -> bool {
        inner!(self, has_ip_stack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_module_from_model_id() {
        assert_eq!(ModuleKind::from_model_id(b"A7670E-LASE"), ModuleKind::A76xx);
        assert_eq!(ModuleKind::from_model_id(b"A7608SA-H"), ModuleKind::A76xx);
        assert_eq!(ModuleKind::from_model_id(b"A7670G-LABE"), ModuleKind::A7670g);
        assert_eq!(ModuleKind::from_model_id(b"SIM7670G-MNGV"), ModuleKind::Sim7670);
        assert_eq!(ModuleKind::from_model_id(b"SIMCOM_SIM7600G-H"), ModuleKind::Sim7600);
        assert_eq!(ModuleKind::from_model_id(b"SIM7000G\r\n"), ModuleKind::Sim7000);
        assert_eq!(ModuleKind::from_model_id(b"BG95-M3"), ModuleKind::Generic);
    }

    #[test]
    fn timing_table() {
        assert_eq!(ModuleKind::A76xx.pwrkey_on_pulse(), Duration::from_millis(100));
        assert_eq!(ModuleKind::Sim7000.pwrkey_on_pulse(), Duration::from_millis(1000));
        assert_eq!(ModuleKind::Sim7600.pwrkey_on_pulse(), Duration::from_millis(500));
        assert_eq!(ModuleKind::Sim7670.reset_hold(), Duration::from_millis(2600));
        assert_eq!(ModuleKind::Sim7000.power_off_command(), PowerOffCommand::Cpowd);
        assert!(!ModuleKind::A7670g.has_builtin_gnss());
        assert_eq!(ModuleKind::Sim7000.gnss_command_set(), GnssCommandSet::Cgns);
        assert!(!ModuleKind::Sim7000.has_ip_stack());
        assert!(ModuleKind::A7670g.has_ip_stack());
    }
}
