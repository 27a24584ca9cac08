use super::{GnssCommandSet, ModuleParams, PowerOffCommand};
use embassy_time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct Sim7000;

impl ModuleParams for Sim7000 {
    fn pwrkey_on_pulse(&self) -> Duration {
        Duration::from_millis(1000)
    }
    fn pwrkey_off_pulse(&self) -> Duration {
        Duration::from_millis(1300)
    }
    fn boot_wait(&self) -> Duration {
        Duration::from_secs(5)
    }
    fn power_off_command(&self) -> PowerOffCommand {
        PowerOffCommand::Cpowd
    }
    fn gnss_command_set(&self) -> GnssCommandSet {
        GnssCommandSet::Cgns
    }
    fn has_ip_stack(&self) -> bool {
        false
    }
}
