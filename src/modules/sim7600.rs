use super::{ModuleParams, PowerOffCommand};
use embassy_time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct Sim7600;

impl ModuleParams for Sim7600 {
    fn pwrkey_on_pulse(&self) -> Duration {
        Duration::from_millis(500)
    }
    fn power_down_wait(&self) -> Duration {
        Duration::from_secs(15)
    }
    fn power_off_command(&self) -> PowerOffCommand {
        PowerOffCommand::Cpowd
    }
}
