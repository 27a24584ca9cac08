use super::ModuleParams;
use embassy_time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct Sim7670;

impl ModuleParams for Sim7670 {
    fn pwrkey_on_pulse(&self) -> Duration {
        Duration::from_millis(100)
    }
    fn pwrkey_off_pulse(&self) -> Duration {
        Duration::from_millis(1300)
    }
}
