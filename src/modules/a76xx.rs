use super::ModuleParams;
use embassy_time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct A76xx;

impl ModuleParams for A76xx {
    fn pwrkey_on_pulse(&self) -> Duration {
        Duration::from_millis(100)
    }
    fn pwrkey_off_pulse(&self) -> Duration {
        Duration::from_millis(3000)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct A7670g;

impl ModuleParams for A7670g {
    fn pwrkey_on_pulse(&self) -> Duration {
        A76xx.pwrkey_on_pulse()
    }
    fn pwrkey_off_pulse(&self) -> Duration {
        A76xx.pwrkey_off_pulse()
    }
    fn has_builtin_gnss(&self) -> bool {
        false
    }
}
