use embassy_time::Duration;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_io::{Read, ReadReady, Write};

use crate::command::control::types::SlowClock;
use crate::command::control::SetSlowClock;
use crate::command::mobile_control::types::PowerDownMode;
use crate::command::mobile_control::{PowerDown, PowerOff};
use crate::command::AT;
use crate::config::{BoardConfig, ModemPins, Signal};
use crate::error::Error;
use crate::modules::{ModuleParams, PowerOffCommand};
use crate::retry::{pause_for, RetryPolicy};
use crate::transport::{AtTransport, Command, Terminator, TerminatorClass, Terminators};

/// Pause between two `AT` probes of the handshake.
pub const HANDSHAKE_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerState {
    Off,
    /// Control pins are being sequenced
    PoweringOn,
    /// Pins sequenced, waiting for the modem to answer `AT`
    AwaitingHandshake,
    Online,
    /// DTR controlled sleep
    Sleeping,
    PoweringOff,
}

enum PinFault {
    Missing,
    Write,
}

fn drive<P: OutputPin>(pin: Option<&mut P>, state: embedded_hal::digital::PinState) -> Result<(), PinFault> {
    pin.ok_or(PinFault::Missing)?
        .set_state(state)
        .map_err(|_| PinFault::Write)
}

/// Drives the modem control signals through the power-on, reset, sleep and
/// power-off sequences of the configured board.
pub struct PowerSequencer<P, D> {
    config: BoardConfig,
    pins: P,
    delay: D,
    state: PowerState,
    handshake: RetryPolicy,
    probe_timeout: Duration,
}

impl<P, D> PowerSequencer<P, D>
where
    P: ModemPins,
    D: DelayNs,
{
    pub fn new(config: BoardConfig, pins: P, delay: D) -> Self {
        let module = config.module;
        Self {
            config,
            pins,
            delay,
            state: PowerState::Off,
            handshake: RetryPolicy::fixed(module.handshake_attempts(), HANDSHAKE_INTERVAL),
            probe_timeout: module.handshake_timeout(),
        }
    }

    /// Override the handshake probing taken from the module timing table.
    pub fn with_handshake(mut self, policy: RetryPolicy, probe_timeout: Duration) -> Self {
        self.handshake = policy;
        self.probe_timeout = probe_timeout;
        self
    }

    pub fn state(&self) -> PowerState {
        self.state
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    /// Switch to the timing table of `module`, e.g. after identifying it.
    pub fn set_module(&mut self, module: crate::modules::ModuleKind) {
        self.config = self.config.with_module(module);
    }

    pub fn delay(&mut self) -> &mut D {
        &mut self.delay
    }

    pub fn release(self) -> (P, D) {
        (self.pins, self.delay)
    }

    fn set_state(&mut self, state: PowerState) {
        if self.state != state {
            debug!("Power state {:?} -> {:?}", self.state, state);
            self.state = state;
        }
    }

    fn wait(&mut self, duration: Duration) {
        pause_for(&mut self.delay, duration);
    }

    /// Drive `signal` to its asserted or released level.
    fn set(&mut self, signal: Signal, asserted: bool) -> Result<(), Error> {
        let level = self.config.level(signal, asserted);
        let result = match signal {
            Signal::PwrKey => drive(self.pins.pwrkey_pin(), level),
            Signal::Reset => drive(self.pins.reset_pin(), level),
            Signal::PowerOn => drive(self.pins.power_on_pin(), level),
            Signal::Dtr => drive(self.pins.dtr_pin(), level),
            Signal::GpsEnable => drive(self.pins.gps_enable_pin(), level),
            // Input to the host
            Signal::Ring => Err(PinFault::Missing),
        };

        match result {
            Ok(()) => {
                trace!("{:?} asserted: {}", signal, asserted);
                Ok(())
            }
            Err(_) if self.config.is_optional(signal) => {
                warn!("Skipping optional signal {:?}", signal);
                Ok(())
            }
            Err(PinFault::Missing) => Err(Error::PinUnavailable(signal)),
            Err(PinFault::Write) => Err(Error::PinWriteFailed(signal)),
        }
    }

    /// Switch the GNSS antenna supply on boards that wire one.
    pub fn set_gnss_supply(&mut self, on: bool) -> Result<(), Error> {
        self.set(Signal::GpsEnable, on)
    }

    fn reset_sequence(&mut self) -> Result<(), Error> {
        let module = self.config.module;
        self.set(Signal::Reset, false)?;
        self.wait(module.reset_pre_hold());
        self.set(Signal::Reset, true)?;
        self.wait(module.reset_hold());
        self.set(Signal::Reset, false)
    }

    fn pulse_pwrkey(&mut self, pulse: Duration) -> Result<(), Error> {
        let module = self.config.module;
        self.set(Signal::PwrKey, false)?;
        self.wait(module.pwrkey_pre_low());
        self.set(Signal::PwrKey, true)?;
        self.wait(pulse);
        self.set(Signal::PwrKey, false)
    }

    /// Bring the modem up and wait until it answers `AT`.
    ///
    /// The PWRKEY pulse and handshake are repeated up to
    /// `power_on_rounds` times.
    pub fn power_on<S, const N: usize>(
        &mut self,
        transport: &mut AtTransport<S, N>,
    ) -> Result<(), Error>
    where
        S: Read + ReadReady + Write,
    {
        let module = self.config.module;
        info!("Powering on {:?} on {:?}", module, self.config.board);
        self.set_state(PowerState::PoweringOn);

        let result = self.power_on_inner(transport);
        if result.is_err() {
            self.set_state(PowerState::Off);
        }
        result
    }

    fn power_on_inner<S, const N: usize>(
        &mut self,
        transport: &mut AtTransport<S, N>,
    ) -> Result<(), Error>
    where
        S: Read + ReadReady + Write,
    {
        let module = self.config.module;

        self.set(Signal::PowerOn, true)?;
        self.reset_sequence()?;
        self.set(Signal::Dtr, false)?;

        let rounds = module.power_on_rounds().max(1);
        for round in 1..=rounds {
            self.set_state(PowerState::PoweringOn);
            self.pulse_pwrkey(module.pwrkey_on_pulse())?;
            self.wait(module.boot_wait());

            match self.handshake(transport) {
                Ok(()) => {
                    info!("Modem online after {} power-on round(s)", round);
                    return Ok(());
                }
                Err(Error::PowerHandshakeTimeout) => {
                    warn!("No answer to power-on round {}/{}", round, rounds);
                }
                Err(e) => return Err(e),
            }
        }

        error!("Modem did not answer after {} power-on rounds", rounds);
        Err(Error::PowerHandshakeTimeout)
    }

    /// Pulse RESET and wait for the modem to answer again.
    pub fn reset<S, const N: usize>(&mut self, transport: &mut AtTransport<S, N>) -> Result<(), Error>
    where
        S: Read + ReadReady + Write,
    {
        info!("Resetting modem");
        self.set_state(PowerState::PoweringOn);

        let result = self.reset_sequence().and_then(|_| {
            self.wait(self.config.module.boot_wait());
            self.handshake(transport)
        });
        if result.is_err() {
            self.set_state(PowerState::Off);
        }
        result
    }

    /// Poll `AT` until the modem answers `OK`.
    ///
    /// Moves to [`PowerState::Online`] on success. Gives
    /// [`Error::PowerHandshakeTimeout`] once the handshake policy is used up.
    pub fn handshake<S, const N: usize>(
        &mut self,
        transport: &mut AtTransport<S, N>,
    ) -> Result<(), Error>
    where
        S: Read + ReadReady + Write,
    {
        self.set_state(PowerState::AwaitingHandshake);

        let probe = Command::from_atat(&AT)?
            .with_timeout(self.probe_timeout)
            .with_terminators(Terminators::ok_or_error());
        let response = self
            .handshake
            .run(&mut self.delay, || transport.transact(&probe))?;

        if response.is_success() {
            self.set_state(PowerState::Online);
            Ok(())
        } else {
            warn!(
                "Handshake failed after {} attempt(s): {:?}",
                response.attempts(),
                response.tag()
            );
            Err(Error::PowerHandshakeTimeout)
        }
    }

    /// Enter DTR controlled sleep.
    pub fn sleep<S, const N: usize>(&mut self, transport: &mut AtTransport<S, N>) -> Result<(), Error>
    where
        S: Read + ReadReady + Write,
    {
        transport.send(&SetSlowClock {
            mode: SlowClock::DtrControlled,
        })?;
        self.set(Signal::Dtr, true)?;
        self.set_state(PowerState::Sleeping);
        Ok(())
    }

    /// Leave DTR controlled sleep.
    pub fn wake<S, const N: usize>(&mut self, transport: &mut AtTransport<S, N>) -> Result<(), Error>
    where
        S: Read + ReadReady + Write,
    {
        self.set(Signal::Dtr, false)?;
        self.wait(self.config.module.dtr_wake_wait());
        self.handshake(transport)?;
        transport.send(&SetSlowClock {
            mode: SlowClock::Disabled,
        })?;
        Ok(())
    }

    /// Shut the modem down, by command if it accepts one and by PWRKEY
    /// otherwise.
    pub fn power_off<S, const N: usize>(
        &mut self,
        transport: &mut AtTransport<S, N>,
    ) -> Result<(), Error>
    where
        S: Read + ReadReady + Write,
    {
        let module = self.config.module;
        info!("Powering off modem");
        self.set_state(PowerState::PoweringOff);

        let command = match module.power_off_command() {
            PowerOffCommand::Cpof => Command::from_atat(&PowerOff)?,
            PowerOffCommand::Cpowd => Command::from_atat(&PowerDown {
                mode: PowerDownMode::Normal,
            })?
            .with_terminators(Terminators::new(&[
                Terminator::line("NORMAL POWER DOWN", TerminatorClass::Success),
                Terminator::OK,
                Terminator::ERROR,
                Terminator::CME_ERROR,
            ])?),
        };

        let accepted = match transport.transact(&command) {
            Ok(response) => response.is_success(),
            Err(e) => {
                warn!("Power-off command failed: {:?}", e);
                false
            }
        };

        if !accepted {
            warn!("Power-off command not accepted, using PWRKEY");
            self.pulse_pwrkey(module.pwrkey_off_pulse())?;
        }

        self.wait(module.power_down_wait());
        self.set_state(PowerState::Off);
        Ok(())
    }
}
