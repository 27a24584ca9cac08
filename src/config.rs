use core::convert::Infallible;
use embedded_hal::digital::{ErrorType, OutputPin, PinState};

use crate::modules::ModuleKind;

/// Stand-in for a signal that is not wired on the board.
pub struct NoPin;

impl ErrorType for NoPin {
    type Error = Infallible;
}

impl OutputPin for NoPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Logical modem control signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Signal {
    PwrKey = 0,
    Reset = 1,
    PowerOn = 2,
    Dtr = 3,
    Ring = 4,
    /// Switch of the GNSS antenna supply on boards that route it to the MCU
    GpsEnable = 5,
}

impl Signal {
    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// A small set of [`Signal`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SignalSet(u8);

impl SignalSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn with(self, signal: Signal) -> Self {
        Self(self.0 | signal.bit())
    }

    pub const fn contains(&self, signal: Signal) -> bool {
        self.0 & signal.bit() != 0
    }
}

/// GPIO numbers of the host MCU, as printed on the board schematic.
///
/// `None` means the signal is not routed to the MCU on this board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinMap {
    pub modem_tx: u8,
    pub modem_rx: u8,
    pub pwrkey: Option<u8>,
    pub reset: Option<u8>,
    pub power_on: Option<u8>,
    pub dtr: Option<u8>,
    pub ring: Option<u8>,
    pub battery_adc: Option<u8>,
    pub gps_enable: Option<u8>,
}

impl PinMap {
    pub const fn get(&self, signal: Signal) -> Option<u8> {
        match signal {
            Signal::PwrKey => self.pwrkey,
            Signal::Reset => self.reset,
            Signal::PowerOn => self.power_on,
            Signal::Dtr => self.dtr,
            Signal::Ring => self.ring,
            Signal::GpsEnable => self.gps_enable,
        }
    }
}

/// Supported evaluation boards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Board {
    LilygoTSim7670g,
    LilygoTA7670,
    LilygoTA7608,
    LilygoTSim7000g,
    LilygoTSim7600,
}

/// Immutable per-board configuration: pin map, UART settings, control signal
/// polarity and the module whose timing table applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardConfig {
    pub board: Board,
    pub module: ModuleKind,
    pub baud_rate: u32,
    pub pins: PinMap,
    /// Level on the RESET pin that holds the modem in reset
    pub reset_active: PinState,
    /// Level on the GPS enable pin that powers the GNSS antenna
    pub gps_enable_active: PinState,
    /// Signals the power sequencer may skip when they are missing or fail
    pub optional: SignalSet,
}

const DEFAULT_OPTIONAL: SignalSet = SignalSet::empty()
    .with(Signal::Reset)
    .with(Signal::PowerOn)
    .with(Signal::Dtr)
    .with(Signal::Ring)
    .with(Signal::GpsEnable);

impl BoardConfig {
    pub const fn for_board(board: Board) -> Self {
        match board {
            Board::LilygoTSim7670g => Self {
                board,
                module: ModuleKind::Sim7670,
                baud_rate: 115_200,
                pins: PinMap {
                    modem_tx: 11,
                    modem_rx: 10,
                    pwrkey: Some(18),
                    reset: Some(17),
                    // Shared with the board LED
                    power_on: Some(12),
                    dtr: Some(9),
                    ring: Some(3),
                    battery_adc: Some(4),
                    gps_enable: Some(4),
                },
                reset_active: PinState::Low,
                gps_enable_active: PinState::High,
                optional: DEFAULT_OPTIONAL,
            },
            Board::LilygoTA7670 => Self {
                board,
                module: ModuleKind::A76xx,
                baud_rate: 115_200,
                pins: PinMap {
                    modem_tx: 26,
                    modem_rx: 27,
                    pwrkey: Some(4),
                    reset: Some(5),
                    power_on: Some(12),
                    dtr: Some(25),
                    ring: Some(33),
                    battery_adc: Some(35),
                    gps_enable: None,
                },
                reset_active: PinState::High,
                gps_enable_active: PinState::High,
                optional: DEFAULT_OPTIONAL,
            },
            Board::LilygoTA7608 => Self {
                board,
                module: ModuleKind::A76xx,
                baud_rate: 115_200,
                pins: PinMap {
                    modem_tx: 26,
                    modem_rx: 27,
                    pwrkey: Some(4),
                    reset: Some(5),
                    power_on: Some(12),
                    dtr: Some(25),
                    ring: Some(33),
                    battery_adc: Some(35),
                    gps_enable: None,
                },
                reset_active: PinState::High,
                gps_enable_active: PinState::High,
                optional: DEFAULT_OPTIONAL,
            },
            Board::LilygoTSim7000g => Self {
                board,
                module: ModuleKind::Sim7000,
                baud_rate: 115_200,
                pins: PinMap {
                    modem_tx: 27,
                    modem_rx: 26,
                    pwrkey: Some(4),
                    reset: None,
                    power_on: None,
                    dtr: Some(25),
                    ring: None,
                    battery_adc: Some(35),
                    gps_enable: None,
                },
                reset_active: PinState::Low,
                gps_enable_active: PinState::High,
                optional: DEFAULT_OPTIONAL,
            },
            Board::LilygoTSim7600 => Self {
                board,
                module: ModuleKind::Sim7600,
                baud_rate: 115_200,
                pins: PinMap {
                    modem_tx: 27,
                    modem_rx: 26,
                    pwrkey: Some(4),
                    reset: None,
                    power_on: Some(12),
                    dtr: Some(32),
                    ring: Some(33),
                    battery_adc: Some(35),
                    gps_enable: None,
                },
                reset_active: PinState::Low,
                gps_enable_active: PinState::High,
                optional: DEFAULT_OPTIONAL,
            },
        }
    }

    /// Replace the module whose timing table is used, e.g. after
    /// identifying it with `AT+CGMM`.
    pub const fn with_module(mut self, module: ModuleKind) -> Self {
        self.module = module;
        self
    }

    pub const fn with_optional(mut self, optional: SignalSet) -> Self {
        self.optional = optional;
        self
    }

    pub const fn is_optional(&self, signal: Signal) -> bool {
        self.optional.contains(signal)
    }

    /// Pin level for a signal, honouring the RESET and GPS enable
    /// polarity. All other signals are active high.
    pub const fn level(&self, signal: Signal, asserted: bool) -> PinState {
        let active = match signal {
            Signal::Reset => self.reset_active,
            Signal::GpsEnable => self.gps_enable_active,
            _ => PinState::High,
        };
        match (active, asserted) {
            (PinState::High, true) | (PinState::Low, false) => PinState::High,
            (PinState::High, false) | (PinState::Low, true) => PinState::Low,
        }
    }
}

/// Access to the output pins driving the modem.
///
/// Return `None` for signals that are not wired; [`NoPin`] fills the type
/// slot.
pub trait ModemPins {
    type PwrKeyPin: OutputPin;
    type ResetPin: OutputPin;
    type PowerOnPin: OutputPin;
    type DtrPin: OutputPin;
    type GpsEnablePin: OutputPin;

    fn pwrkey_pin(&mut self) -> Option<&mut Self::PwrKeyPin>;
    fn reset_pin(&mut self) -> Option<&mut Self::ResetPin>;
    fn power_on_pin(&mut self) -> Option<&mut Self::PowerOnPin>;
    fn dtr_pin(&mut self) -> Option<&mut Self::DtrPin>;
    fn gps_enable_pin(&mut self) -> Option<&mut Self::GpsEnablePin>;
}

/// Plain holder implementing [`ModemPins`].
pub struct Pins<PK, RST, PON, DTR, GPS = NoPin> {
    pub pwrkey: Option<PK>,
    pub reset: Option<RST>,
    pub power_on: Option<PON>,
    pub dtr: Option<DTR>,
    pub gps_enable: Option<GPS>,
}

impl<PK: OutputPin> Pins<PK, NoPin, NoPin, NoPin, NoPin> {
    /// Only PWRKEY is wired.
    pub fn pwrkey_only(pwrkey: PK) -> Self {
        Self {
            pwrkey: Some(pwrkey),
            reset: None,
            power_on: None,
            dtr: None,
            gps_enable: None,
        }
    }
}

impl<PK, RST, PON, DTR, GPS> Pins<PK, RST, PON, DTR, GPS> {
    /// Add the GNSS antenna supply switch.
    pub fn with_gps_enable<G: OutputPin>(self, gps_enable: G) -> Pins<PK, RST, PON, DTR, G> {
        Pins {
            pwrkey: self.pwrkey,
            reset: self.reset,
            power_on: self.power_on,
            dtr: self.dtr,
            gps_enable: Some(gps_enable),
        }
    }
}

impl<PK, RST, PON, DTR, GPS> ModemPins for Pins<PK, RST, PON, DTR, GPS>
where
    PK: OutputPin,
    RST: OutputPin,
    PON: OutputPin,
    DTR: OutputPin,
    GPS: OutputPin,
{
    type PwrKeyPin = PK;
    type ResetPin = RST;
    type PowerOnPin = PON;
    type DtrPin = DTR;
    type GpsEnablePin = GPS;

    fn pwrkey_pin(&mut self) -> Option<&mut PK> {
        self.pwrkey.as_mut()
    }

    fn reset_pin(&mut self) -> Option<&mut RST> {
        self.reset.as_mut()
    }

    fn power_on_pin(&mut self) -> Option<&mut PON> {
        self.power_on.as_mut()
    }

    fn dtr_pin(&mut self) -> Option<&mut DTR> {
        self.dtr.as_mut()
    }

    fn gps_enable_pin(&mut self) -> Option<&mut GPS> {
        self.gps_enable.as_mut()
    }
}
