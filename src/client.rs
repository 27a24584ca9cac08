use embassy_time::Duration;
use embedded_hal::delay::DelayNs;
use embedded_io::{Read, ReadReady, Write};
use heapless::String;

use crate::command::control::types::{Echo, TerminationErrorMode};
use crate::command::control::{SetEcho, SetReportMobileTerminationError};
use crate::command::device_lock::responses::SimStatus;
use crate::command::device_lock::GetPinStatus;
use crate::command::general::{GetCCID, GetIMEI, GetModelId};
use crate::command::gnss::{
    SetAuxVoltage, SetGnsMode, SetGnsPower, SetGnssMode, SetGnssPower, SetModuleGpio,
};
use crate::command::http::{
    HttpAction, HttpData, HttpInit, HttpRead, HttpTerm, SetHttpParameter,
};
use crate::command::mobile_control::types::{Functionality, ResetMode};
use crate::command::mobile_control::SetModuleFunctionality;
use crate::command::network_service::responses::SignalQuality;
use crate::command::network_service::types::NetworkRegistrationStat;
use crate::command::network_service::{GetNetworkRegistrationStatus, GetSignalQuality};
use crate::command::psn::types::GPRSAttachedState;
use crate::command::psn::{GetGPRSAttached, SetGPRSAttached, SetPDPContextDefinition};
use crate::command::tcpip::responses::NetworkOpened;
use crate::command::tcpip::{CloseNetwork, GetIpAddress, OpenNetwork};
use crate::command::OnOff;
use crate::config::{BoardConfig, ModemPins};
use crate::error::{Error, ModemError};
use crate::fmt::Bytes;
use crate::gnss::{GnssMode, LbsLocation, ParsedFix};
use crate::http::{read_chunk, ActionResult, HttpMethod, HttpResponse, MAX_URL_LEN};
use crate::modules::{GnssCommandSet, ModuleKind, ModuleParams};
use crate::power::{PowerSequencer, PowerState};
use crate::retry::RetryPolicy;
use crate::transport::{
    AtTransport, Command, Response, Terminator, TerminatorClass, Terminators,
    DEFAULT_RESPONSE_LEN,
};
use no_std_net::IpAddr;

/// Cell based location lookups go out to the network.
const LBS_TIMEOUT: Duration = Duration::from_secs(20);

/// Module GPIO switching the GNSS antenna supply on the T-SIM7000G.
const SIM7000_GNSS_POWER_GPIO: u8 = 48;

const NETWORK_OPENED: Terminator = Terminator::prefix("+NETOPEN:", TerminatorClass::Success);
const NETWORK_ALREADY_OPEN: Terminator = Terminator::line(
    "+IP ERROR: Network is already opened",
    TerminatorClass::Success,
);

const DOWNLOAD: Terminator = Terminator::line("DOWNLOAD", TerminatorClass::Success);
const HTTP_ACTION_DONE: Terminator = Terminator::prefix("+HTTPACTION:", TerminatorClass::Success);
const HTTP_READ_DONE: Terminator = Terminator::line("+HTTPREAD: 0", TerminatorClass::Success);

/// Seconds the modem waits for the `+HTTPDATA` payload.
const HTTP_DATA_WINDOW_S: u16 = 10;

/// Wait for the final result after a data payload was written.
const DATA_TIMEOUT: Duration = Duration::from_secs(10);

/// Response bytes of `+HTTPREAD` besides the data itself.
const HTTP_READ_OVERHEAD: usize = 64;

/// High level driver combining the AT transport with the power sequencer of
/// one board.
pub struct Modem<S, P, D, const N: usize = DEFAULT_RESPONSE_LEN> {
    transport: AtTransport<S, N>,
    power: PowerSequencer<P, D>,
    retry: RetryPolicy,
}

impl<S, P, D, const N: usize> Modem<S, P, D, N>
where
    S: Read + ReadReady + Write,
    P: ModemPins,
    D: DelayNs,
{
    pub fn new(serial: S, config: BoardConfig, pins: P, delay: D) -> Self {
        Self::from_parts(
            AtTransport::new(serial),
            PowerSequencer::new(config, pins, delay),
        )
    }

    pub fn from_parts(transport: AtTransport<S, N>, power: PowerSequencer<P, D>) -> Self {
        Self {
            transport,
            power,
            retry: RetryPolicy::fixed(3, Duration::from_millis(500)),
        }
    }

    /// Policy used for the raw queries (`+CGNSSINFO`, `+CLBS`, ...).
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn module(&self) -> ModuleKind {
        self.power.config().module
    }

    pub fn power_state(&self) -> PowerState {
        self.power.state()
    }

    pub fn transport(&mut self) -> &mut AtTransport<S, N> {
        &mut self.transport
    }

    pub fn power(&mut self) -> &mut PowerSequencer<P, D> {
        &mut self.power
    }

    pub fn release(self) -> (S, P, D) {
        let (pins, delay) = self.power.release();
        (self.transport.release(), pins, delay)
    }

    fn ensure_online(&self) -> Result<(), Error> {
        if self.power.state() != PowerState::Online {
            return Err(Error::Uninitialized);
        }
        Ok(())
    }

    /// Power the modem on, put it into a known command state and identify
    /// the module.
    ///
    /// The timing table of the detected module replaces the board default
    /// for the following power operations.
    pub fn init(&mut self) -> Result<ModuleKind, Error> {
        self.power.power_on(&mut self.transport)?;

        self.transport.send(&SetEcho {
            enabled: Echo::Disable,
        })?;
        self.transport.send(&SetReportMobileTerminationError {
            n: TerminationErrorMode::Enabled,
        })?;

        let model = self.transport.send(&GetModelId)?;
        let module = ModuleKind::from_model_id(&model.model);
        info!("Detected {:?} ({:?})", module, Bytes(&model.model));
        self.power.set_module(module);

        Ok(module)
    }

    /// Send a typed command to the modem.
    pub fn send<C: atat::AtatCmd>(&mut self, cmd: &C) -> Result<C::Response, Error> {
        self.ensure_online()?;
        self.transport.send(cmd)
    }

    /// Send a raw command line, retrying under the modem's retry policy, and
    /// return the successful response.
    pub fn query(&mut self, command: &Command) -> Result<Response<N>, Error> {
        self.ensure_online()?;
        let transport = &mut self.transport;
        self.retry
            .run(self.power.delay(), || transport.transact(command))?
            .into_result()
    }

    /// Send a raw command once and return the successful response.
    fn exchange(&mut self, command: &Command) -> Result<Response<N>, Error> {
        self.ensure_online()?;
        self.transport.transact(command)?.into_result()
    }

    /// Send `command`, whose success terminator is the modem asking for data,
    /// then write `data` and wait for the final result.
    fn exchange_with_data(&mut self, command: &Command, data: &[u8]) -> Result<Response<N>, Error> {
        self.exchange(command)?;
        self.transport
            .transact_data(data, DATA_TIMEOUT)?
            .into_result()
    }

    /// Send a command answered by the `>` data prompt, such as `+CIPSEND` or
    /// `+CMQTTPAYLOAD`, followed by its payload.
    pub fn send_data(&mut self, text: &str, data: &[u8]) -> Result<Response<N>, Error> {
        let command = Command::new(text)?.with_terminators(Terminators::prompt());
        self.exchange_with_data(&command, data)
    }

    pub fn model(&mut self) -> Result<String<32>, Error> {
        let model = self.send(&GetModelId)?.model;
        core::str::from_utf8(&model)
            .ok()
            .and_then(|model| String::try_from(model).ok())
            .ok_or(Error::TransportDecode)
    }

    pub fn imei(&mut self) -> Result<u64, Error> {
        Ok(self.send(&GetIMEI)?.imei)
    }

    /// ICCID of the inserted SIM card.
    pub fn ccid(&mut self) -> Result<u128, Error> {
        Ok(self.send(&GetCCID)?.ccid)
    }

    /// Set the phone functionality level, optionally resetting the module
    /// first.
    pub fn set_functionality(&mut self, fun: Functionality, reset: bool) -> Result<(), Error> {
        self.send(&SetModuleFunctionality {
            fun,
            rst: reset.then_some(ResetMode::Reset),
        })?;
        Ok(())
    }

    /// Switch the RF circuits on (`+CFUN=1`) or off (`+CFUN=4`).
    pub fn set_radio(&mut self, on: bool) -> Result<(), Error> {
        let fun = if on {
            Functionality::Full
        } else {
            Functionality::DisableRf
        };
        self.set_functionality(fun, false)
    }

    /// Manufacturer, model, revision and IMEI as reported by `AT+SIMCOMATI`.
    pub fn product_info(&mut self) -> Result<String<256>, Error> {
        let response = self.query(&Command::new("AT+SIMCOMATI")?)?;
        String::try_from(response.body()?).map_err(|_| Error::ResponseOverflow)
    }

    pub fn sim_status(&mut self) -> Result<SimStatus, Error> {
        Ok(self.send(&GetPinStatus)?.status())
    }

    pub fn signal_quality(&mut self) -> Result<SignalQuality, Error> {
        self.send(&GetSignalQuality)
    }

    pub fn registration(&mut self) -> Result<NetworkRegistrationStat, Error> {
        Ok(self.send(&GetNetworkRegistrationStatus)?.stat)
    }

    /// Define PDP context 1 with `apn` and attach to the packet domain.
    pub fn attach(&mut self, apn: &str) -> Result<(), Error> {
        self.send(&SetPDPContextDefinition {
            cid: 1,
            pdp_type: "IP",
            apn,
        })?;
        self.send(&SetGPRSAttached {
            state: GPRSAttachedState::Attached,
        })?;

        let attached = self.send(&GetGPRSAttached)?;
        if attached.state != GPRSAttachedState::Attached {
            warn!("Attach accepted but modem reports {:?}", attached.state);
        }
        Ok(())
    }

    fn ip_stack(&self) -> Result<(), Error> {
        let module = self.module();
        if !module.has_ip_stack() {
            warn!("{:?} has no internal IP stack", module);
            return Err(Error::Unsupported);
        }
        Ok(())
    }

    /// Activate the attached PDP context for the modem's own IP services.
    ///
    /// A network that is already open counts as success.
    pub fn open_network(&mut self) -> Result<(), Error> {
        self.ip_stack()?;
        let command = Command::from_atat(&OpenNetwork)?.with_terminators(Terminators::new(&[
            NETWORK_OPENED,
            NETWORK_ALREADY_OPEN,
            Terminator::ERROR,
            Terminator::CME_ERROR,
        ])?);
        let response = self.query(&command)?;
        if response.terminator() == Some(NETWORK_ALREADY_OPEN) {
            debug!("Network already open");
            return Ok(());
        }

        let opened: NetworkOpened = atat::serde_at::from_str(response.terminator_line().unwrap_or(""))
            .map_err(|_| Error::Atat(atat::Error::Parse))?;
        if opened.err != 0 {
            warn!("+NETOPEN failed with {}", opened.err);
            return Err(Error::CommandFailed(ModemError::Generic));
        }
        info!("Network opened");
        Ok(())
    }

    pub fn close_network(&mut self) -> Result<(), Error> {
        self.ip_stack()?;
        self.send(&CloseNetwork)?;
        Ok(())
    }

    /// Address of the open network.
    pub fn ip_address(&mut self) -> Result<IpAddr, Error> {
        self.ip_stack()?;
        self.send(&GetIpAddress)?
            .ip()
            .ok_or(Error::Atat(atat::Error::Parse))
    }

    /// `GET url` with the built-in HTTP(S) client, copying the response body
    /// into `body`.
    pub fn http_get(&mut self, url: &str, body: &mut [u8]) -> Result<HttpResponse, Error> {
        self.http_request(HttpMethod::Get, url, None, &[], body)
    }

    /// `POST url` with `data` as request body.
    pub fn http_post(
        &mut self,
        url: &str,
        content_type: &str,
        data: &[u8],
        body: &mut [u8],
    ) -> Result<HttpResponse, Error> {
        self.http_request(HttpMethod::Post, url, Some(content_type), data, body)
    }

    /// Run one request in its own `+HTTPINIT` session.
    ///
    /// A response body longer than `body` is cut, see
    /// [`HttpResponse::is_truncated`].
    pub fn http_request(
        &mut self,
        method: HttpMethod,
        url: &str,
        content_type: Option<&str>,
        data: &[u8],
        body: &mut [u8],
    ) -> Result<HttpResponse, Error> {
        self.ip_stack()?;
        if url.len() > MAX_URL_LEN {
            return Err(Error::CommandTooLong);
        }

        // A session left over from an earlier failure makes +HTTPINIT fail
        if self.send(&HttpTerm).is_ok() {
            debug!("Closed stale HTTP session");
        }
        self.send(&HttpInit)?;

        let result = self.http_session(method, url, content_type, data, body);
        if let Err(e) = self.send(&HttpTerm) {
            warn!("+HTTPTERM failed: {:?}", e);
        }
        result
    }

    fn http_session(
        &mut self,
        method: HttpMethod,
        url: &str,
        content_type: Option<&str>,
        data: &[u8],
        body: &mut [u8],
    ) -> Result<HttpResponse, Error> {
        self.send(&SetHttpParameter {
            param: "URL",
            value: url,
        })?;
        if let Some(content_type) = content_type {
            self.send(&SetHttpParameter {
                param: "CONTENT",
                value: content_type,
            })?;
        }

        if !data.is_empty() {
            let command = Command::from_atat(&HttpData {
                size: data.len(),
                time: HTTP_DATA_WINDOW_S,
            })?
            .with_terminators(Terminators::new(&[
                DOWNLOAD,
                Terminator::ERROR,
                Terminator::CME_ERROR,
            ])?);
            self.exchange_with_data(&command, data)?;
        }

        let command = Command::from_atat(&HttpAction { method })?.with_terminators(
            Terminators::new(&[HTTP_ACTION_DONE, Terminator::ERROR, Terminator::CME_ERROR])?,
        );
        let response = self.exchange(&command)?;
        let action = ActionResult::from_line(response.terminator_line().unwrap_or(""))?;
        info!(
            "HTTP {:?}: status {}, {} bytes",
            method, action.status, action.length
        );

        let wanted = action.length.min(body.len());
        let mut read = 0;
        while read < wanted {
            let size = (wanted - read).min(N.saturating_sub(HTTP_READ_OVERHEAD));
            if size == 0 {
                return Err(Error::ResponseOverflow);
            }
            let command = Command::from_atat(&HttpRead { offset: read, size })?.with_terminators(
                Terminators::new(&[HTTP_READ_DONE, Terminator::ERROR, Terminator::CME_ERROR])?,
            );
            let response = self.exchange(&command)?;
            let chunk = read_chunk(response.payload())?;
            if chunk.is_empty() {
                break;
            }
            let n = chunk.len().min(wanted - read);
            body[read..read + n].copy_from_slice(&chunk[..n]);
            read += n;
        }

        Ok(HttpResponse {
            status: action.status,
            content_length: action.length,
            read,
        })
    }

    fn gnss_command_set(&self) -> Result<GnssCommandSet, Error> {
        let module = self.module();
        if !module.has_builtin_gnss() {
            warn!("{:?} has no GNSS receiver", module);
            return Err(Error::Unsupported);
        }
        Ok(module.gnss_command_set())
    }

    /// Power the GNSS receiver and select the constellations to track.
    ///
    /// The board's GPS enable pin, when wired, is switched on first.
    pub fn enable_gnss(&mut self, mode: GnssMode) -> Result<(), Error> {
        let commands = self.gnss_command_set()?;
        self.ensure_online()?;
        self.power.set_gnss_supply(true)?;

        match commands {
            GnssCommandSet::Cgnss => {
                // Active antenna supply, absent on some firmware
                if let Err(e) = self.send(&SetAuxVoltage { state: OnOff::On }) {
                    warn!("Could not enable antenna supply: {:?}", e);
                }
                self.send(&SetGnssPower { state: OnOff::On })?;
                self.send(&SetGnssMode { mode })?;
            }
            GnssCommandSet::Cgns => {
                self.send(&SetModuleGpio {
                    operation: 0,
                    pin: SIM7000_GNSS_POWER_GPIO,
                    direction: 1,
                    level: OnOff::On,
                })?;
                self.send(&SetGnsPower { state: OnOff::On })?;
                self.send(&SetGnsMode::from(mode))?;
            }
        }
        info!("GNSS enabled, mode {:?}", mode);
        Ok(())
    }

    pub fn disable_gnss(&mut self) -> Result<(), Error> {
        match self.gnss_command_set()? {
            GnssCommandSet::Cgnss => self.send(&SetGnssPower { state: OnOff::Off })?,
            GnssCommandSet::Cgns => self.send(&SetGnsPower { state: OnOff::Off })?,
        };
        self.power.set_gnss_supply(false)
    }

    /// Read the current GNSS report. A receiver without a fix yields a
    /// [`ParsedFix`] with every field `None`.
    pub fn gnss_fix(&mut self) -> Result<ParsedFix, Error> {
        let fix = match self.gnss_command_set()? {
            GnssCommandSet::Cgnss => {
                let response = self.query(&Command::new("AT+CGNSSINFO")?)?;
                ParsedFix::from_cgnssinfo(response.body()?)?
            }
            GnssCommandSet::Cgns => {
                let response = self.query(&Command::new("AT+CGNSINF")?)?;
                ParsedFix::from_cgnsinf(response.body()?)?
            }
        };
        debug!("GNSS fix: {}", fix.has_fix());
        Ok(fix)
    }

    /// Cell tower based location, `None` when the network has no answer.
    pub fn lbs_location(&mut self) -> Result<Option<LbsLocation>, Error> {
        let command = Command::new("AT+CLBS=4,1")?.with_timeout(LBS_TIMEOUT);
        let response = self.query(&command)?;
        Ok(LbsLocation::from_clbs(response.body()?)?)
    }

    pub fn sleep(&mut self) -> Result<(), Error> {
        self.ensure_online()?;
        self.power.sleep(&mut self.transport)
    }

    pub fn wake(&mut self) -> Result<(), Error> {
        self.power.wake(&mut self.transport)
    }

    pub fn reset(&mut self) -> Result<(), Error> {
        self.power.reset(&mut self.transport)
    }

    pub fn power_off(&mut self) -> Result<(), Error> {
        self.power.power_off(&mut self.transport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Board, NoPin, Pins, Signal};
    use crate::error::ModemError;
    use crate::test_helpers::*;
    use embedded_hal::digital::PinState;
    use std::rc::Rc;
    use std::vec::Vec;

    type TestPins = Pins<MockPin, NoPin, NoPin, NoPin, MockPin>;
    type TestModem = Modem<MockSerial, TestPins, MockDelay, 512>;

    fn modem_with_log(board: Board, replies: &[&[u8]]) -> (TestModem, PinLog) {
        let clock = Clock::new();
        let log: PinLog = Rc::default();
        let mut serial = MockSerial::new();
        for reply in replies {
            serial.reply(reply);
        }
        let pins = Pins::pwrkey_only(MockPin::new(Signal::PwrKey, &clock, &log))
            .with_gps_enable(MockPin::new(Signal::GpsEnable, &clock, &log));
        let power = PowerSequencer::new(BoardConfig::for_board(board), pins, MockDelay::new(&clock))
            .with_handshake(
                RetryPolicy::fixed(2, Duration::from_millis(10)),
                Duration::from_millis(5),
            );
        (Modem::from_parts(AtTransport::new(serial), power), log)
    }

    fn modem(board: Board, replies: &[&[u8]]) -> TestModem {
        modem_with_log(board, replies).0
    }

    /// A modem that went through `init` reporting `model`, with `replies`
    /// queued for the commands that follow.
    fn online_with_log(board: Board, model: &str, replies: &[&[u8]]) -> (TestModem, PinLog) {
        let cgmm = std::format!("\r\n{}\r\n\r\nOK\r\n", model);
        let mut script: Vec<&[u8]> = Vec::new();
        script.push(b"AT\r\r\nOK\r\n");
        script.push(b"ATE0\r\r\nOK\r\n");
        script.push(b"\r\nOK\r\n");
        script.push(cgmm.as_bytes());
        script.extend_from_slice(replies);

        let (mut modem, log) = modem_with_log(board, &script);
        modem.init().unwrap();
        (modem, log)
    }

    fn online(board: Board, model: &str, replies: &[&[u8]]) -> TestModem {
        online_with_log(board, model, replies).0
    }

    fn commands_after_init(modem: TestModem) -> Vec<std::string::String> {
        let (serial, _, _) = modem.release();
        serial
            .commands()
            .iter()
            .skip(4)
            .map(|c| std::string::String::from(*c))
            .collect()
    }

    #[test]
    fn init_detects_module() {
        let modem = online(Board::LilygoTA7670, "SIMCOM_SIM7600G-H", &[]);
        assert_eq!(modem.module(), ModuleKind::Sim7600);
        assert_eq!(modem.power_state(), PowerState::Online);

        let (serial, _, _) = modem.release();
        assert_eq!(serial.commands(), ["AT", "ATE0", "AT+CMEE=1", "AT+CGMM"]);
    }

    #[test]
    fn commands_need_init() {
        let mut modem = modem(Board::LilygoTA7670, &[]);
        assert_eq!(modem.signal_quality(), Err(Error::Uninitialized));
        assert!(modem.release().0.written().is_empty());
    }

    #[test]
    fn signal_and_sim() {
        let mut modem = online(
            Board::LilygoTA7670,
            "A7670E-LASE",
            &[
                b"\r\n+CSQ: 21,99\r\n\r\nOK\r\n",
                b"\r\n+CPIN: READY\r\n\r\nOK\r\n",
            ],
        );
        assert_eq!(modem.signal_quality().unwrap().dbm(), Some(-71));
        assert_eq!(modem.sim_status(), Ok(SimStatus::Ready));
    }

    #[test]
    fn sim_error_is_reported() {
        let mut modem = online(
            Board::LilygoTA7670,
            "A7670E-LASE",
            &[b"\r\n+CME ERROR: 10\r\n"],
        );
        assert_eq!(
            modem.sim_status(),
            Err(Error::CommandFailed(ModemError::Cme(10)))
        );
    }

    #[test]
    fn attach() {
        let mut modem = online(
            Board::LilygoTA7670,
            "A7670E-LASE",
            &[b"\r\nOK\r\n", b"\r\nOK\r\n", b"\r\n+CGATT: 1\r\n\r\nOK\r\n"],
        );
        modem.attach("internet").unwrap();
        assert_eq!(
            commands_after_init(modem),
            ["AT+CGDCONT=1,\"IP\",\"internet\"", "AT+CGATT=1", "AT+CGATT?"]
        );
    }

    #[test]
    fn a7670g_has_no_gnss() {
        let mut modem = online(Board::LilygoTA7670, "A7670G-LLSE", &[]);
        assert_eq!(modem.module(), ModuleKind::A7670g);
        assert_eq!(modem.enable_gnss(GnssMode::All), Err(Error::Unsupported));
        assert_eq!(modem.gnss_fix(), Err(Error::Unsupported));
    }

    #[test]
    fn enable_gnss_on_a76xx() {
        let mut modem = online(
            Board::LilygoTA7670,
            "A7670E-LASE",
            &[b"\r\nERROR\r\n", b"\r\nOK\r\n", b"\r\nOK\r\n"],
        );
        modem.enable_gnss(GnssMode::GpsBeidou).unwrap();
        assert_eq!(
            commands_after_init(modem),
            ["AT+CVAUXS=1", "AT+CGNSSPWR=1", "AT+CGNSSMODE=9"]
        );
    }

    #[test]
    fn gnss_supply_pin_follows_receiver_power() {
        let (mut modem, log) = online_with_log(
            Board::LilygoTSim7670g,
            "SIM7670G-MNGV",
            &[b"\r\nOK\r\n", b"\r\nOK\r\n", b"\r\nOK\r\n", b"\r\nOK\r\n"],
        );
        assert!(events_for(&log, Signal::GpsEnable).is_empty());

        modem.enable_gnss(GnssMode::All).unwrap();
        assert_eq!(
            events_for(&log, Signal::GpsEnable)
                .iter()
                .map(|e| e.state)
                .collect::<Vec<_>>(),
            [PinState::High]
        );

        modem.disable_gnss().unwrap();
        assert_eq!(
            events_for(&log, Signal::GpsEnable).last().map(|e| e.state),
            Some(PinState::Low)
        );
        assert_eq!(
            commands_after_init(modem),
            ["AT+CVAUXS=1", "AT+CGNSSPWR=1", "AT+CGNSSMODE=15", "AT+CGNSSPWR=0"]
        );
    }

    #[test]
    fn gnss_supply_untouched_before_init() {
        let (mut modem, log) = modem_with_log(Board::LilygoTSim7670g, &[]);
        assert_eq!(modem.enable_gnss(GnssMode::All), Err(Error::Uninitialized));
        assert!(events_for(&log, Signal::GpsEnable).is_empty());
    }

    #[test]
    fn enable_gnss_on_sim7000() {
        let mut modem = online(
            Board::LilygoTSim7000g,
            "SIMCOM_SIM7000G",
            &[b"\r\nOK\r\n", b"\r\nOK\r\n", b"\r\nOK\r\n"],
        );
        modem.enable_gnss(GnssMode::GpsGlonass).unwrap();
        assert_eq!(
            commands_after_init(modem),
            ["AT+CGPIO=0,48,1,1", "AT+CGNSPWR=1", "AT+CGNSMOD=1,1,0,0"]
        );
    }

    #[test]
    fn gnss_fix_is_retried() {
        let mut modem = online(
            Board::LilygoTSim7670g,
            "SIM7670G-MNGV",
            &[
                b"\r\nERROR\r\n",
                b"\r\n+CGNSSINFO: 2,04,00,21.123456,N,114.123456,E,020924,094145.00,-34.0,1.403,,6.9,6.8,1.0,03\r\n\r\nOK\r\n",
            ],
        );
        let fix = modem.gnss_fix().unwrap();
        assert!(fix.has_fix());
        assert_eq!(fix.latitude, Some(21.123456));
        assert_eq!(commands_after_init(modem), ["AT+CGNSSINFO", "AT+CGNSSINFO"]);
    }

    #[test]
    fn gnss_without_fix() {
        let mut modem = online(
            Board::LilygoTA7670,
            "A7670E-LASE",
            &[b"\r\n+CGNSSINFO: ,,,,,,,,,,,,,,,\r\n\r\nOK\r\n"],
        );
        let fix = modem.gnss_fix().unwrap();
        assert_eq!(fix, ParsedFix::default());
    }

    #[test]
    fn cell_location() {
        let mut modem = online(
            Board::LilygoTA7670,
            "A7670E-LASE",
            &[
                b"\r\n+CLBS: 0,31.228525,121.380295,550,2024/09/21,09:41:45\r\n\r\nOK\r\n",
                b"\r\n+CLBS: 2\r\n\r\nOK\r\n",
            ],
        );
        let loc = modem.lbs_location().unwrap().unwrap();
        assert_eq!(loc.latitude, 31.228525);
        assert_eq!(loc.accuracy, Some(550.0));
        assert_eq!(modem.lbs_location(), Ok(None));
    }

    #[test]
    fn query_gives_up() {
        let mut modem = online(
            Board::LilygoTA7670,
            "A7670E-LASE",
            &[b"\r\nERROR\r\n", b"\r\nERROR\r\n", b"\r\nERROR\r\n"],
        );
        assert_eq!(modem.product_info(), Err(Error::RetryExhausted));
        assert_eq!(commands_after_init(modem).len(), 3);
    }

    #[test]
    fn identity() {
        let mut modem = online(
            Board::LilygoTA7670,
            "A7670E-LASE",
            &[
                b"\r\nA7670E-LASE\r\n\r\nOK\r\n",
                b"\r\n+CCID: 89860320245510247163\r\n\r\nOK\r\n",
            ],
        );
        assert_eq!(modem.model().unwrap().as_str(), "A7670E-LASE");
        assert_eq!(modem.ccid(), Ok(89860320245510247163));
        assert_eq!(commands_after_init(modem), ["AT+CGMM", "AT+CCID"]);
    }

    #[test]
    fn radio_on_off() {
        let mut modem = online(
            Board::LilygoTA7670,
            "A7670E-LASE",
            &[b"\r\nOK\r\n", b"\r\nOK\r\n", b"\r\nOK\r\n"],
        );
        modem.set_radio(false).unwrap();
        modem.set_radio(true).unwrap();
        modem.set_functionality(Functionality::Full, true).unwrap();
        assert_eq!(
            commands_after_init(modem),
            ["AT+CFUN=4", "AT+CFUN=1", "AT+CFUN=1,1"]
        );
    }

    #[test]
    fn open_network_after_attach() {
        let mut modem = online(
            Board::LilygoTA7670,
            "A7670E-LASE",
            &[
                b"\r\nOK\r\n\r\n+NETOPEN: 0\r\n",
                b"\r\n+IPADDR: 10.71.155.118\r\n\r\nOK\r\n",
            ],
        );
        modem.open_network().unwrap();
        assert_eq!(
            modem.ip_address(),
            Ok(IpAddr::V4(no_std_net::Ipv4Addr::new(10, 71, 155, 118)))
        );
        assert_eq!(commands_after_init(modem), ["AT+NETOPEN", "AT+IPADDR"]);
    }

    #[test]
    fn network_already_open() {
        let mut modem = online(
            Board::LilygoTA7670,
            "A7670E-LASE",
            &[b"\r\n+IP ERROR: Network is already opened\r\n\r\nERROR\r\n"],
        );
        assert_eq!(modem.open_network(), Ok(()));
    }

    #[test]
    fn network_open_failure() {
        let mut modem = online(
            Board::LilygoTA7670,
            "A7670E-LASE",
            &[b"\r\nOK\r\n\r\n+NETOPEN: 1\r\n"],
        );
        assert_eq!(
            modem.open_network(),
            Err(Error::CommandFailed(ModemError::Generic))
        );
    }

    #[test]
    fn sim7000_has_no_ip_stack() {
        let mut modem = online(Board::LilygoTSim7000g, "SIMCOM_SIM7000G", &[]);
        assert_eq!(modem.open_network(), Err(Error::Unsupported));
        let mut body = [0u8; 16];
        assert_eq!(
            modem.http_get("http://example.com", &mut body),
            Err(Error::Unsupported)
        );
    }

    #[test]
    fn http_get() {
        let mut modem = online(
            Board::LilygoTA7670,
            "A7670E-LASE",
            &[
                b"\r\nERROR\r\n",
                b"\r\nOK\r\n",
                b"\r\nOK\r\n",
                b"\r\nOK\r\n\r\n+HTTPACTION: 0,200,11\r\n",
                b"\r\nOK\r\n\r\n+HTTPREAD: 11\r\nOK\r\n{\"a\":1}\r\n+HTTPREAD: 0\r\n",
                b"\r\nOK\r\n",
            ],
        );
        let mut body = [0u8; 64];
        let response = modem.http_get("https://httpbin.org/get", &mut body).unwrap();
        assert!(response.is_success());
        assert_eq!(response.read, 11);
        assert!(!response.is_truncated());
        assert_eq!(&body[..response.read], b"OK\r\n{\"a\":1}");
        assert_eq!(
            commands_after_init(modem),
            [
                "AT+HTTPTERM",
                "AT+HTTPINIT",
                "AT+HTTPPARA=\"URL\",\"https://httpbin.org/get\"",
                "AT+HTTPACTION=0",
                "AT+HTTPREAD=0,11",
                "AT+HTTPTERM",
            ]
        );
    }

    #[test]
    fn http_post_uploads_body() {
        let mut modem = online(
            Board::LilygoTA7670,
            "A7670E-LASE",
            &[
                b"\r\nOK\r\n",
                b"\r\nOK\r\n",
                b"\r\nOK\r\n",
                b"\r\nOK\r\n",
                b"\r\nDOWNLOAD\r\n",
                b"\r\nOK\r\n",
                b"\r\nOK\r\n\r\n+HTTPACTION: 1,201,0\r\n",
                b"\r\nOK\r\n",
            ],
        );
        let mut body = [0u8; 16];
        let response = modem
            .http_post(
                "http://example.com/post",
                "application/json",
                b"{\"n\":1}",
                &mut body,
            )
            .unwrap();
        assert_eq!(response.status, 201);
        assert_eq!(response.read, 0);
        assert_eq!(
            commands_after_init(modem),
            [
                "AT+HTTPTERM",
                "AT+HTTPINIT",
                "AT+HTTPPARA=\"URL\",\"http://example.com/post\"",
                "AT+HTTPPARA=\"CONTENT\",\"application/json\"",
                "AT+HTTPDATA=7,10",
                "{\"n\":1}AT+HTTPACTION=1",
                "AT+HTTPTERM",
            ]
        );
    }

    #[test]
    fn http_body_larger_than_buffer_is_cut() {
        let mut modem = online(
            Board::LilygoTA7670,
            "A7670E-LASE",
            &[
                b"\r\nOK\r\n",
                b"\r\nOK\r\n",
                b"\r\nOK\r\n",
                b"\r\nOK\r\n\r\n+HTTPACTION: 0,200,1000\r\n",
                b"\r\nOK\r\n\r\n+HTTPREAD: 4\r\nabcd\r\n+HTTPREAD: 0\r\n",
                b"\r\nOK\r\n",
            ],
        );
        let mut body = [0u8; 4];
        let response = modem.http_get("http://example.com", &mut body).unwrap();
        assert!(response.is_truncated());
        assert_eq!(&body, b"abcd");
    }

    #[test]
    fn failed_http_action_still_terminates() {
        let mut modem = online(
            Board::LilygoTA7670,
            "A7670E-LASE",
            &[
                b"\r\nOK\r\n",
                b"\r\nOK\r\n",
                b"\r\nOK\r\n",
                b"\r\n+CME ERROR: 4\r\n",
                b"\r\nOK\r\n",
            ],
        );
        let mut body = [0u8; 4];
        assert_eq!(
            modem.http_get("http://example.com", &mut body),
            Err(Error::CommandFailed(ModemError::Cme(4)))
        );
        assert_eq!(commands_after_init(modem).last().map(|c| c.as_str()), Some("AT+HTTPTERM"));
    }

    #[test]
    fn payload_after_prompt() {
        let mut modem = online(
            Board::LilygoTA7670,
            "A7670E-LASE",
            &[b"\r\n>", b"\r\nOK\r\n"],
        );
        let response = modem.send_data("AT+CMQTTPAYLOAD=0,5", b"hello").unwrap();
        assert!(response.is_success());
        assert_eq!(
            commands_after_init(modem),
            ["AT+CMQTTPAYLOAD=0,5", "hello"]
        );
    }

    #[test]
    fn reset_reconnects() {
        let mut modem = online(Board::LilygoTA7670, "A7670E-LASE", &[b"AT\r\r\nOK\r\n"]);
        modem.reset().unwrap();
        assert_eq!(modem.power_state(), PowerState::Online);
        assert_eq!(commands_after_init(modem), ["AT"]);
    }

    #[test]
    fn reset_of_silent_modem() {
        let mut modem = online(Board::LilygoTA7670, "A7670E-LASE", &[]);
        assert_eq!(modem.reset(), Err(Error::PowerHandshakeTimeout));
        assert_eq!(modem.power_state(), PowerState::Off);
        assert_eq!(modem.signal_quality(), Err(Error::Uninitialized));
    }

    #[test]
    fn power_off_after_init() {
        let mut modem = online(Board::LilygoTA7670, "A7670E-LASE", &[b"\r\nOK\r\n"]);
        modem.power_off().unwrap();
        assert_eq!(modem.power_state(), PowerState::Off);
        assert_eq!(commands_after_init(modem), ["AT+CPOF"]);
    }
}
