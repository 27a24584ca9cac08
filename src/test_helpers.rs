//! Host-side doubles for the serial port, control pins and delay.

extern crate std;

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::vec::Vec;

use embassy_time::Duration;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{self, OutputPin, PinState};
use embedded_io::{ErrorKind, ErrorType, Read, ReadReady, Write};

use crate::config::Signal;

/// Scripted serial port.
///
/// Every completed command line written releases the next queued reply, as
/// does a data payload written without a line ending.
#[derive(Default)]
pub struct MockSerial {
    rx: VecDeque<u8>,
    replies: VecDeque<Vec<u8>>,
    written: Vec<u8>,
    fail_writes: bool,
}

impl MockSerial {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the reply to the next command. An empty reply never answers.
    pub fn reply(&mut self, bytes: &[u8]) -> &mut Self {
        self.replies.push_back(bytes.to_vec());
        self
    }

    /// Bytes readable before any command is sent.
    pub fn pending(&mut self, bytes: &[u8]) -> &mut Self {
        self.rx.extend(bytes);
        self
    }

    pub fn fail_writes(&mut self) -> &mut Self {
        self.fail_writes = true;
        self
    }

    pub fn written(&self) -> &[u8] {
        &self.written
    }

    /// Written bytes split into command lines.
    pub fn commands(&self) -> Vec<&str> {
        std::str::from_utf8(&self.written)
            .unwrap()
            .split("\r\n")
            .filter(|l| !l.is_empty())
            .collect()
    }

    fn release_reply(&mut self) {
        if let Some(reply) = self.replies.pop_front() {
            self.rx.extend(reply);
        }
    }
}

impl ErrorType for MockSerial {
    type Error = ErrorKind;
}

impl Read for MockSerial {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let n = buf.len().min(self.rx.len());
        for (dst, src) in buf.iter_mut().zip(self.rx.drain(..n)) {
            *dst = src;
        }
        Ok(n)
    }
}

impl ReadReady for MockSerial {
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.rx.is_empty())
    }
}

impl Write for MockSerial {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        if self.fail_writes {
            return Err(ErrorKind::BrokenPipe);
        }
        for &b in buf {
            self.written.push(b);
            if b == b'\n' {
                self.release_reply();
            }
        }
        if buf.last().map_or(false, |&b| b != b'\n') {
            self.release_reply();
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Virtual time, advanced only by [`MockDelay`].
#[derive(Clone, Default)]
pub struct Clock(Rc<Cell<Duration>>);

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.0.get()
    }

    fn advance(&self, by: Duration) {
        self.0.set(self.0.get() + by);
    }
}

pub struct MockDelay {
    clock: Clock,
}

impl MockDelay {
    pub fn new(clock: &Clock) -> Self {
        Self {
            clock: clock.clone(),
        }
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.clock.advance(Duration::from_nanos(ns as u64));
    }

    fn delay_us(&mut self, us: u32) {
        self.clock.advance(Duration::from_micros(us as u64));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.clock.advance(Duration::from_millis(ms as u64));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinEvent {
    pub signal: Signal,
    pub state: PinState,
    pub at: Duration,
}

pub type PinLog = Rc<RefCell<Vec<PinEvent>>>;

#[derive(Debug)]
pub struct MockPinError;

impl digital::Error for MockPinError {
    fn kind(&self) -> digital::ErrorKind {
        digital::ErrorKind::Other
    }
}

/// Output pin recording every level change with its virtual timestamp.
pub struct MockPin {
    signal: Signal,
    clock: Clock,
    log: PinLog,
    broken: bool,
}

impl MockPin {
    pub fn new(signal: Signal, clock: &Clock, log: &PinLog) -> Self {
        Self {
            signal,
            clock: clock.clone(),
            log: log.clone(),
            broken: false,
        }
    }

    pub fn broken(mut self) -> Self {
        self.broken = true;
        self
    }

    fn record(&mut self, state: PinState) -> Result<(), MockPinError> {
        if self.broken {
            return Err(MockPinError);
        }
        self.log.borrow_mut().push(PinEvent {
            signal: self.signal,
            state,
            at: self.clock.now(),
        });
        Ok(())
    }
}

impl digital::ErrorType for MockPin {
    type Error = MockPinError;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.record(PinState::Low)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.record(PinState::High)
    }
}

/// Level changes of one signal, in order.
pub fn events_for(log: &PinLog, signal: Signal) -> Vec<PinEvent> {
    log.borrow()
        .iter()
        .filter(|e| e.signal == signal)
        .copied()
        .collect()
}
