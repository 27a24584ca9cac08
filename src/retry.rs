use embassy_time::Duration;
use embedded_hal::delay::DelayNs;

use crate::error::Error;
use crate::transport::{Response, ResponseTag};

/// Pause between two attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Backoff {
    Fixed(Duration),
    /// Doubles after every failed attempt, up to `max`
    Exponential { initial: Duration, max: Duration },
}

impl Backoff {
    /// Pause after the `failures`-th failed attempt, counting from 1.
    pub fn after(&self, failures: u8) -> Duration {
        match *self {
            Self::Fixed(d) => d,
            Self::Exponential { initial, max } => {
                let shift = u32::from(failures.saturating_sub(1)).min(31);
                let ticks = initial.as_ticks().saturating_mul(1u64 << shift);
                Duration::from_ticks(ticks).min(max)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RetryPolicy {
    /// Total number of attempts, including the first. Zero behaves as one.
    pub max_attempts: u8,
    pub backoff: Backoff,
}

impl RetryPolicy {
    pub const fn new(max_attempts: u8, backoff: Backoff) -> Self {
        Self {
            max_attempts,
            backoff,
        }
    }

    pub const fn fixed(max_attempts: u8, interval: Duration) -> Self {
        Self::new(max_attempts, Backoff::Fixed(interval))
    }

    /// Run `op` until it returns a successful response.
    ///
    /// `TimedOut` and `Failed` responses are retried. A `DecodeError`
    /// response or an `Err` is returned straight away. When every attempt
    /// fails the last response is returned tagged
    /// [`ResponseTag::Exhausted`].
    pub fn run<const N: usize, D, F>(&self, delay: &mut D, mut op: F) -> Result<Response<N>, Error>
    where
        D: DelayNs,
        F: FnMut() -> Result<Response<N>, Error>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            let response = op()?;
            match response.tag() {
                ResponseTag::Success => return Ok(response.with_attempts(attempt)),
                ResponseTag::DecodeError | ResponseTag::Exhausted => {
                    return Ok(response.with_attempts(attempt))
                }
                ResponseTag::TimedOut | ResponseTag::Failed => {}
            }

            if attempt >= max_attempts {
                warn!("Giving up after {} attempts", attempt);
                return Ok(response.exhausted(attempt));
            }

            let pause = self.backoff.after(attempt);
            debug!(
                "Attempt {}/{} ended {:?}, retrying in {} ms",
                attempt,
                max_attempts,
                response.tag(),
                pause.as_millis()
            );
            pause_for(delay, pause);
            attempt += 1;
        }
    }
}

/// Run `op` under a policy of `max_attempts` with `backoff`.
pub fn with_retry<const N: usize, D, F>(
    delay: &mut D,
    max_attempts: u8,
    backoff: Backoff,
    op: F,
) -> Result<Response<N>, Error>
where
    D: DelayNs,
    F: FnMut() -> Result<Response<N>, Error>,
{
    RetryPolicy::new(max_attempts, backoff).run(delay, op)
}

pub(crate) fn pause_for<D: DelayNs>(delay: &mut D, duration: Duration) {
    let us = duration.as_micros();
    delay.delay_us(u32::try_from(us).unwrap_or(u32::MAX));
}
