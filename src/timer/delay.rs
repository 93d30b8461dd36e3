use crate::driver::SlinkDriver;
use crate::error::SlinkError;
use crate::line::BusLine;
use crate::timer::OneShotTimer;
use embedded_hal::delay::DelayNs;

/// A [`OneShotTimer`] backed by a blocking delay instead of an interrupt.
///
/// Arming only records the countdown; [`run_until_done`] then sleeps for it and
/// calls the driver, so the whole transmission runs on the caller's stack.
/// The microsecond clock is the sum of all delays waited so far.
///
/// Durations are in microseconds (one tick per µs), so pair it with
/// `TimingConfig::from_ticks_per_micro(1)`.
#[derive(Debug)]
pub struct DelayTimer<D> {
    delay: D,
    armed: Option<u32>,
    elapsed_us: u32,
}

impl<D: DelayNs> DelayTimer<D> {
    /// Wraps a delay provider.
    pub fn new(delay: D) -> Self {
        Self {
            delay,
            armed: None,
            elapsed_us: 0,
        }
    }

    /// Waits out the armed countdown, if any.
    ///
    /// Returns `true` if a countdown expired and the driver must be called.
    pub fn wait(&mut self) -> bool {
        match self.armed.take() {
            Some(us) => {
                self.delay.delay_us(us);
                self.elapsed_us = self.elapsed_us.wrapping_add(us);
                true
            }
            None => false,
        }
    }
}

impl<D: DelayNs> OneShotTimer for DelayTimer<D> {
    const MAX_TICKS: u32 = u32::MAX;

    fn arm(&mut self, ticks: u32) {
        self.armed = Some(ticks);
    }

    fn disable(&mut self) {
        self.armed = None;
    }

    fn now_micros(&self) -> u32 {
        self.elapsed_us
    }
}

/// Sends `driver`'s in-flight command to completion by blocking on its delay.
///
/// This is a simple timing loop for use in environments where interrupts are
/// unavailable or undesired. Call it right after
/// [`SlinkDriver::send`](crate::driver::SlinkDriver::send).
///
/// # Example
/// ```rust
/// use embedded_hal_mock::eh1::delay::NoopDelay;
/// use embedded_hal_mock::eh1::digital::{Mock, State, Transaction};
/// use slink::line::OpenDrainLine;
/// use slink::timer::{DelayTimer, TimingConfig, run_until_done};
/// use slink::driver::SlinkDriver;
///
/// # let mut expectations = vec![Transaction::set(State::High)];
/// # expectations.extend(std::iter::repeat(Transaction::get(State::High)).take(31));
/// # expectations.push(Transaction::set(State::Low));
/// # expectations.push(Transaction::set(State::High));
/// # for _ in 0..16 {
/// #     expectations.push(Transaction::set(State::Low));
/// #     expectations.push(Transaction::set(State::High));
/// # }
/// # expectations.push(Transaction::set(State::High));
/// # expectations.push(Transaction::set(State::High));
/// # let pin = Mock::new(&expectations);
/// let line = OpenDrainLine::new(pin);
/// let timer = DelayTimer::new(NoopDelay::new());
/// let mut driver = SlinkDriver::new(line, timer, TimingConfig::from_ticks_per_micro(1)).unwrap();
///
/// driver.send_command(0x90, 0x2E, None, None).unwrap();
/// run_until_done(&mut driver).unwrap();
/// assert_eq!(driver.tx_good, 1);
/// # driver.line.release().done();
/// ```
///
/// # Notes
/// - Errors abort the transmission and are returned immediately.
pub fn run_until_done<L, D>(
    driver: &mut SlinkDriver<L, DelayTimer<D>>,
) -> Result<(), SlinkError<L::Error>>
where
    L: BusLine,
    D: DelayNs,
{
    while driver.timer.wait() {
        driver.on_timer_expired()?;
    }
    Ok(())
}
