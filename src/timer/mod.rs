//! Timer abstraction and pulse timing for the S-Link driver.
//!
//! The transmitter never blocks: every wait is expressed by arming a
//! single-shot hardware timer and returning. When the timer expires the
//! platform calls [`SlinkDriver::on_timer_expired`](crate::driver::SlinkDriver::on_timer_expired),
//! which performs one step and arms the timer again. Two ways of wiring this up
//! are provided: an interrupt service routine using `critical_section::with`
//! (`timer-isr` feature), or a blocking delay loop (`delay-loop` feature).
//!
//! Contains:
//! - [`OneShotTimer`]: the capability the driver needs from the hardware timer
//! - [`TimingConfig`]: all pulse widths converted to timer ticks
//! - `compute_ticks` / `const_ticks`: microsecond to tick converters
//! - `global_slink_timer_expired` and `slink_timer_expired!()`: interrupt-based
//!   callback wrappers (feature `timer-isr`)
//! - `DelayTimer` and `run_until_done`: blocking runner (feature `delay-loop`)
//!
//! Common ESP8266 `timer1` dividers at 80 MHz:
//!
//! | DIVIDER | TICKS / µs | Longest pulse |
//! |---------|------------|---------------|
//! |       1 |         80 |       104 ms  |
//! |      16 |          5 |       1.67 s  |
//! |     256 |     0.3125 |       26.8 s  |

use libm::round;

use crate::consts::{
    ESP8266_MAX_TIMER_COUNT, ESP8266_TICKS_PER_MICRO, SLINK_LINE_READY_US, SLINK_LOOP_DELAY_US,
    SLINK_LOOP_TIMEOUT_US, SLINK_MARK_DELIMITER_US, SLINK_MARK_ONE_US, SLINK_MARK_SYNC_US,
    SLINK_MARK_ZERO_US,
};
use crate::error::SlinkError;

#[cfg(feature = "delay-loop")]
mod delay;
#[cfg_attr(feature = "delay-loop", allow(unused_imports))]
#[cfg(feature = "delay-loop")]
pub use delay::*;

#[cfg(feature = "timer-isr")]
mod isr;
#[cfg_attr(feature = "timer-isr", allow(unused_imports))]
#[cfg(feature = "timer-isr")]
pub use isr::*;

#[cfg(feature = "timer-isr")]
mod macros;
#[cfg_attr(feature = "timer-isr", allow(unused_imports))]
#[cfg(feature = "timer-isr")]
pub use macros::*;

/// 1,000,000 microseconds = 1 second
pub const MICROSECONDS_PER_SECOND: u32 = 1_000_000;

/// A single-shot countdown timer with a free-running microsecond clock.
///
/// Implementations arm the hardware so that the timer interrupt fires once,
/// `ticks` timer ticks from now. The interrupt handler must then call
/// [`SlinkDriver::on_timer_expired`](crate::driver::SlinkDriver::on_timer_expired).
pub trait OneShotTimer {
    /// Largest count [`arm`](OneShotTimer::arm) accepts.
    const MAX_TICKS: u32;

    /// Arms the timer to expire once after `ticks` ticks.
    ///
    /// Re-arming replaces any pending expiry. `ticks` is always within
    /// `1..=MAX_TICKS`; the driver checks before calling.
    fn arm(&mut self, ticks: u32);

    /// Cancels any pending expiry.
    fn disable(&mut self);

    /// Current time in microseconds. Allowed to wrap.
    fn now_micros(&self) -> u32;
}

/// Pulse widths and idle-detection limits used by the driver.
///
/// Pulse widths are in timer ticks since they are loaded into the timer
/// directly. The idle-detection limits are compared against
/// [`OneShotTimer::now_micros`] and stay in microseconds.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct TimingConfig {
    /// Low sync pulse claiming the bus
    pub mark_sync: u32,
    /// Low pulse encoding a `1`
    pub mark_one: u32,
    /// Low pulse encoding a `0`
    pub mark_zero: u32,
    /// High gap after the sync pulse and after every bit
    pub mark_delimiter: u32,
    /// Delay between idle polls
    pub loop_delay: u32,
    /// Continuous idle time required before claiming the bus, in µs
    pub line_ready_us: u32,
    /// Longest idle wait before transmitting anyway, in µs
    pub loop_timeout_us: u32,
}

impl TimingConfig {
    /// Builds the default S-Link timing for a timer running at a whole number
    /// of ticks per microsecond.
    pub const fn from_ticks_per_micro(ticks_per_us: u32) -> Self {
        Self {
            mark_sync: SLINK_MARK_SYNC_US * ticks_per_us,
            mark_one: SLINK_MARK_ONE_US * ticks_per_us,
            mark_zero: SLINK_MARK_ZERO_US * ticks_per_us,
            mark_delimiter: SLINK_MARK_DELIMITER_US * ticks_per_us,
            loop_delay: SLINK_LOOP_DELAY_US * ticks_per_us,
            line_ready_us: SLINK_LINE_READY_US,
            loop_timeout_us: SLINK_LOOP_TIMEOUT_US,
        }
    }

    /// Builds the default S-Link timing for an arbitrary timer clock.
    ///
    /// # Arguments
    /// - `f_timer`: timer input clock in Hz
    /// - `prescaler`: timer divider (e.g., 1, 16, 256)
    pub fn from_timer_clock(f_timer: u32, prescaler: u32) -> Self {
        Self {
            mark_sync: compute_ticks(f_timer, prescaler, SLINK_MARK_SYNC_US),
            mark_one: compute_ticks(f_timer, prescaler, SLINK_MARK_ONE_US),
            mark_zero: compute_ticks(f_timer, prescaler, SLINK_MARK_ZERO_US),
            mark_delimiter: compute_ticks(f_timer, prescaler, SLINK_MARK_DELIMITER_US),
            loop_delay: compute_ticks(f_timer, prescaler, SLINK_LOOP_DELAY_US),
            line_ready_us: SLINK_LINE_READY_US,
            loop_timeout_us: SLINK_LOOP_TIMEOUT_US,
        }
    }

    /// Width of the low pulse carrying `bit`.
    pub const fn mark_for(&self, bit: bool) -> u32 {
        if bit { self.mark_one } else { self.mark_zero }
    }

    /// Checks every duration against the limits of a timer.
    ///
    /// Called by [`SlinkDriver::new`](crate::driver::SlinkDriver::new) so that a
    /// bad configuration fails at startup instead of stalling a transmission.
    pub fn validate<E>(&self, max_ticks: u32) -> Result<(), SlinkError<E>> {
        for ticks in [
            self.mark_sync,
            self.mark_one,
            self.mark_zero,
            self.mark_delimiter,
            self.loop_delay,
        ] {
            check_ticks(ticks, max_ticks)?;
        }
        if self.loop_timeout_us < self.line_ready_us {
            return Err(SlinkError::LoopTimeoutTooShort {
                timeout_us: self.loop_timeout_us,
                ready_us: self.line_ready_us,
            });
        }
        Ok(())
    }
}

impl Default for TimingConfig {
    /// ESP8266 `timer1` at 80 MHz with `TIM_DIV1`.
    fn default() -> Self {
        Self::from_ticks_per_micro(ESP8266_TICKS_PER_MICRO)
    }
}

/// Rejects a duration the timer cannot be loaded with.
pub(crate) fn check_ticks<E>(ticks: u32, max_ticks: u32) -> Result<(), SlinkError<E>> {
    if ticks == 0 || ticks > max_ticks {
        Err(SlinkError::DurationOutOfRange {
            ticks,
            max: max_ticks,
        })
    } else {
        Ok(())
    }
}

/// Computes the timer count for a duration
///
/// # Arguments
/// - `f_timer`: timer input clock in Hz
/// - `prescaler`: timer divider (e.g., 1, 16, 256)
/// - `micros`: desired duration in microseconds
///
/// # Returns
/// - Number of timer ticks (rounds to nearest integer)
pub fn compute_ticks(f_timer: u32, prescaler: u32, micros: u32) -> u32 {
    let ticks_per_second = f_timer as f64 / prescaler as f64;
    let ticks = ticks_per_second * micros as f64 / MICROSECONDS_PER_SECOND as f64;
    round(ticks) as u32
}

/// Compile-time timer count calculator
///
/// # Arguments
/// - `f_timer`: timer input clock in Hz
/// - `prescaler`: timer divider (e.g., 1, 16, 256)
/// - `micros`: desired duration in microseconds
///
/// # Returns
/// - Number of timer ticks (truncated)
pub const fn const_ticks(f_timer: u32, prescaler: u32, micros: u32) -> u32 {
    ((f_timer / prescaler) as u64 * micros as u64 / MICROSECONDS_PER_SECOND as u64) as u32
}

/// Checks a [`TimingConfig`] against the ESP8266 `timer1` limit.
pub fn validate_esp8266<E>(timing: &TimingConfig) -> Result<(), SlinkError<E>> {
    timing.validate(ESP8266_MAX_TIMER_COUNT)
}
