//! Interrupt-driven S-Link command transmitter.
//!
//! This module provides the [`SlinkDriver`] struct, the state machine that
//! sends one command over the Sony Control-A1 / S-Link single-wire bus without
//! ever blocking the caller.
//!
//! A transmission runs through four states:
//!
//! 1. [`TxState::LineCheck`]: listen until the bus has been idle long enough
//!    (or the idle wait times out)
//! 2. [`TxState::Sync`]: pull the line low for the sync mark, then release it
//! 3. [`TxState::Encode`]: send every bit as a low mark plus a high delimiter
//! 4. [`TxState::Done`]: release the line to input and disable the timer
//!
//! Every step ends by arming the single-shot timer. When it expires the
//! platform calls [`on_timer_expired()`](SlinkDriver::on_timer_expired),
//! which runs the next step. Only the very first step runs from the caller of
//! [`send()`](SlinkDriver::send).
//!
//! ## Example
//!
//! ```rust,ignore
//! use slink::driver::SlinkDriver;
//! use slink::timer::TimingConfig;
//!
//! let mut driver = SlinkDriver::new(line, timer1, TimingConfig::default())?;
//! driver.send_command(0x90, 0x2E, None, None)?; // CD player: play
//!
//! // in the timer interrupt
//! let _ = driver.on_timer_expired();
//! ```
//!
//! For sharing the driver with an interrupt handler, see [`crate::timer`].

use core::convert::Infallible;

use crate::command::{Command, PendingCommand};
use crate::encoding::{BitPhase, Pulse, encode_step};
use crate::error::SlinkError;
use crate::idle::{BusIdleDetector, IdlePoll};
use crate::line::{BusLine, LineMode};
use crate::sync::{SyncStep, sync_step};
use crate::timer::{OneShotTimer, TimingConfig, check_ticks};

/// Where the transmitter is in sending a command.
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum TxState {
    /// Nothing has been sent since the driver was created, or the last
    /// transmission was aborted by an error.
    #[default]
    Idle,
    /// Waiting for the bus to become idle. May repeat many times.
    LineCheck,
    /// Sending the sync pulse.
    Sync(SyncStep),
    /// Sending the command bits.
    Encode(BitPhase),
    /// The last command was sent in full. The line is an input and the timer is off.
    Done,
}

impl TxState {
    /// `true` while a command is in flight.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            TxState::LineCheck | TxState::Sync(_) | TxState::Encode(_)
        )
    }
}

/// An interrupt-driven transmitter for the S-Link control bus.
///
/// `SlinkDriver` owns the bus line and the single-shot timer used to time
/// every pulse. It holds at most one command at a time: sending while a
/// command is in flight is rejected with [`SlinkError::Busy`].
///
/// ## Type Parameters
///
/// - `L`: the bus line, see [`BusLine`]
/// - `T`: the single-shot timer, see [`OneShotTimer`]
///
/// ## Errors during transmission
///
/// A line error or an unloadable duration aborts the transmission: the line
/// is released to input, the timer is disabled, [`tx_failed`](SlinkDriver::tx_failed)
/// is incremented and the state returns to [`TxState::Idle`]. The error is
/// returned from the call that ran the failing step.
///
/// ## Notes
///
/// - Idle detection that times out is counted in
///   [`idle_timeouts`](SlinkDriver::idle_timeouts) and logged, but the command
///   is still sent.
/// - There is no way to cancel a transmission once started.
#[derive(Debug)]
pub struct SlinkDriver<L, T>
where
    L: BusLine,
    T: OneShotTimer,
{
    /// The bus line
    pub line: L,
    /// The single-shot timer
    pub timer: T,
    state: TxState,
    timing: TimingConfig,
    command: PendingCommand,
    idle: BusIdleDetector,
    line_mode: LineMode,

    /// Counter of commands sent in full.
    pub tx_good: u16,

    /// Counter of transmissions aborted by an error.
    pub tx_failed: u16,

    /// Counter of transmissions that started without the bus being confirmed idle.
    pub idle_timeouts: u16,
}

impl<L, T> SlinkDriver<L, T>
where
    L: BusLine,
    T: OneShotTimer,
{
    /// Creates a new `SlinkDriver` and puts the line into input (listening) mode.
    ///
    /// # Arguments
    /// - `line`: the bus line
    /// - `timer`: the single-shot timer whose interrupt calls
    ///   [`on_timer_expired()`](SlinkDriver::on_timer_expired)
    /// - `timing`: pulse widths in ticks of `timer`
    ///
    /// # Errors
    /// - [`SlinkError::DurationOutOfRange`] if a duration cannot be loaded into `timer`
    /// - [`SlinkError::LoopTimeoutTooShort`] if the idle wait could never succeed
    /// - [`SlinkError::Line`] if the line cannot be switched to input
    pub fn new(line: L, timer: T, timing: TimingConfig) -> Result<Self, SlinkError<L::Error>> {
        timing.validate(T::MAX_TICKS)?;
        let mut driver = Self {
            line,
            timer,
            state: TxState::Idle,
            timing,
            command: PendingCommand::default(),
            idle: BusIdleDetector::new(),
            line_mode: LineMode::Input,
            tx_good: 0,
            tx_failed: 0,
            idle_timeouts: 0,
        };
        driver.line.set_input().map_err(SlinkError::Line)?;
        Ok(driver)
    }

    /// The current transmission state.
    pub fn state(&self) -> TxState {
        self.state
    }

    /// The timing in use.
    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    /// The command being (or last) transmitted, with its cursors.
    pub fn pending(&self) -> &PendingCommand {
        &self.command
    }

    /// `true` while a command is in flight.
    pub fn is_busy(&self) -> bool {
        self.state.is_active()
    }

    /// Non-blocking completion check, usable with [`nb::block!`].
    pub fn wait_done(&self) -> nb::Result<(), Infallible> {
        if self.is_busy() {
            Err(nb::Error::WouldBlock)
        } else {
            Ok(())
        }
    }

    /// Sends a device id and up to three command ids.
    ///
    /// See [`send()`](SlinkDriver::send).
    pub fn send_command(
        &mut self,
        device_id: u8,
        command_id1: u8,
        command_id2: Option<u8>,
        command_id3: Option<u8>,
    ) -> Result<(), SlinkError<L::Error>> {
        let command = Command::new(device_id, command_id1, command_id2, command_id3)?;
        self.send(&command)
    }

    /// Sends a command whose optional ids use a negative value for "absent".
    ///
    /// See [`Command::from_raw()`] and [`send()`](SlinkDriver::send).
    pub fn send_raw(
        &mut self,
        device_id: u8,
        command_id1: u8,
        command_id2: i16,
        command_id3: i16,
    ) -> Result<(), SlinkError<L::Error>> {
        let command = Command::from_raw(device_id, command_id1, command_id2, command_id3)?;
        self.send(&command)
    }

    /// Starts transmitting `command`.
    ///
    /// Copies the command in, rewinds the cursors and runs the first idle
    /// poll synchronously. Everything after that happens in
    /// [`on_timer_expired()`](SlinkDriver::on_timer_expired).
    ///
    /// # Errors
    /// - [`SlinkError::Busy`] if a command is already in flight; it is left untouched
    /// - any error of the first step, see [`SlinkDriver`]
    pub fn send(&mut self, command: &Command) -> Result<(), SlinkError<L::Error>> {
        if self.is_busy() {
            return Err(SlinkError::Busy);
        }
        self.command.load(command);
        self.idle.reset();
        self.state = TxState::LineCheck;
        debug!("slink: sending {} fields", command.len());
        self.step()
    }

    /// Runs the next step of the transmission.
    ///
    /// Must be called from the timer interrupt each time the armed countdown
    /// expires. Calling it with nothing in flight does nothing.
    pub fn on_timer_expired(&mut self) -> Result<(), SlinkError<L::Error>> {
        self.step()
    }

    fn step(&mut self) -> Result<(), SlinkError<L::Error>> {
        let result = self.dispatch();
        if result.is_err() {
            self.abort();
        }
        result
    }

    /// Advances the state machine until a timer has been armed or the
    /// transmission is over.
    fn dispatch(&mut self) -> Result<(), SlinkError<L::Error>> {
        loop {
            match self.state {
                TxState::Idle | TxState::Done => return Ok(()),
                TxState::LineCheck => {
                    self.enter_mode(LineMode::Input)?;
                    let line_idle = self.line.is_high().map_err(SlinkError::Line)?;
                    match self
                        .idle
                        .poll(self.timer.now_micros(), line_idle, &self.timing)
                    {
                        IdlePoll::Waiting => return self.arm(self.timing.loop_delay),
                        IdlePoll::Idle => debug!("slink: line idle"),
                        IdlePoll::TimedOut => {
                            self.idle_timeouts = self.idle_timeouts.wrapping_add(1);
                            warn!(
                                "slink: line not idle after {} us, sending anyway",
                                self.timing.loop_timeout_us
                            );
                        }
                    }
                    self.state = TxState::Sync(SyncStep::Claim);
                }
                TxState::Sync(step) => {
                    self.enter_mode(LineMode::Output)?;
                    let (pulse, next) = sync_step(step, &self.timing);
                    self.state = match next {
                        Some(next) => TxState::Sync(next),
                        None => TxState::Encode(BitPhase::Value),
                    };
                    return self.emit(pulse);
                }
                TxState::Encode(phase) => {
                    self.enter_mode(LineMode::Output)?;
                    match encode_step(&mut self.command, phase, &self.timing) {
                        Some((pulse, next)) => {
                            self.state = TxState::Encode(next);
                            return self.emit(pulse);
                        }
                        None => {
                            self.line.set_high().map_err(SlinkError::Line)?;
                            return self.finish();
                        }
                    }
                }
            }
        }
    }

    fn finish(&mut self) -> Result<(), SlinkError<L::Error>> {
        self.enter_mode(LineMode::Input)?;
        self.timer.disable();
        self.idle.reset();
        self.state = TxState::Done;
        self.tx_good = self.tx_good.wrapping_add(1);
        debug!("slink: command sent");
        Ok(())
    }

    fn abort(&mut self) {
        self.timer.disable();
        if self.line.set_input().is_ok() {
            self.line_mode = LineMode::Input;
        }
        self.idle.reset();
        self.command.rewind_bit();
        self.state = TxState::Idle;
        self.tx_failed = self.tx_failed.wrapping_add(1);
        warn!("slink: transmission aborted");
    }

    fn emit(&mut self, pulse: Pulse) -> Result<(), SlinkError<L::Error>> {
        self.line.set_state(pulse.level).map_err(SlinkError::Line)?;
        self.arm(pulse.ticks)
    }

    fn arm(&mut self, ticks: u32) -> Result<(), SlinkError<L::Error>> {
        check_ticks(ticks, T::MAX_TICKS)?;
        self.timer.arm(ticks);
        Ok(())
    }

    fn enter_mode(&mut self, mode: LineMode) -> Result<(), SlinkError<L::Error>> {
        if self.line_mode != mode {
            self.line.set_mode(mode).map_err(SlinkError::Line)?;
            self.line_mode = mode;
        }
        Ok(())
    }
}
