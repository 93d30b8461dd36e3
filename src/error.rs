//! Error types returned by the transmitter.

use thiserror::Error;

/// Reasons a [`Command`](crate::command::Command) cannot be built.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum CommandError {
    /// A raw command id does not fit in a byte.
    #[error("command id {value} does not fit in a byte")]
    FieldOutOfRange {
        /// The rejected raw value
        value: i16,
    },
    /// The third command id was given without the second.
    #[error("third command id given without the second")]
    MissingField,
}

/// Errors reported by [`SlinkDriver`](crate::driver::SlinkDriver).
///
/// `E` is the error type of the bus line.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum SlinkError<E> {
    /// A pulse duration cannot be loaded into the timer.
    ///
    /// Durations must be non-zero and no larger than the timer's maximum count.
    #[error("duration of {ticks} ticks is outside 1..={max}")]
    DurationOutOfRange {
        /// Requested duration
        ticks: u32,
        /// Largest count the timer accepts
        max: u32,
    },
    /// The idle-wait timeout is shorter than the line-ready threshold, so the
    /// bus could never be confirmed idle.
    #[error("loop timeout of {timeout_us} us is shorter than the line-ready time of {ready_us} us")]
    LoopTimeoutTooShort {
        /// Configured loop timeout
        timeout_us: u32,
        /// Configured line-ready threshold
        ready_us: u32,
    },
    /// A command is already being transmitted.
    #[error("a command is already being transmitted")]
    Busy,
    /// The global driver has not been set up yet.
    #[error("driver has not been set up")]
    Uninitialized,
    /// The command could not be built.
    #[error(transparent)]
    Command(#[from] CommandError),
    /// Reading or driving the bus line failed.
    #[error("bus line error: {0:?}")]
    Line(E),
}
