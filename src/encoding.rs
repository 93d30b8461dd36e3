//! Pulse-width bit encoding for S-Link commands.
//!
//! Every bit is sent as a low "mark" whose width is the bit value, followed by
//! a fixed-width high delimiter:
//!
//! ```text
//!  sync        bit 7 (1)        bit 6 (0)
//! ‾‾|________|‾‾‾|____|‾‾‾|__|‾‾‾ ...
//!    2400 µs  600  1200 600 600 600
//! ```
//!
//! Fields go out in the order supplied, each most-significant bit first. A
//! command of `n` fields therefore emits exactly `8 * n` mark/delimiter pairs
//! after the sync pulse.
//!
//! ## Functions
//!
//! - [`encode_step`]: one encoder step, used by the driver on every timer expiry
//! - [`PulseTrain`]: the complete waveform of a command as an iterator, for
//!   pulse peripherals (e.g. RMT) or for inspection

use embedded_hal::digital::PinState;

use crate::command::{Command, PendingCommand};
use crate::sync::{SyncStep, sync_step};
use crate::timer::TimingConfig;

/// A level held on the line for a number of timer ticks.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct Pulse {
    /// Line level during the pulse
    pub level: PinState,
    /// Duration in timer ticks
    pub ticks: u32,
}

impl Pulse {
    /// Creates a pulse.
    pub const fn new(level: PinState, ticks: u32) -> Self {
        Self { level, ticks }
    }
}

/// Which half of a bit runs next.
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum BitPhase {
    /// Pull the line low for the width encoding the current bit.
    #[default]
    Value,
    /// Release the line high for the delimiter, then move to the next bit.
    Delimiter,
}

/// Performs one encoder step.
///
/// Returns the pulse to emit and the phase to run on the next expiry, or
/// `None` once every field has been sent. In that case the bit cursor is
/// rewound so the command is left in a clean state.
pub fn encode_step(
    command: &mut PendingCommand,
    phase: BitPhase,
    timing: &TimingConfig,
) -> Option<(Pulse, BitPhase)> {
    let Some(bit) = command.current_bit() else {
        command.rewind_bit();
        return None;
    };
    match phase {
        BitPhase::Value => Some((
            Pulse::new(PinState::Low, timing.mark_for(bit)),
            BitPhase::Delimiter,
        )),
        BitPhase::Delimiter => {
            command.advance();
            Some((
                Pulse::new(PinState::High, timing.mark_delimiter),
                BitPhase::Value,
            ))
        }
    }
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
enum TrainStep {
    Sync(SyncStep),
    Encode(BitPhase),
    Finished,
}

/// Iterator over every pulse of a command, sync pulse included.
///
/// Yields the same sequence the driver puts on the wire.
///
/// ```rust
/// use slink::command::Command;
/// use slink::encoding::PulseTrain;
/// use slink::timer::TimingConfig;
///
/// let command = Command::new(0x90, 0x2E, None, None).unwrap();
/// let timing = TimingConfig::from_ticks_per_micro(1);
/// assert_eq!(PulseTrain::new(&command, &timing).count(), 2 + 2 * 16);
/// ```
#[derive(Clone, Debug)]
pub struct PulseTrain {
    command: PendingCommand,
    timing: TimingConfig,
    step: TrainStep,
}

impl PulseTrain {
    /// Creates the pulse train for `command`.
    pub fn new(command: &Command, timing: &TimingConfig) -> Self {
        let mut pending = PendingCommand::default();
        pending.load(command);
        Self {
            command: pending,
            timing: *timing,
            step: TrainStep::Sync(SyncStep::Claim),
        }
    }

    /// Total time of the train in timer ticks.
    pub fn total_ticks(self) -> u64 {
        self.map(|pulse| pulse.ticks as u64).sum()
    }
}

impl Iterator for PulseTrain {
    type Item = Pulse;

    fn next(&mut self) -> Option<Pulse> {
        match self.step {
            TrainStep::Sync(step) => {
                let (pulse, next) = sync_step(step, &self.timing);
                self.step = match next {
                    Some(next) => TrainStep::Sync(next),
                    None => TrainStep::Encode(BitPhase::Value),
                };
                Some(pulse)
            }
            TrainStep::Encode(phase) => match encode_step(&mut self.command, phase, &self.timing) {
                Some((pulse, next)) => {
                    self.step = TrainStep::Encode(next);
                    Some(pulse)
                }
                None => {
                    self.step = TrainStep::Finished;
                    None
                }
            },
            TrainStep::Finished => None,
        }
    }
}
