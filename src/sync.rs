//! Sync pulse generation.
//!
//! A transmission starts by pulling the line low for
//! [`TimingConfig::mark_sync`] (claiming the bus and telling receivers a
//! command follows), then releasing it high for
//! [`TimingConfig::mark_delimiter`]. Each half consumes one timer expiry.

use embedded_hal::digital::PinState;

use crate::encoding::Pulse;
use crate::timer::TimingConfig;

/// Which half of the sync sequence runs next.
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum SyncStep {
    /// Pull the line low for the sync mark.
    #[default]
    Claim,
    /// Release the line high for the delimiter.
    Release,
}

/// Produces the pulse for `step` and the step that follows it.
///
/// Returns `None` as the follow-up once the release has been emitted; the
/// sync sequence is then complete and encoding starts on the next expiry.
pub fn sync_step(step: SyncStep, timing: &TimingConfig) -> (Pulse, Option<SyncStep>) {
    match step {
        SyncStep::Claim => (
            Pulse::new(PinState::Low, timing.mark_sync),
            Some(SyncStep::Release),
        ),
        SyncStep::Release => (Pulse::new(PinState::High, timing.mark_delimiter), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_is_low_mark_then_delimiter() {
        let timing = TimingConfig::from_ticks_per_micro(2);

        let (claim, next) = sync_step(SyncStep::Claim, &timing);
        assert_eq!(claim, Pulse::new(PinState::Low, 4_800));
        assert_eq!(next, Some(SyncStep::Release));

        let (release, next) = sync_step(SyncStep::Release, &timing);
        assert_eq!(release, Pulse::new(PinState::High, 1_200));
        assert_eq!(next, None);
    }
}
