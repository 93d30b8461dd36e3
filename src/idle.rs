//! Bus idle detection.
//!
//! Before claiming the bus the transmitter listens until the line has been
//! continuously idle (high) for [`TimingConfig::line_ready_us`]. The wait is
//! bounded by [`TimingConfig::loop_timeout_us`]: when it runs out the driver
//! transmits anyway, so a stuck or chatty bus can never hang it.
//!
//! [`BusIdleDetector::poll`] is called once per timer expiry while the line is
//! in input mode. It keeps two timestamps for the current detection episode:
//! - `clean_start`: when the line was last seen busy (or the episode began)
//! - `timeout_start`: when the episode began

use crate::timer::TimingConfig;

/// Outcome of one idle poll.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum IdlePoll {
    /// Not idle long enough yet; poll again after [`TimingConfig::loop_delay`].
    Waiting,
    /// The line stayed idle for the full line-ready time.
    Idle,
    /// The overall wait ran out before the line was confirmed idle.
    TimedOut,
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
struct Episode {
    clean_start: u32,
    timeout_start: u32,
}

/// Tracks one idle-detection episode across timer expiries.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct BusIdleDetector {
    episode: Option<Episode>,
}

impl BusIdleDetector {
    /// Creates a detector with no episode in progress.
    pub const fn new() -> Self {
        Self { episode: None }
    }

    /// Forgets the current episode; the next poll starts a new one.
    pub fn reset(&mut self) {
        self.episode = None;
    }

    /// `true` while an episode is in progress.
    pub fn is_waiting(&self) -> bool {
        self.episode.is_some()
    }

    /// Samples the bus once.
    ///
    /// # Arguments
    /// - `now_us`: the current time from [`OneShotTimer::now_micros`](crate::timer::OneShotTimer::now_micros)
    /// - `line_idle`: whether the line currently reads idle (high)
    /// - `timing`: the thresholds to apply
    ///
    /// The episode ends on [`IdlePoll::Idle`] or [`IdlePoll::TimedOut`].
    pub fn poll(&mut self, now_us: u32, line_idle: bool, timing: &TimingConfig) -> IdlePoll {
        let episode = self.episode.get_or_insert(Episode {
            clean_start: now_us,
            timeout_start: now_us,
        });
        if !line_idle {
            episode.clean_start = now_us;
        }

        let result = if now_us.wrapping_sub(episode.clean_start) >= timing.line_ready_us {
            IdlePoll::Idle
        } else if now_us.wrapping_sub(episode.timeout_start) > timing.loop_timeout_us {
            IdlePoll::TimedOut
        } else {
            IdlePoll::Waiting
        };

        if result != IdlePoll::Waiting {
            self.reset();
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timing() -> TimingConfig {
        TimingConfig::from_ticks_per_micro(1)
    }

    /// Polls every 100 µs from `start` and returns the outcome and finishing time.
    fn run(detector: &mut BusIdleDetector, start: u32, idle_at: impl Fn(u32) -> bool) -> (IdlePoll, u32) {
        let timing = timing();
        let mut now = start;
        loop {
            match detector.poll(now, idle_at(now), &timing) {
                IdlePoll::Waiting => now = now.wrapping_add(100),
                done => return (done, now),
            }
        }
    }

    #[test]
    fn test_idle_line_is_confirmed_after_ready_time() {
        let mut detector = BusIdleDetector::new();
        assert_eq!(run(&mut detector, 0, |_| true), (IdlePoll::Idle, 3_000));
        assert!(!detector.is_waiting());
    }

    #[test]
    fn test_busy_sample_restarts_clean_period() {
        let mut detector = BusIdleDetector::new();
        let result = run(&mut detector, 0, |now| now > 500);
        assert_eq!(result, (IdlePoll::Idle, 3_500));
    }

    #[test]
    fn test_never_idle_times_out() {
        let mut detector = BusIdleDetector::new();
        let result = run(&mut detector, 0, |_| false);
        assert_eq!(result, (IdlePoll::TimedOut, 10_100));
        assert!(!detector.is_waiting());
    }

    #[test]
    fn test_clock_wraparound() {
        let mut detector = BusIdleDetector::new();
        let start = u32::MAX - 1_000;
        let (result, end) = run(&mut detector, start, |_| true);
        assert_eq!(result, IdlePoll::Idle);
        assert_eq!(end, start.wrapping_add(3_000));
    }

    #[test]
    fn test_new_episode_after_completion() {
        let mut detector = BusIdleDetector::new();
        assert_eq!(run(&mut detector, 0, |_| false).0, IdlePoll::TimedOut);
        // A fresh episode must not inherit the expired timeout start
        assert_eq!(
            detector.poll(20_000, true, &timing()),
            IdlePoll::Waiting
        );
    }
}
