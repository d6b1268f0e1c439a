//! Simulation timeline
//!
//! Discretizes wall-clock time into ticks of fixed duration. The start
//! instant is rounded down to a multiple of the step duration so equal
//! simulations started within one step of each other hit the same weather
//! cache slots upstream.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

#[derive(Debug, Clone, Copy)]
pub struct Timeline {
    start: SystemTime,
    step_duration: Duration,
    limit_ticks: u32,
}

impl Timeline {
    /// # Panics
    ///
    /// Panics when `step_duration` is shorter than one second; the timeline
    /// discretizes at whole-second granularity.
    pub fn new(start: SystemTime, step_duration: Duration, limit_duration: Duration) -> Self {
        assert!(
            step_duration.as_secs() > 0,
            "step duration must be at least one second"
        );
        Timeline {
            start: Self::round_start(start, step_duration),
            step_duration,
            limit_ticks: (limit_duration.as_secs() / step_duration.as_secs()) as u32,
        }
    }

    fn round_start(start: SystemTime, step_duration: Duration) -> SystemTime {
        let epoch_seconds = start
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_secs();
        let step_seconds = step_duration.as_secs();
        UNIX_EPOCH + Duration::from_secs(epoch_seconds / step_seconds * step_seconds)
    }

    pub fn start(&self) -> SystemTime {
        self.start
    }

    pub fn step_duration(&self) -> Duration {
        self.step_duration
    }

    /// Maximum number of ticks the simulation may advance past the seed
    /// step.
    pub fn limit_ticks(&self) -> u32 {
        self.limit_ticks
    }

    /// Wall-clock instant a given tick simulates.
    pub fn tick_time(&self, tick: u32) -> SystemTime {
        self.start + self.step_duration * tick
    }
}

impl Serialize for Timeline {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let start_ms = self
            .start
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_millis() as u64;
        let mut state = serializer.serialize_struct("Timeline", 3)?;
        state.serialize_field("startDateMs", &start_ms)?;
        state.serialize_field("stepDurationMs", &(self.step_duration.as_millis() as u64))?;
        state.serialize_field("limitTicks", &self.limit_ticks)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_rounds_down_to_step_duration() {
        let step = Duration::from_secs(1800);
        let start = UNIX_EPOCH + Duration::from_secs(1800 * 1000 + 1234);
        let timeline = Timeline::new(start, step, Duration::from_secs(3600));
        assert_eq!(timeline.start(), UNIX_EPOCH + Duration::from_secs(1800 * 1000));
    }

    #[test]
    fn test_limit_ticks_truncates() {
        let step = Duration::from_secs(1800);
        let four_hours = Duration::from_secs(4 * 3600);
        assert_eq!(Timeline::new(UNIX_EPOCH, step, four_hours).limit_ticks(), 8);
        // 4h29m still fits only eight whole steps.
        let longer = four_hours + Duration::from_secs(29 * 60);
        assert_eq!(Timeline::new(UNIX_EPOCH, step, longer).limit_ticks(), 8);
    }

    #[test]
    #[should_panic(expected = "step duration must be at least one second")]
    fn test_sub_second_step_duration_is_rejected() {
        Timeline::new(
            UNIX_EPOCH,
            Duration::from_millis(500),
            Duration::from_secs(3600),
        );
    }

    #[test]
    fn test_tick_time_advances_by_step() {
        let step = Duration::from_secs(1800);
        let timeline = Timeline::new(UNIX_EPOCH, step, Duration::from_secs(86_400));
        assert_eq!(timeline.tick_time(0), timeline.start());
        assert_eq!(timeline.tick_time(3), timeline.start() + step * 3);
    }
}
