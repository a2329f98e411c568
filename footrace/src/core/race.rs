use serde::Deserialize;
use std::time::{Duration, Instant};

pub const DEFAULT_RUNNER_COUNT: u32 = 10;
pub const DEFAULT_RACE_LENGTH: f64 = 100.0;
pub const DEFAULT_POLL_INTERVAL: f64 = 1.0;

/// * `runner_count` - Number of runners taking part in the race
/// * `race_length` - (m) Distance between the start and the finish line
/// * `poll_interval` - (s) Race time between two position polls of the coordinator
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct RaceConfig {
    pub runner_count: u32,
    pub race_length: f64,
    pub poll_interval: f64,
}

impl Default for RaceConfig {
    fn default() -> Self {
        RaceConfig {
            runner_count: DEFAULT_RUNNER_COUNT,
            race_length: DEFAULT_RACE_LENGTH,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl RaceConfig {
    /// get_timer_interval returns the wall-clock interval of the poll timer, i.e. the poll interval
    /// shortened by the real-time factor.
    pub fn get_timer_interval(&self, realtime_factor: f64) -> Duration {
        Duration::from_secs_f64(self.poll_interval / realtime_factor)
    }
}

/// RaceClock converts wall-clock instants into race time. With a real-time factor of 2.0, one
/// second of wall-clock time equals two seconds of race time.
#[derive(Debug, Clone, Copy)]
pub struct RaceClock {
    start: Instant,
    realtime_factor: f64,
}

impl RaceClock {
    pub fn new(start: Instant, realtime_factor: f64) -> RaceClock {
        RaceClock {
            start,
            realtime_factor,
        }
    }

    pub fn get_start(&self) -> Instant {
        self.start
    }

    /// elapsed_racetime returns the race time in seconds that passed between the race start and
    /// now (0.0 for instants before the start).
    pub fn elapsed_racetime(&self, now: Instant) -> f64 {
        now.saturating_duration_since(self.start).as_secs_f64() * self.realtime_factor
    }
}
