use arena_core::Timestamp;
use arena_ports::Clock;
use chrono::{DurationRound, TimeDelta, Utc};

/// Wall clock used by live games
///
/// Readings are truncated to whole milliseconds, the resolution response
/// times and the idle sweep work in, so a stamped frame and the decision
/// measured against it always compare on the same grid.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let now = Utc::now();
        now.duration_trunc(TimeDelta::milliseconds(1)).unwrap_or(now)
    }

    fn name(&self) -> &str {
        "wall"
    }
}
