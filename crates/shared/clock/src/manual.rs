use arena_core::Timestamp;
use arena_ports::Clock;
use chrono::{Duration, Utc};
use std::sync::{Arc, RwLock};

/// Clock frozen at a fixed instant, moved only by [`advance`](Self::advance)
/// or [`set_time`](Self::set_time).
///
/// Cloning shares the underlying time, so a test can keep a handle while the
/// engine owns another.
#[derive(Clone)]
pub struct ManualClock {
    current_time: Arc<RwLock<Timestamp>>,
}

impl ManualClock {
    pub fn new(initial_time: Timestamp) -> Self {
        Self {
            current_time: Arc::new(RwLock::new(initial_time)),
        }
    }

    /// Frozen at the current wall-clock time
    pub fn starting_now() -> Self {
        Self::new(Utc::now())
    }

    /// Move time forward by `duration`
    pub fn advance(&self, duration: Duration) {
        let mut current = self
            .current_time
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *current += duration;
    }

    /// Jump to an explicit instant
    pub fn set_time(&self, time: Timestamp) {
        let mut current = self
            .current_time
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *current = time;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self
            .current_time
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn name(&self) -> &str {
        "manual"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_manual_clock_is_frozen() {
        let clock = ManualClock::starting_now();
        let time1 = clock.now();
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert_eq!(clock.now(), time1);
    }

    #[test]
    fn test_advance_is_shared_between_clones() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let clock = ManualClock::new(start);
        let handle = clock.clone();

        handle.advance(Duration::minutes(30));

        assert_eq!(clock.now(), start + Duration::minutes(30));
    }

    #[test]
    fn test_set_time() {
        let clock = ManualClock::starting_now();
        let target = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();

        clock.set_time(target);

        assert_eq!(clock.now(), target);
    }
}
