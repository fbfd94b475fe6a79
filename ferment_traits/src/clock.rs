use chrono::{DateTime, Utc};
use std::thread;
use std::time::{Duration, Instant};

/// Clock abstraction for fault timing and record timestamps.
///
/// - now(): monotonic Instant, used for elapsed-time decisions
/// - utc(): wall-clock timestamp, used for stored/audit fields
/// - sleep(): sleeps for the provided duration (implementations may simulate)
pub trait Clock {
    fn now(&self) -> Instant;
    fn utc(&self) -> DateTime<Utc>;
    fn sleep(&self, d: Duration);

    /// Milliseconds elapsed since `epoch`, saturating at 0 on underflow.
    fn ms_since(&self, epoch: Instant) -> u64 {
        let dur = self.now().saturating_duration_since(epoch);
        u64::try_from(dur.as_millis()).unwrap_or(u64::MAX)
    }
}

/// Default real-time clock backed by `std::time::Instant` and `Utc::now`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl MonotonicClock {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }

    #[inline]
    fn utc(&self) -> DateTime<Utc> {
        Utc::now()
    }

    #[inline]
    fn sleep(&self, d: Duration) {
        if d.is_zero() {
            return;
        }
        thread::sleep(d);
    }
}

#[cfg(any(test, feature = "test-util"))]
pub mod test_clock {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Deterministic test clock whose time can be advanced manually.
    ///
    /// now() = origin + offset, utc() = origin_utc + offset.
    /// sleep(d) advances internal time by d without actually sleeping.
    #[derive(Debug, Clone)]
    pub struct TestClock {
        origin: Instant,
        origin_utc: DateTime<Utc>,
        offset: Arc<Mutex<Duration>>,
    }

    impl Default for TestClock {
        fn default() -> Self {
            Self::new()
        }
    }

    impl TestClock {
        pub fn new() -> Self {
            Self {
                origin: Instant::now(),
                origin_utc: Utc::now(),
                offset: Arc::new(Mutex::new(Duration::ZERO)),
            }
        }

        /// Advance the clock by the given duration.
        pub fn advance(&self, d: Duration) {
            if let Ok(mut off) = self.offset.lock() {
                *off = off.saturating_add(d);
            }
        }

        /// Set the absolute offset relative to origin.
        pub fn set_offset(&self, d: Duration) {
            if let Ok(mut off) = self.offset.lock() {
                *off = d;
            }
        }

        fn offset(&self) -> Duration {
            self.offset.lock().map(|g| *g).unwrap_or(Duration::ZERO)
        }
    }

    impl Clock for TestClock {
        fn now(&self) -> Instant {
            self.origin + self.offset()
        }

        fn utc(&self) -> DateTime<Utc> {
            let off = chrono::Duration::from_std(self.offset()).unwrap_or(chrono::Duration::zero());
            self.origin_utc + off
        }

        fn sleep(&self, d: Duration) {
            self.advance(d);
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn advance_moves_both_timelines() {
            let clock = TestClock::new();
            let t0 = clock.now();
            let u0 = clock.utc();
            clock.advance(Duration::from_secs(25));
            clock.sleep(Duration::from_secs(5));
            assert_eq!(clock.ms_since(t0), 30_000);
            assert_eq!((clock.utc() - u0).num_seconds(), 30);
        }
    }
}
