//! Per-sensor fault persistence.
//!
//! A sensor is tracked from its first invalid reading. The fault becomes
//! persistent once the sensor has stayed invalid for `persist_after`; a single
//! valid reading forgets the history.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use crate::config::DEFAULT_PERSIST_AFTER;

#[derive(Debug, Clone, Copy)]
struct Entry {
    since: Instant,
    since_utc: DateTime<Utc>,
    persistent: bool,
}

/// State change reported by [`FaultTracker::observe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultTransition {
    None,
    /// First invalid reading after a good one.
    Started,
    /// Threshold crossed on this observation.
    BecamePersistent,
    /// A valid reading cleared a tracked fault.
    Cleared { was_persistent: bool },
}

#[derive(Debug, Clone)]
pub struct FaultTracker {
    persist_after: Duration,
    entries: HashMap<String, Entry>,
}

impl Default for FaultTracker {
    fn default() -> Self {
        Self::new(DEFAULT_PERSIST_AFTER)
    }
}

impl FaultTracker {
    pub fn new(persist_after: Duration) -> Self {
        Self {
            persist_after,
            entries: HashMap::new(),
        }
    }

    pub fn persist_after(&self) -> Duration {
        self.persist_after
    }

    /// Feed one validity verdict for `sensor`, observed at `now`.
    pub fn observe(
        &mut self,
        sensor: &str,
        valid: bool,
        now: Instant,
        now_utc: DateTime<Utc>,
    ) -> FaultTransition {
        if valid {
            return match self.entries.remove(sensor) {
                Some(e) => FaultTransition::Cleared {
                    was_persistent: e.persistent,
                },
                None => FaultTransition::None,
            };
        }

        match self.entries.get_mut(sensor) {
            None => {
                self.entries.insert(
                    sensor.to_string(),
                    Entry {
                        since: now,
                        since_utc: now_utc,
                        persistent: false,
                    },
                );
                FaultTransition::Started
            }
            Some(e) if e.persistent => FaultTransition::None,
            Some(e) => {
                if now.saturating_duration_since(e.since) >= self.persist_after {
                    e.persistent = true;
                    FaultTransition::BecamePersistent
                } else {
                    FaultTransition::None
                }
            }
        }
    }

    pub fn is_persistent_fault(&self, sensor: &str) -> bool {
        self.entries.get(sensor).is_some_and(|e| e.persistent)
    }

    /// `(error_active, last_error_time)` as mirrored onto the stored sensor.
    pub fn mirror(&self, sensor: &str) -> (bool, Option<DateTime<Utc>>) {
        match self.entries.get(sensor) {
            Some(e) => (e.persistent, Some(e.since_utc)),
            None => (false, None),
        }
    }

    pub fn tracked(&self) -> usize {
        self.entries.len()
    }

    pub fn persistent_count(&self) -> usize {
        self.entries.values().filter(|e| e.persistent).count()
    }

    /// Drop entries for sensors no longer in the store.
    pub fn retain<F: FnMut(&str) -> bool>(&mut self, mut keep: F) {
        self.entries.retain(|name, _| keep(name));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn at(t0: Instant, secs: u64) -> Instant {
        t0 + Duration::from_secs(secs)
    }

    #[test]
    fn becomes_persistent_at_threshold() {
        let t0 = Instant::now();
        let u0 = Utc::now();
        let mut ft = FaultTracker::new(Duration::from_secs(60));

        assert_eq!(ft.observe("S1", false, t0, u0), FaultTransition::Started);
        assert_eq!(ft.observe("S1", false, at(t0, 25), u0), FaultTransition::None);
        assert_eq!(ft.observe("S1", false, at(t0, 50), u0), FaultTransition::None);
        assert!(!ft.is_persistent_fault("S1"));
        assert_eq!(
            ft.observe("S1", false, at(t0, 75), u0),
            FaultTransition::BecamePersistent
        );
        assert!(ft.is_persistent_fault("S1"));
        assert_eq!(ft.mirror("S1"), (true, Some(u0)));
    }

    #[test]
    fn one_good_reading_forgets_history() {
        let t0 = Instant::now();
        let u0 = Utc::now();
        let mut ft = FaultTracker::new(Duration::from_secs(60));
        ft.observe("S1", false, t0, u0);
        ft.observe("S1", false, at(t0, 90), u0);
        assert_eq!(
            ft.observe("S1", true, at(t0, 91), u0),
            FaultTransition::Cleared {
                was_persistent: true
            }
        );
        assert_eq!(ft.mirror("S1"), (false, None));
        // The clock restarts on the next invalid reading.
        ft.observe("S1", false, at(t0, 92), u0);
        ft.observe("S1", false, at(t0, 140), u0);
        assert!(!ft.is_persistent_fault("S1"));
    }

    #[test]
    fn retain_drops_unknown_sensors() {
        let t0 = Instant::now();
        let mut ft = FaultTracker::default();
        ft.observe("S1", false, t0, Utc::now());
        ft.observe("S2", false, t0, Utc::now());
        ft.retain(|n| n == "S2");
        assert_eq!(ft.tracked(), 1);
    }

    proptest! {
        // Persistent iff the sensor has been continuously invalid for the
        // threshold; any valid reading resets to not persistent.
        #[test]
        fn persistence_tracks_continuous_invalidity(
            steps in proptest::collection::vec((any::<bool>(), 0u64..40), 1..60)
        ) {
            let t0 = Instant::now();
            let u0 = Utc::now();
            let threshold = Duration::from_secs(60);
            let mut ft = FaultTracker::new(threshold);
            let mut elapsed = 0u64;
            let mut run_start: Option<u64> = None;

            for (valid, gap) in steps {
                elapsed += gap;
                ft.observe("S", valid, at(t0, elapsed), u0);
                if valid {
                    run_start = None;
                    prop_assert!(!ft.is_persistent_fault("S"));
                } else {
                    let start = *run_start.get_or_insert(elapsed);
                    let expect = elapsed - start >= threshold.as_secs();
                    prop_assert_eq!(ft.is_persistent_fault("S"), expect);
                }
            }
        }
    }
}
