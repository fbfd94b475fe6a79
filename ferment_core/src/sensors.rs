//! Sensor refresh: feeds the fault tracker and stores trustworthy readings.

use ferment_traits::Clock;

use crate::client::DeviceClient;
use crate::error::CoreError;
use crate::events;
use crate::fault::{FaultTracker, FaultTransition};
use crate::model::LogRecord;
use crate::store::StateStore;

/// Counts from one sensor sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SensorSweep {
    pub polled: usize,
    pub invalid: usize,
    pub persistent: usize,
    /// Sensors whose stored temperature was refreshed.
    pub updated: usize,
}

/// Poll every sensor once, updating the tracker and the stored fault mirror.
pub fn refresh(
    client: &DeviceClient,
    store: &dyn StateStore,
    faults: &mut FaultTracker,
    clock: &dyn Clock,
) -> Result<SensorSweep, CoreError> {
    let sensors = store.sensors();
    faults.retain(|name| sensors.iter().any(|s| s.name == name));

    let mut sweep = SensorSweep::default();
    for sensor in sensors {
        let sample = client.sample(&sensor.circuit);
        let valid = sample.validity.is_trustworthy();
        let now_utc = clock.utc();
        let transition = faults.observe(&sensor.name, valid, clock.now(), now_utc);
        let (error_active, last_error_time) = faults.mirror(&sensor.name);
        let fresh = sample.trusted_value();

        store.update_sensor(&sensor.name, &mut |s| {
            s.error_active = error_active;
            s.last_error_time = last_error_time;
            if let Some(t) = fresh {
                s.current_temperature = Some(t);
                s.last_updated = Some(now_utc);
            }
        })?;

        sweep.polled += 1;
        if !valid {
            sweep.invalid += 1;
        }
        if error_active {
            sweep.persistent += 1;
        }
        if fresh.is_some() {
            sweep.updated += 1;
        }

        match transition {
            FaultTransition::Started => {
                tracing::debug!(sensor = %sensor.name, validity = ?sample.validity, "sensor invalid");
            }
            FaultTransition::BecamePersistent => {
                tracing::warn!(
                    sensor = %sensor.name,
                    after_s = faults.persist_after().as_secs(),
                    "sensor fault persistent"
                );
                events::record(
                    store,
                    LogRecord::new(now_utc, format!("Sensor '{}' fault persistent", sensor.name))
                        .sensor(&sensor.name),
                );
            }
            FaultTransition::Cleared {
                was_persistent: true,
            } => {
                let mut rec = LogRecord::new(now_utc, format!("Sensor '{}' recovered", sensor.name))
                    .sensor(&sensor.name);
                if let Some(t) = fresh {
                    rec = rec.temperature(t);
                }
                events::record(store, rec);
            }
            FaultTransition::Cleared { .. } | FaultTransition::None => {}
        }
    }
    Ok(sweep)
}
