//! Audit log: records go to the state store and to `tracing`.

use crate::model::LogRecord;
use crate::store::StateStore;

pub const TARGET: &str = "ferment::events";

pub fn record(store: &dyn StateStore, record: LogRecord) {
    tracing::info!(
        target: TARGET,
        tank = record.tank.as_deref(),
        sensor = record.sensor.as_deref(),
        temperature = record.temperature,
        valve_state = record.valve_state,
        "{}",
        record.message
    );
    store.append_log(record);
}

/// Same as [`record`], for records re-emitted every cycle with no change.
/// Still appended; traced at debug so the console stays readable.
pub fn record_repeat(store: &dyn StateStore, record: LogRecord) {
    tracing::debug!(target: TARGET, "{}", record.message);
    store.append_log(record);
}
