//! State store capability and the in-memory implementation used by the CLI.
//!
//! The store owns every entity. The control loop only lists, looks up by
//! name, updates fields of one entity, and appends log records. There are
//! no cross-entity transactions: concurrent writers race, last write wins.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::{EntityKind, StoreError};
use crate::model::{DigitalInput, LogRecord, Relay, Sensor, Tank, Valve};

/// Closure applied to one entity inside the store.
pub type Update<'a, T> = &'a mut dyn FnMut(&mut T);

pub trait StateStore: Send + Sync {
    fn sensors(&self) -> Vec<Sensor>;
    fn sensor(&self, name: &str) -> Option<Sensor>;
    fn update_sensor(&self, name: &str, f: Update<'_, Sensor>) -> Result<Sensor, StoreError>;

    fn tanks(&self) -> Vec<Tank>;
    fn tank(&self, name: &str) -> Option<Tank>;
    fn update_tank(&self, name: &str, f: Update<'_, Tank>) -> Result<Tank, StoreError>;

    fn valves(&self) -> Vec<Valve>;
    fn valve(&self, name: &str) -> Option<Valve>;
    fn update_valve(&self, name: &str, f: Update<'_, Valve>) -> Result<Valve, StoreError>;

    fn inputs(&self) -> Vec<DigitalInput>;
    fn input(&self, name: &str) -> Option<DigitalInput>;
    fn update_input(
        &self,
        name: &str,
        f: Update<'_, DigitalInput>,
    ) -> Result<DigitalInput, StoreError>;

    fn relays(&self) -> Vec<Relay>;
    fn relay(&self, name: &str) -> Option<Relay>;
    fn update_relay(&self, name: &str, f: Update<'_, Relay>) -> Result<Relay, StoreError>;

    fn append_log(&self, record: LogRecord);
    /// Newest first, at most `limit` records.
    ///
    /// Bounded stores drop the oldest records first. The alarm outcome is
    /// appended every cycle, so `MemoryStore` at its default capacity and a
    /// 100 ms cycle keeps about 17 minutes; raise `[logging].history` for more.
    fn recent_logs(&self, limit: usize) -> Vec<LogRecord>;
}

pub const DEFAULT_LOG_CAPACITY: usize = 10_000;

#[derive(Debug, Default)]
struct Tables {
    sensors: BTreeMap<String, Sensor>,
    tanks: BTreeMap<String, Tank>,
    valves: BTreeMap<String, Valve>,
    inputs: BTreeMap<String, DigitalInput>,
    relays: BTreeMap<String, Relay>,
    logs: VecDeque<LogRecord>,
}

fn update_in<T: Clone>(
    map: &mut BTreeMap<String, T>,
    kind: EntityKind,
    name: &str,
    f: Update<'_, T>,
) -> Result<T, StoreError> {
    let entity = map.get_mut(name).ok_or_else(|| StoreError::NotFound {
        kind,
        name: name.to_string(),
    })?;
    f(entity);
    Ok(entity.clone())
}

/// Process-local store; the log table is a bounded ring.
#[derive(Debug)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    log_capacity: usize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_log_capacity(DEFAULT_LOG_CAPACITY)
    }

    pub fn with_log_capacity(log_capacity: usize) -> Self {
        Self {
            tables: Mutex::new(Tables::default()),
            log_capacity: log_capacity.max(1),
        }
    }

    /// Seed every entity table from the rig configuration.
    pub fn from_config(cfg: &ferment_config::Config) -> Self {
        let store =
            Self::with_log_capacity(cfg.logging.history.unwrap_or(DEFAULT_LOG_CAPACITY));
        for s in &cfg.sensors {
            store.insert_sensor(s.into());
        }
        for v in &cfg.valves {
            store.insert_valve(v.into());
        }
        for t in &cfg.tanks {
            store.insert_tank(t.into());
        }
        for i in &cfg.inputs {
            store.insert_input(i.into());
        }
        for r in &cfg.relays {
            store.insert_relay(r.into());
        }
        store
    }

    // A panicked writer leaves plain data behind; keep serving it.
    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert_sensor(&self, sensor: Sensor) {
        self.lock().sensors.insert(sensor.name.clone(), sensor);
    }

    pub fn insert_tank(&self, tank: Tank) {
        self.lock().tanks.insert(tank.name.clone(), tank);
    }

    pub fn insert_valve(&self, valve: Valve) {
        self.lock().valves.insert(valve.name.clone(), valve);
    }

    pub fn insert_input(&self, input: DigitalInput) {
        self.lock().inputs.insert(input.name.clone(), input);
    }

    pub fn insert_relay(&self, relay: Relay) {
        self.lock().relays.insert(relay.name.clone(), relay);
    }

    /// Delete a sensor; tanks that referenced it lose the reference.
    pub fn remove_sensor(&self, name: &str) -> Option<Sensor> {
        let mut t = self.lock();
        let removed = t.sensors.remove(name);
        for tank in t.tanks.values_mut() {
            if tank.sensor.as_deref() == Some(name) {
                tank.sensor = None;
            }
        }
        removed
    }

    /// Delete a valve; tanks that referenced it lose the reference.
    pub fn remove_valve(&self, name: &str) -> Option<Valve> {
        let mut t = self.lock();
        let removed = t.valves.remove(name);
        for tank in t.tanks.values_mut() {
            if tank.valve.as_deref() == Some(name) {
                tank.valve = None;
            }
        }
        removed
    }

    pub fn remove_relay(&self, name: &str) -> Option<Relay> {
        self.lock().relays.remove(name)
    }

    pub fn remove_input(&self, name: &str) -> Option<DigitalInput> {
        self.lock().inputs.remove(name)
    }

    pub fn log_len(&self) -> usize {
        self.lock().logs.len()
    }
}

impl StateStore for MemoryStore {
    fn sensors(&self) -> Vec<Sensor> {
        self.lock().sensors.values().cloned().collect()
    }

    fn sensor(&self, name: &str) -> Option<Sensor> {
        self.lock().sensors.get(name).cloned()
    }

    fn update_sensor(&self, name: &str, f: Update<'_, Sensor>) -> Result<Sensor, StoreError> {
        update_in(&mut self.lock().sensors, EntityKind::Sensor, name, f)
    }

    fn tanks(&self) -> Vec<Tank> {
        self.lock().tanks.values().cloned().collect()
    }

    fn tank(&self, name: &str) -> Option<Tank> {
        self.lock().tanks.get(name).cloned()
    }

    fn update_tank(&self, name: &str, f: Update<'_, Tank>) -> Result<Tank, StoreError> {
        update_in(&mut self.lock().tanks, EntityKind::Tank, name, f)
    }

    fn valves(&self) -> Vec<Valve> {
        self.lock().valves.values().cloned().collect()
    }

    fn valve(&self, name: &str) -> Option<Valve> {
        self.lock().valves.get(name).cloned()
    }

    fn update_valve(&self, name: &str, f: Update<'_, Valve>) -> Result<Valve, StoreError> {
        update_in(&mut self.lock().valves, EntityKind::Valve, name, f)
    }

    fn inputs(&self) -> Vec<DigitalInput> {
        self.lock().inputs.values().cloned().collect()
    }

    fn input(&self, name: &str) -> Option<DigitalInput> {
        self.lock().inputs.get(name).cloned()
    }

    fn update_input(
        &self,
        name: &str,
        f: Update<'_, DigitalInput>,
    ) -> Result<DigitalInput, StoreError> {
        update_in(&mut self.lock().inputs, EntityKind::Input, name, f)
    }

    fn relays(&self) -> Vec<Relay> {
        self.lock().relays.values().cloned().collect()
    }

    fn relay(&self, name: &str) -> Option<Relay> {
        self.lock().relays.get(name).cloned()
    }

    fn update_relay(&self, name: &str, f: Update<'_, Relay>) -> Result<Relay, StoreError> {
        update_in(&mut self.lock().relays, EntityKind::Relay, name, f)
    }

    fn append_log(&self, record: LogRecord) {
        let mut t = self.lock();
        if t.logs.len() >= self.log_capacity {
            t.logs.pop_front();
        }
        t.logs.push_back(record);
    }

    fn recent_logs(&self, limit: usize) -> Vec<LogRecord> {
        self.lock().logs.iter().rev().take(limit).cloned().collect()
    }
}
