#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::must_use_candidate
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Fermentation rig control loop (gateway-agnostic).
//!
//! All device I/O goes through `ferment_traits::Gateway`; all entity state
//! lives behind [`store::StateStore`].
//!
//! ## Architecture
//!
//! - **Device client**: total wrappers over the gateway (`client`)
//! - **Fault tracking**: per-sensor persistence window (`fault`, `sensors`)
//! - **Regulation**: bang-bang valve control per tank (`regulate`)
//! - **Alarm**: level-triggered aggregate over all sensors (`alarm`)
//! - **Synchronizer**: emergency-stop interlock and mirrored relays (`sync`)
//! - **Cycle driver**: [`Controller::cycle`] and [`runner::run`]
//!
//! Steps run one after another on the caller's thread. A failing step is
//! reported in the [`status::CycleReport`] and does not stop the others.

// Module declarations
pub mod alarm;
pub mod builder;
pub mod client;
pub mod commands;
pub mod config;
pub mod controller;
mod conversions;
pub mod error;
pub mod events;
pub mod fault;
pub mod gateway_error;
pub mod mocks;
pub mod model;
pub mod regulate;
pub mod roles;
pub mod runner;
pub mod sensors;
pub mod status;
pub mod store;
pub mod sync;

pub use builder::ControllerBuilder;
pub use client::{DeviceClient, Validity};
pub use commands::ManualControl;
pub use config::{LoopCfg, MirrorPair, RoleNames};
pub use controller::Controller;
pub use error::{BuildError, CoreError, EntityKind, StoreError};
pub use fault::FaultTracker;
pub use runner::{RunParams, RunSummary, ShutdownHandle, ShutdownSignal, run, shutdown_signal};
pub use status::{CycleReport, SystemStatus};
pub use store::{MemoryStore, StateStore};
