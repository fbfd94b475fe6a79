use std::fmt;

use thiserror::Error;

/// Entity categories, used in lookup errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Sensor,
    Tank,
    Valve,
    Input,
    Relay,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntityKind::Sensor => "sensor",
            EntityKind::Tank => "tank",
            EntityKind::Valve => "valve",
            EntityKind::Input => "digital input",
            EntityKind::Relay => "relay",
        })
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{kind} '{name}' not found")]
    NotFound { kind: EntityKind, name: String },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    /// A well-known entity the control loop depends on is not configured.
    #[error("missing well-known {kind} '{name}'")]
    MissingEntity { kind: EntityKind, name: String },
    #[error("unknown {kind} '{name}'")]
    UnknownEntity { kind: EntityKind, name: String },
    #[error("gateway write to circuit {circuit} failed")]
    WriteFailed { circuit: String },
    #[error("invalid command: {0}")]
    InvalidCommand(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CoreError {
    pub(crate) fn missing(kind: EntityKind, name: &str) -> Self {
        CoreError::MissingEntity {
            kind,
            name: name.to_string(),
        }
    }

    pub(crate) fn unknown(kind: EntityKind, name: &str) -> Self {
        CoreError::UnknownEntity {
            kind,
            name: name.to_string(),
        }
    }
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing gateway")]
    MissingGateway,
    #[error("missing state store")]
    MissingStore,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
