//! Error types for the autopilot.
//!
//! World errors never escape a tick: the scheduler recovers from them by
//! dropping the stale reference or skipping the session. Only configuration
//! loading surfaces errors to the host.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::{MovementId, UnitId};

/// Failures reported by world collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorldError {
    #[error("unit {0:?} no longer exists")]
    MissingEntity(UnitId),

    #[error("movement planner {0:?} no longer exists")]
    MissingMovement(MovementId),
}

impl WorldError {
    /// Returns true when the error refers to `unit`.
    pub fn is_missing(&self, unit: UnitId) -> bool {
        matches!(self, WorldError::MissingEntity(id) if *id == unit)
    }
}

/// Failures loading an [`AutopilotConfig`](crate::config::AutopilotConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid value {value:?} for {key}")]
    InvalidEnv { key: &'static str, value: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;
