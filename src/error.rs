//! Error types shared across the traffic system.
//!
//! Lookup misses and validation failures are the only failures the core
//! produces; the public call contract on [`crate::control_system::traffic_system::TrafficSystem`]
//! folds them into `Option`/`bool` return values.

use crate::control_system::traffic_system::LifecycleState;

/// Failures raised by the intersection registry.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistryError {
    /// No intersection with the given id exists.
    #[error("intersection {id} not found")]
    NotFound { id: String },

    /// A timing plan phase carried a non-positive duration.
    #[error("phase {phase} has invalid duration {seconds}s (must be > 0)")]
    InvalidTiming { phase: String, seconds: u32 },

    /// An intersection with the same id is already registered.
    #[error("intersection id {id} already in use")]
    DuplicateId { id: String },

    /// `initialize` was called on a registry that was already populated.
    #[error("registry already initialized")]
    AlreadyInitialized,
}

/// Failures raised by the lifecycle controller.
#[derive(Debug, thiserror::Error)]
pub enum SystemError {
    /// The requested action is not valid in the current lifecycle state.
    #[error("cannot {action} while {from:?}")]
    InvalidTransition {
        from: LifecycleState,
        action: &'static str,
    },

    /// The simulation loop needs a Tokio runtime to be spawned on.
    #[error("no tokio runtime available to spawn the simulation loop")]
    NoRuntime,

    #[error("registry error: {source}")]
    Registry {
        #[from]
        source: RegistryError,
    },
}

/// Failures while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("failed to parse config JSON: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    #[error("invalid configuration: {reason}")]
    Invalid { reason: String },
}

/// Failures while exporting history.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("csv error: {source}")]
    Csv {
        #[from]
        source: csv::Error,
    },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}
