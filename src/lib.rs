pub mod config;
pub mod control_system;
pub mod error;
pub mod flow_analyzer;
pub mod global_variables;
pub mod models;
pub mod monitoring;
pub mod shared_data;
pub mod simulation_engine;

pub use config::SystemConfig;
pub use control_system::{LifecycleState, SubsystemEngine, TrafficSystem};
pub use error::{ConfigError, RegistryError, ReportError, SystemError};
