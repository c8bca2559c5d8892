// monitoring/mod.rs
pub mod health;
pub mod report;

pub use health::{assess_health, EngineStatus, HealthReport, HealthStatus};
pub use report::write_observations_csv;
