// control_system/mod.rs
pub mod engines;
pub mod traffic_system;

pub use engines::SubsystemEngine;
pub use traffic_system::{LifecycleState, TrafficSystem};
