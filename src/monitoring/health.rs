use crate::flow_analyzer::history::HistoryStore;
use crate::simulation_engine::intersections::IntersectionRegistry;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Status flag reported by a subsystem that runs beside the core
/// (signal optimizer, traffic simulator).
pub trait EngineStatus: Send + Sync {
    fn name(&self) -> &str;
    fn is_running(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

/// Per-component verdicts. A `false` marks that component as failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub traffic_system: bool,
    pub intersections: bool,
    pub data_processing: bool,
    pub signal_optimizer: bool,
    pub traffic_simulator: bool,
}

impl ComponentHealth {
    pub fn all_operational(&self) -> bool {
        self.traffic_system
            && self.intersections
            && self.data_processing
            && self.signal_optimizer
            && self.traffic_simulator
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub components: ComponentHealth,
    pub timestamp: DateTime<Local>,
    pub uptime_seconds: u64,
}

/// Builds the composite health verdict. Subsystems that have not been
/// attached count as healthy.
pub fn assess_health(
    running: bool,
    registry: &IntersectionRegistry,
    history: &HistoryStore,
    optimizer: Option<&dyn EngineStatus>,
    simulator: Option<&dyn EngineStatus>,
    uptime_seconds: u64,
) -> HealthReport {
    let components = ComponentHealth {
        traffic_system: running,
        intersections: !registry.is_empty(),
        data_processing: history.is_healthy(),
        signal_optimizer: optimizer.map_or(true, |engine| engine.is_running()),
        traffic_simulator: simulator.map_or(true, |engine| engine.is_running()),
    };
    let status = if components.all_operational() {
        HealthStatus::Healthy
    } else {
        HealthStatus::Degraded
    };
    if status == HealthStatus::Degraded {
        log::warn!("Health check degraded: {:?}", components);
    }
    HealthReport {
        status,
        components,
        timestamp: Local::now(),
        uptime_seconds,
    }
}
