// flow_analyzer/mod.rs
pub mod history;
pub mod metrics;

pub use history::HistoryStore;
pub use metrics::{collect_system_metrics, efficiency_improvement, SystemMetrics};
