// metrics.rs

use crate::flow_analyzer::history::HistoryStore;
use crate::global_variables::{BASELINE_WAIT_FACTOR, EFFICIENCY_CAP_PERCENT};
use crate::simulation_engine::intersections::IntersectionRegistry;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Flat snapshot of system-wide statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemMetrics {
    pub total_intersections: usize,
    pub average_wait_time: f64,
    pub efficiency_improvement: f64,
    pub uptime_seconds: u64,
    pub cities_served: usize,
    pub data_points_processed: usize,
    pub last_updated: DateTime<Local>,
}

/// Improvement of `average_wait` over a baseline 15% above it, capped at 15%.
// The baseline is derived from the average itself, so any positive average
// yields the same ~13.04%.
pub fn efficiency_improvement(average_wait: f64) -> f64 {
    if average_wait <= 0.0 {
        return 0.0;
    }
    let baseline = average_wait * BASELINE_WAIT_FACTOR;
    ((baseline - average_wait) / baseline * 100.0).clamp(0.0, EFFICIENCY_CAP_PERCENT)
}

pub fn uptime_seconds(start_time: Option<DateTime<Local>>, now: DateTime<Local>) -> u64 {
    start_time
        .map(|start| (now - start).num_seconds().max(0) as u64)
        .unwrap_or(0)
}

/// Reads the registry and history store and derives the current metrics.
pub fn collect_system_metrics(
    registry: &IntersectionRegistry,
    history: &HistoryStore,
    start_time: Option<DateTime<Local>>,
) -> SystemMetrics {
    let mut total_intersections = 0usize;
    let mut total_wait = 0.0;
    let mut cities: HashSet<String> = HashSet::new();
    registry.visit(|intersection| {
        total_intersections += 1;
        total_wait += intersection.wait_times.values().sum::<f64>();
        if !cities.contains(intersection.city.as_str()) {
            cities.insert(intersection.city.clone());
        }
    });

    let average_wait = if total_intersections == 0 {
        0.0
    } else {
        total_wait / (total_intersections * 4) as f64
    };
    let now = Local::now();

    SystemMetrics {
        total_intersections,
        average_wait_time: round2(average_wait),
        efficiency_improvement: round2(efficiency_improvement(average_wait)),
        uptime_seconds: uptime_seconds(start_time, now),
        cities_served: cities.len(),
        data_points_processed: history.len(),
        last_updated: now,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
