// config.rs
use crate::error::ConfigError;
use crate::global_variables::{
    DEFAULT_CITIES, MAX_INTERSECTIONS_PER_CITY, MAX_RETENTION_DAYS, MIN_INTERSECTIONS_PER_CITY,
    RETENTION_DAYS, TICK_PERIOD_MS, TICK_SAMPLE_SIZE,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Runtime settings for the traffic system. Every field falls back to the
/// values in `global_variables` when missing from the JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    /// Cities seeded during initialization, in order.
    pub cities: Vec<String>,
    pub min_intersections_per_city: usize,
    pub max_intersections_per_city: usize,
    /// Period between simulation ticks.
    pub tick_period_ms: u64,
    /// Upper bound on intersections perturbed per tick.
    pub sample_size: usize,
    pub retention_days: i64,
    /// Seed for the registry and simulation RNG. Drawn at random when absent.
    pub seed: Option<u64>,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            cities: DEFAULT_CITIES.iter().map(|c| c.to_string()).collect(),
            min_intersections_per_city: MIN_INTERSECTIONS_PER_CITY,
            max_intersections_per_city: MAX_INTERSECTIONS_PER_CITY,
            tick_period_ms: TICK_PERIOD_MS,
            sample_size: TICK_SAMPLE_SIZE,
            retention_days: RETENTION_DAYS,
            seed: None,
        }
    }
}

impl SystemConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| {
            Err(ConfigError::Invalid {
                reason: reason.to_string(),
            })
        };
        if self.cities.is_empty() {
            return invalid("at least one city is required");
        }
        if self.min_intersections_per_city == 0 {
            return invalid("min_intersections_per_city must be at least 1");
        }
        if self.min_intersections_per_city > self.max_intersections_per_city {
            return invalid("min_intersections_per_city exceeds max_intersections_per_city");
        }
        if self.tick_period_ms == 0 {
            return invalid("tick_period_ms must be positive");
        }
        if self.sample_size == 0 {
            return invalid("sample_size must be positive");
        }
        if self.retention_days <= 0 {
            return invalid("retention_days must be positive");
        }
        if self.retention_days > MAX_RETENTION_DAYS {
            return invalid("retention_days exceeds the supported maximum");
        }
        self.retention()?;
        Ok(())
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }

    pub fn retention(&self) -> Result<chrono::Duration, ConfigError> {
        chrono::Duration::try_days(self.retention_days).ok_or_else(|| ConfigError::Invalid {
            reason: format!("retention_days {} is out of range", self.retention_days),
        })
    }
}
