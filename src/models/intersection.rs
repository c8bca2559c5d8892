use crate::error::RegistryError;
use crate::models::direction::{LightState, PerDirection};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Latitude/longitude of an intersection in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Signal phase durations in whole seconds, keyed by phase name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimingPlan(BTreeMap<String, u32>);

impl TimingPlan {
    pub fn new(phases: BTreeMap<String, u32>) -> Self {
        Self(phases)
    }

    /// Rejects the plan if any phase has a zero duration.
    pub fn validate(&self) -> Result<(), RegistryError> {
        match self.0.iter().find(|(_, seconds)| **seconds == 0) {
            Some((phase, seconds)) => Err(RegistryError::InvalidTiming {
                phase: phase.clone(),
                seconds: *seconds,
            }),
            None => Ok(()),
        }
    }

    pub fn get(&self, phase: &str) -> Option<u32> {
        self.0.get(phase).copied()
    }

    pub fn phases(&self) -> impl Iterator<Item = (&str, u32)> {
        self.0.iter().map(|(name, &seconds)| (name.as_str(), seconds))
    }

    /// Total length of one full signal cycle.
    pub fn cycle_seconds(&self) -> u32 {
        self.0.values().sum()
    }
}

impl Default for TimingPlan {
    fn default() -> Self {
        Self(
            [
                ("north_south_green", 45),
                ("north_south_yellow", 5),
                ("east_west_green", 40),
                ("east_west_yellow", 5),
                ("all_red_clearance", 2),
            ]
            .into_iter()
            .map(|(phase, seconds)| (phase.to_string(), seconds))
            .collect(),
        )
    }
}

impl<S: Into<String>> FromIterator<(S, u32)> for TimingPlan {
    fn from_iter<I: IntoIterator<Item = (S, u32)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Represents a managed traffic junction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intersection {
    /// Unique identifier, never reused.
    pub id: String,
    pub name: String,
    pub city: String,
    pub location: GeoPoint,
    pub signal_states: PerDirection<LightState>,
    pub timing_plan: TimingPlan,
    /// Vehicles queued per approach.
    pub traffic_volume: PerDirection<u32>,
    /// Average wait per approach, in seconds.
    pub wait_times: PerDirection<f64>,
    pub last_updated: DateTime<Local>,
}

impl Intersection {
    pub fn builder(id: impl Into<String>, city: impl Into<String>) -> IntersectionBuilder {
        IntersectionBuilder::new(id, city)
    }

    pub fn touch(&mut self) {
        self.last_updated = Local::now();
    }
}

/// Produces fully populated [`Intersection`] records. Anything not set
/// explicitly starts from the default signal phase, the default timing plan
/// and zeroed per-direction counters.
#[derive(Debug, Clone)]
pub struct IntersectionBuilder {
    id: String,
    city: String,
    name: Option<String>,
    location: GeoPoint,
    signal_states: PerDirection<LightState>,
    timing_plan: TimingPlan,
    traffic_volume: PerDirection<u32>,
    wait_times: PerDirection<f64>,
}

impl IntersectionBuilder {
    pub fn new(id: impl Into<String>, city: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            city: city.into(),
            name: None,
            location: GeoPoint::default(),
            signal_states: PerDirection::default_phase(),
            timing_plan: TimingPlan::default(),
            traffic_volume: PerDirection::default(),
            wait_times: PerDirection::default(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn location(mut self, latitude: f64, longitude: f64) -> Self {
        self.location = GeoPoint {
            latitude,
            longitude,
        };
        self
    }

    pub fn signal_states(mut self, signal_states: PerDirection<LightState>) -> Self {
        self.signal_states = signal_states;
        self
    }

    pub fn timing_plan(mut self, timing_plan: TimingPlan) -> Self {
        self.timing_plan = timing_plan;
        self
    }

    pub fn traffic_volume(mut self, traffic_volume: PerDirection<u32>) -> Self {
        self.traffic_volume = traffic_volume;
        self
    }

    pub fn wait_times(mut self, wait_times: PerDirection<f64>) -> Self {
        self.wait_times = wait_times;
        self
    }

    pub fn build(self) -> Intersection {
        let name = self.name.unwrap_or_else(|| self.id.clone());
        Intersection {
            id: self.id,
            name,
            city: self.city,
            location: self.location,
            signal_states: self.signal_states,
            timing_plan: self.timing_plan,
            traffic_volume: self.traffic_volume,
            wait_times: self.wait_times,
            last_updated: Local::now(),
        }
    }
}
