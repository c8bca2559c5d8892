use crate::error::ReportError;
use crate::models::TrafficObservation;
use serde::{Deserialize, Serialize};
use std::io::Write;

/// One CSV row per observation, per-direction maps flattened into columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationRecord {
    pub intersection_id: String,
    pub timestamp: String,
    pub vehicles_north: u32,
    pub vehicles_south: u32,
    pub vehicles_east: u32,
    pub vehicles_west: u32,
    pub speed_north: f64,
    pub speed_south: f64,
    pub speed_east: f64,
    pub speed_west: f64,
    pub queue_north: u32,
    pub queue_south: u32,
    pub queue_east: u32,
    pub queue_west: u32,
    pub pedestrian_count: u32,
    pub emergency_vehicle_count: u32,
}

impl From<&TrafficObservation> for ObservationRecord {
    fn from(o: &TrafficObservation) -> Self {
        Self {
            intersection_id: o.intersection_id.clone(),
            timestamp: o.timestamp.to_rfc3339(),
            vehicles_north: o.vehicle_count.north,
            vehicles_south: o.vehicle_count.south,
            vehicles_east: o.vehicle_count.east,
            vehicles_west: o.vehicle_count.west,
            speed_north: o.average_speed.north,
            speed_south: o.average_speed.south,
            speed_east: o.average_speed.east,
            speed_west: o.average_speed.west,
            queue_north: o.queue_length.north,
            queue_south: o.queue_length.south,
            queue_east: o.queue_length.east,
            queue_west: o.queue_length.west,
            pedestrian_count: o.pedestrian_count,
            emergency_vehicle_count: o.emergency_vehicle_count,
        }
    }
}

/// Writes `observations` as CSV with a header row. Returns the number of rows written.
pub fn write_observations_csv<W: Write>(
    writer: W,
    observations: &[TrafficObservation],
) -> Result<usize, ReportError> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(writer);
    for observation in observations {
        wtr.serialize(ObservationRecord::from(observation))?;
    }
    wtr.flush()?;
    Ok(observations.len())
}
