use crate::global_variables::QUEUE_SECONDS_PER_VEHICLE;
use crate::models::direction::PerDirection;
use crate::models::intersection::Intersection;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Immutable snapshot of the conditions at one intersection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficObservation {
    /// Intersection this was taken from. The intersection may have moved on since.
    pub intersection_id: String,
    pub timestamp: DateTime<Local>,
    pub vehicle_count: PerDirection<u32>,
    pub average_speed: PerDirection<f64>,
    pub queue_length: PerDirection<u32>,
    pub pedestrian_count: u32,
    pub emergency_vehicle_count: u32,
}

impl TrafficObservation {
    /// Snapshots the current volumes and wait times of `intersection`,
    /// deriving queue lengths from the wait times.
    pub fn capture(
        intersection: &Intersection,
        average_speed: PerDirection<f64>,
        pedestrian_count: u32,
        emergency_vehicle_count: u32,
    ) -> Self {
        Self {
            intersection_id: intersection.id.clone(),
            timestamp: Local::now(),
            vehicle_count: intersection.traffic_volume,
            average_speed,
            queue_length: intersection.wait_times.map(|&wait| queue_length_for(wait)),
            pedestrian_count,
            emergency_vehicle_count,
        }
    }
}

/// Vehicles queued for a given wait: one per five seconds, rounded down.
pub fn queue_length_for(wait_seconds: f64) -> u32 {
    (wait_seconds.max(0.0) / QUEUE_SECONDS_PER_VEHICLE).floor() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::direction::Direction;

    #[test]
    fn queue_length_floors_wait_over_five() {
        assert_eq!(queue_length_for(0.0), 0);
        assert_eq!(queue_length_for(4.99), 0);
        assert_eq!(queue_length_for(5.0), 1);
        assert_eq!(queue_length_for(27.3), 5);
    }

    #[test]
    fn capture_copies_volumes_and_derives_queues() {
        let intersection = Intersection::builder("t1", "Testville")
            .traffic_volume(PerDirection {
                north: 12,
                south: 0,
                east: 40,
                west: 7,
            })
            .wait_times(PerDirection {
                north: 11.0,
                south: 0.0,
                east: 52.4,
                west: 9.9,
            })
            .build();
        let observation =
            TrafficObservation::capture(&intersection, PerDirection::from_fn(|_| 30.0), 3, 0);
        assert_eq!(observation.intersection_id, "t1");
        assert_eq!(observation.vehicle_count, intersection.traffic_volume);
        assert_eq!(observation.queue_length[Direction::North], 2);
        assert_eq!(observation.queue_length[Direction::East], 10);
        assert_eq!(observation.queue_length[Direction::West], 1);
        assert_eq!(observation.pedestrian_count, 3);
    }
}
