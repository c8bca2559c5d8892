// simulation.rs
use crate::flow_analyzer::history::HistoryStore;
use crate::global_variables::{
    BASE_WAIT_SECONDS, EMERGENCY_PROBABILITY, PEDESTRIAN_MAX, SPEED_MAX, SPEED_MIN,
    VOLUME_NORMALIZER, VOLUME_PERTURBATION, WAIT_NOISE_SECONDS,
};
use crate::models::{Direction, Intersection, PerDirection, TrafficObservation};
use crate::simulation_engine::intersections::IntersectionRegistry;

use rand::rngs::SmallRng;
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::time::{sleep, Duration};

/// Nudges every approach's volume by up to +/-10 vehicles and recomputes its
/// wait time from the new volume plus noise. Both stay non-negative.
pub fn perturb_intersection<R: Rng + ?Sized>(intersection: &mut Intersection, rng: &mut R) {
    for direction in Direction::ALL {
        let change = rng.random_range(-VOLUME_PERTURBATION..=VOLUME_PERTURBATION);
        let current = i64::from(intersection.traffic_volume[direction]);
        let new_volume = u32::try_from((current + change).max(0)).unwrap_or(u32::MAX);

        let noise = rng.random_range(-WAIT_NOISE_SECONDS..=WAIT_NOISE_SECONDS);
        let new_wait = BASE_WAIT_SECONDS * (f64::from(new_volume) / VOLUME_NORMALIZER) + noise;

        intersection.traffic_volume[direction] = new_volume;
        intersection.wait_times[direction] = new_wait.max(0.0);
    }
    intersection.touch();
}

/// Samples the observation extras (speeds, pedestrians, emergency vehicles)
/// and snapshots `intersection`.
pub fn observe_intersection<R: Rng + ?Sized>(
    intersection: &Intersection,
    rng: &mut R,
) -> TrafficObservation {
    let average_speed = PerDirection::from_fn(|_| rng.random_range(SPEED_MIN..=SPEED_MAX));
    let pedestrian_count = rng.random_range(0..=PEDESTRIAN_MAX);
    let emergency_vehicle_count = u32::from(rng.random_bool(EMERGENCY_PROBABILITY));
    TrafficObservation::capture(
        intersection,
        average_speed,
        pedestrian_count,
        emergency_vehicle_count,
    )
}

/// One firing of the simulation loop. Perturbs up to `sample_size` distinct
/// intersections, records one observation for each and appends them to
/// `history`. Returns the number of intersections updated.
pub fn simulate_tick<R: Rng + ?Sized>(
    registry: &IntersectionRegistry,
    history: &HistoryStore,
    rng: &mut R,
    sample_size: usize,
) -> usize {
    let sampled = registry.sample_ids(&mut *rng, sample_size);
    let observations: Vec<TrafficObservation> = sampled
        .iter()
        .filter_map(|id| {
            registry.modify(id, |intersection| {
                perturb_intersection(intersection, &mut *rng);
                observe_intersection(intersection, &mut *rng)
            })
        })
        .collect();
    let updated = observations.len();
    history.append_all(observations);
    updated
}

/// The recurring task that drives traffic state while the system runs.
pub struct SimulationLoop {
    pub registry: Arc<IntersectionRegistry>,
    pub history: Arc<HistoryStore>,
    pub running: Arc<AtomicBool>,
    /// Wakes the loop out of its inter-tick sleep on shutdown.
    pub shutdown: Arc<Notify>,
    pub rng: SmallRng,
    pub period: Duration,
    pub sample_size: usize,
}

impl SimulationLoop {
    /// Ticks until the running flag drops. The flag is checked before every
    /// tick; a tick that has started always completes.
    pub async fn run(mut self) -> u64 {
        log::info!(
            "Simulation loop started (period {:?}, sample size {})",
            self.period,
            self.sample_size
        );
        let mut ticks = 0u64;
        while self.running.load(Ordering::Acquire) {
            let updated =
                simulate_tick(&self.registry, &self.history, &mut self.rng, self.sample_size);
            ticks += 1;
            log::debug!(
                "Tick {}: updated {} intersections, {} observations retained",
                ticks,
                updated,
                self.history.len()
            );

            tokio::select! {
                _ = sleep(self.period) => {}
                _ = self.shutdown.notified() => {}
            }
        }
        log::info!("Simulation loop exited after {} ticks", ticks);
        ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn registry_of(n: usize) -> IntersectionRegistry {
        let registry = IntersectionRegistry::new();
        for i in 0..n {
            registry
                .insert(
                    Intersection::builder(format!("t{i}"), "Testville")
                        .traffic_volume(PerDirection::from_fn(|_| 3))
                        .wait_times(PerDirection::from_fn(|_| 15.0))
                        .build(),
                )
                .unwrap();
        }
        registry
    }

    #[test]
    fn tick_samples_whole_small_registry() {
        let registry = registry_of(50);
        let history = HistoryStore::default();
        let mut before = Vec::new();
        registry.visit(|i| before.push(i.last_updated));

        std::thread::sleep(std::time::Duration::from_millis(5));
        let mut rng = SmallRng::seed_from_u64(11);
        assert_eq!(simulate_tick(&registry, &history, &mut rng, 100), 50);

        let mut after = Vec::new();
        registry.visit(|i| after.push(i.last_updated));
        assert!(before.iter().zip(&after).all(|(b, a)| a > b));
        assert_eq!(history.len(), 50);
        for i in 0..50 {
            assert_eq!(history.query(&format!("t{i}"), 24).len(), 1);
        }
    }

    #[test]
    fn tick_caps_sample_size() {
        let registry = registry_of(150);
        let history = HistoryStore::default();
        let mut rng = SmallRng::seed_from_u64(5);
        assert_eq!(simulate_tick(&registry, &history, &mut rng, 100), 100);
        assert_eq!(history.len(), 100);
    }

    #[test]
    fn state_stays_non_negative_over_many_ticks() {
        let registry = registry_of(20);
        let history = HistoryStore::default();
        let mut rng = SmallRng::seed_from_u64(77);
        for _ in 0..200 {
            simulate_tick(&registry, &history, &mut rng, 100);
        }
        registry.visit(|i| {
            assert!(i.wait_times.values().all(|&w| w >= 0.0));
        });
        assert_eq!(history.len(), 20 * 200);
    }

    #[test]
    fn observation_matches_updated_state() {
        let registry = registry_of(1);
        let history = HistoryStore::default();
        let mut rng = SmallRng::seed_from_u64(2);
        simulate_tick(&registry, &history, &mut rng, 100);

        let intersection = registry.get("t0").unwrap();
        let snapshot = history.snapshot();
        let observation = &snapshot[0];
        assert_eq!(observation.vehicle_count, intersection.traffic_volume);
        for direction in Direction::ALL {
            let expected = (intersection.wait_times[direction] / 5.0).floor() as u32;
            assert_eq!(observation.queue_length[direction], expected);
            assert!((15.0..=45.0).contains(&observation.average_speed[direction]));
        }
        assert!(observation.pedestrian_count <= 20);
        assert!(observation.emergency_vehicle_count <= 1);
    }

    #[test]
    fn perturbation_bounds() {
        let mut intersection = Intersection::builder("t", "Testville")
            .traffic_volume(PerDirection::from_fn(|_| 50))
            .build();
        let mut rng = SmallRng::seed_from_u64(8);
        perturb_intersection(&mut intersection, &mut rng);
        for direction in Direction::ALL {
            let volume = intersection.traffic_volume[direction];
            assert!((40..=60).contains(&volume));
            let wait = intersection.wait_times[direction];
            let center = 20.0 * f64::from(volume) / 50.0;
            assert!((wait - center).abs() <= 5.0 + 1e-9);
        }
    }

    #[tokio::test]
    async fn loop_exits_once_flag_drops() {
        let registry = Arc::new(registry_of(10));
        let history = Arc::new(HistoryStore::default());
        let running = Arc::new(AtomicBool::new(true));
        let shutdown = Arc::new(Notify::new());
        let task = tokio::spawn(
            SimulationLoop {
                registry: Arc::clone(&registry),
                history: Arc::clone(&history),
                running: Arc::clone(&running),
                shutdown: Arc::clone(&shutdown),
                rng: SmallRng::seed_from_u64(1),
                period: Duration::from_millis(20),
                sample_size: 100,
            }
            .run(),
        );

        sleep(Duration::from_millis(70)).await;
        running.store(false, Ordering::Release);
        shutdown.notify_one();
        let ticks = task.await.unwrap();
        assert!(ticks >= 1);
        assert_eq!(history.len() as u64, ticks * 10);
    }
}
