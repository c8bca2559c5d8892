//! Lifecycle controller for the traffic system.
//!
//! [`TrafficSystem`] is the context object handed to every consumer (the
//! request router, the process supervisor). It owns the intersection
//! registry, the history store, the running flag and the simulation loop
//! task, and exposes the read/query operations the outer layers call.

use crate::config::SystemConfig;
use crate::error::{ConfigError, RegistryError, SystemError};
use crate::flow_analyzer::history::HistoryStore;
use crate::flow_analyzer::metrics::{collect_system_metrics, uptime_seconds, SystemMetrics};
use crate::global_variables::DEFAULT_LOOKBACK_HOURS;
use crate::models::{Intersection, TimingPlan, TrafficObservation};
use crate::monitoring::health::{assess_health, EngineStatus, HealthReport};
use crate::shared_data::{lock_guard, read_guard, write_guard};
use crate::simulation_engine::intersections::IntersectionRegistry;
use crate::simulation_engine::simulation::SimulationLoop;

use chrono::{DateTime, Local};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use tokio::sync::Notify;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleState {
    Uninitialized,
    Initializing,
    Running,
    Stopping,
    Stopped,
}

pub struct TrafficSystem {
    config: SystemConfig,
    registry: Arc<IntersectionRegistry>,
    history: Arc<HistoryStore>,
    running: Arc<AtomicBool>,
    shutdown: Arc<Notify>,
    state: Mutex<LifecycleState>,
    start_time: RwLock<Option<DateTime<Local>>>,
    rng: Mutex<SmallRng>,
    simulation: Mutex<Option<JoinHandle<u64>>>,
    optimizer: Option<Arc<dyn EngineStatus>>,
    simulator: Option<Arc<dyn EngineStatus>>,
}

impl TrafficSystem {
    /// Builds an idle system. Rejects a configuration that fails
    /// [`SystemConfig::validate`].
    pub fn new(config: SystemConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let retention = config.retention()?;
        let seed = config.seed.unwrap_or_else(rand::random);
        log::debug!("Traffic system RNG seed {}", seed);
        Ok(Self {
            history: Arc::new(HistoryStore::new(retention)),
            config,
            registry: Arc::new(IntersectionRegistry::new()),
            running: Arc::new(AtomicBool::new(false)),
            shutdown: Arc::new(Notify::new()),
            state: Mutex::new(LifecycleState::Uninitialized),
            start_time: RwLock::new(None),
            rng: Mutex::new(SmallRng::seed_from_u64(seed)),
            simulation: Mutex::new(None),
            optimizer: None,
            simulator: None,
        })
    }

    /// Reports the optimizer's running flag in health checks.
    pub fn with_optimizer(mut self, optimizer: Arc<dyn EngineStatus>) -> Self {
        self.optimizer = Some(optimizer);
        self
    }

    /// Reports the simulator's running flag in health checks.
    pub fn with_simulator(mut self, simulator: Arc<dyn EngineStatus>) -> Self {
        self.simulator = Some(simulator);
        self
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    pub fn registry(&self) -> &IntersectionRegistry {
        &self.registry
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn state(&self) -> LifecycleState {
        *lock_guard(&self.state)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn start_time(&self) -> Option<DateTime<Local>> {
        *read_guard(&self.start_time)
    }

    /// Seeds the registry from the configured cities, records the start
    /// time and raises the running flag. Only valid once, from
    /// `Uninitialized`.
    pub fn initialize(&self) -> Result<usize, SystemError> {
        {
            let mut state = lock_guard(&self.state);
            if *state != LifecycleState::Uninitialized {
                return Err(SystemError::InvalidTransition {
                    from: *state,
                    action: "initialize",
                });
            }
            *state = LifecycleState::Initializing;
        }
        log::info!("Initializing traffic system...");

        let per_city =
            self.config.min_intersections_per_city..=self.config.max_intersections_per_city;
        let seeded = {
            let mut rng = lock_guard(&self.rng);
            self.registry
                .initialize(&self.config.cities, per_city, &mut *rng)
        };
        let total = match seeded {
            Ok(total) => total,
            Err(e) => {
                *lock_guard(&self.state) = LifecycleState::Uninitialized;
                log::warn!("Traffic system initialization failed: {}", e);
                return Err(e.into());
            }
        };

        *write_guard(&self.start_time) = Some(Local::now());
        self.running.store(true, Ordering::Release);
        *lock_guard(&self.state) = LifecycleState::Running;
        log::info!(
            "Initialized {} intersections across {} cities",
            total,
            self.config.cities.len()
        );
        Ok(total)
    }

    /// Spawns the simulation loop on the current Tokio runtime. Calling it
    /// again while the loop runs is a no-op.
    pub fn start(&self) -> Result<(), SystemError> {
        // Held until the task is stored so a concurrent stop sees the handle.
        let state = lock_guard(&self.state);
        if *state != LifecycleState::Running {
            return Err(SystemError::InvalidTransition {
                from: *state,
                action: "start",
            });
        }
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| SystemError::NoRuntime)?;

        let mut simulation = lock_guard(&self.simulation);
        if simulation.is_some() {
            log::debug!("Simulation loop already running");
            return Ok(());
        }
        let seed: u64 = lock_guard(&self.rng).random();
        let task = SimulationLoop {
            registry: Arc::clone(&self.registry),
            history: Arc::clone(&self.history),
            running: Arc::clone(&self.running),
            shutdown: Arc::clone(&self.shutdown),
            rng: SmallRng::seed_from_u64(seed),
            period: self.config.tick_period(),
            sample_size: self.config.sample_size,
        };
        *simulation = Some(runtime.spawn(task.run()));
        Ok(())
    }

    /// Lowers the running flag, wakes the loop and waits for it to finish
    /// its current tick. Stopping a system that is not running is a no-op.
    pub async fn stop(&self) {
        {
            let mut state = lock_guard(&self.state);
            if *state != LifecycleState::Running {
                log::debug!("Stop requested while {:?}; nothing to do", *state);
                return;
            }
            *state = LifecycleState::Stopping;
        }
        log::info!("Stopping traffic system...");
        self.running.store(false, Ordering::Release);
        self.shutdown.notify_one();

        let task = lock_guard(&self.simulation).take();
        if let Some(task) = task {
            match task.await {
                Ok(ticks) => log::info!("Simulation loop finished after {} ticks", ticks),
                Err(e) => log::warn!("Simulation loop ended abnormally: {}", e),
            }
        }

        *lock_guard(&self.state) = LifecycleState::Stopped;
        log::info!("Traffic system cleanup complete");
    }

    pub fn intersection_count(&self) -> usize {
        self.registry.count()
    }

    pub fn get_intersection(&self, id: &str) -> Option<Intersection> {
        self.registry.get(id)
    }

    pub fn get_intersections_by_city(&self, city: &str) -> Vec<Intersection> {
        self.registry.get_by_city(city)
    }

    /// Replaces the timing plan of `id`. Returns false for an unknown id or
    /// a plan with a zero-length phase, leaving the intersection untouched.
    pub fn update_intersection_timing(&self, id: &str, plan: TimingPlan) -> bool {
        match self.try_update_intersection_timing(id, plan) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Rejected timing update for {}: {}", id, e);
                false
            }
        }
    }

    pub fn try_update_intersection_timing(
        &self,
        id: &str,
        plan: TimingPlan,
    ) -> Result<(), RegistryError> {
        self.registry.update_timing(id, plan)
    }

    pub fn get_traffic_data(&self, id: &str, lookback_hours: i64) -> Vec<TrafficObservation> {
        self.history.query(id, lookback_hours)
    }

    /// Observations for `id` over the last 24 hours.
    pub fn get_recent_traffic_data(&self, id: &str) -> Vec<TrafficObservation> {
        self.get_traffic_data(id, DEFAULT_LOOKBACK_HOURS)
    }

    pub fn get_system_metrics(&self) -> SystemMetrics {
        collect_system_metrics(&self.registry, &self.history, self.start_time())
    }

    pub fn health_check(&self) -> HealthReport {
        assess_health(
            self.is_running(),
            &self.registry,
            &self.history,
            self.optimizer.as_deref(),
            self.simulator.as_deref(),
            uptime_seconds(self.start_time(), Local::now()),
        )
    }
}
