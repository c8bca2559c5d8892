// Cities seeded at startup
pub const DEFAULT_CITIES: [&str; 5] = ["New York", "Los Angeles", "Chicago", "Houston", "Phoenix"];

// Registry sizing (inclusive range per city)
pub const MIN_INTERSECTIONS_PER_CITY: usize = 500;
pub const MAX_INTERSECTIONS_PER_CITY: usize = 800;

// Initial randomized state
pub const INITIAL_VOLUME_MIN: u32 = 10;
pub const INITIAL_VOLUME_MAX: u32 = 100;
pub const INITIAL_WAIT_MIN: f64 = 10.0;
pub const INITIAL_WAIT_MAX: f64 = 60.0;

// Simulation loop
pub const TICK_PERIOD_MS: u64 = 10_000;
pub const TICK_SAMPLE_SIZE: usize = 100;
pub const VOLUME_PERTURBATION: i64 = 10;
pub const BASE_WAIT_SECONDS: f64 = 20.0;
pub const VOLUME_NORMALIZER: f64 = 50.0;
pub const WAIT_NOISE_SECONDS: f64 = 5.0;
pub const SPEED_MIN: f64 = 15.0;
pub const SPEED_MAX: f64 = 45.0;
pub const PEDESTRIAN_MAX: u32 = 20;
pub const EMERGENCY_PROBABILITY: f64 = 0.05;
pub const QUEUE_SECONDS_PER_VEHICLE: f64 = 5.0;

// History
pub const RETENTION_DAYS: i64 = 7;
pub const MAX_RETENTION_DAYS: i64 = 36_500;
pub const DEFAULT_LOOKBACK_HOURS: i64 = 24;

// Metrics
pub const BASELINE_WAIT_FACTOR: f64 = 1.15;
pub const EFFICIENCY_CAP_PERCENT: f64 = 15.0;
