// simulation_engine/mod.rs
pub mod intersections;
pub mod simulation;

pub use intersections::{create_city_intersections, IntersectionRegistry};
pub use simulation::{simulate_tick, SimulationLoop};
