// models/mod.rs
pub mod direction;
pub mod intersection;
pub mod observation;

pub use direction::{Direction, LightState, PerDirection};
pub use intersection::{GeoPoint, Intersection, IntersectionBuilder, TimingPlan};
pub use observation::TrafficObservation;
