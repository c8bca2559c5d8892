use crate::error::RegistryError;
use crate::global_variables::{
    INITIAL_VOLUME_MAX, INITIAL_VOLUME_MIN, INITIAL_WAIT_MAX, INITIAL_WAIT_MIN,
};
use crate::models::{Intersection, PerDirection, TimingPlan};
use crate::shared_data::{read_guard, write_guard};
use rand::Rng;
use std::collections::{HashMap, HashSet};
use std::ops::RangeInclusive;
use std::sync::RwLock;

/// Lowercased city name with spaces turned into underscores.
pub fn city_slug(city: &str) -> String {
    city.to_lowercase().replace(' ', "_")
}

/// Creates `count` intersections for `city` with randomized location and
/// randomized initial volumes and wait times.
pub fn create_city_intersections<R: Rng + ?Sized>(
    city: &str,
    count: usize,
    rng: &mut R,
) -> Vec<Intersection> {
    let slug = city_slug(city);
    (0..count)
        .map(|i| {
            Intersection::builder(format!("{slug}_int_{i:04}"), city)
                .name(format!("{city} Intersection {}", i + 1))
                .location(rng.random_range(-90.0..=90.0), rng.random_range(-180.0..=180.0))
                .traffic_volume(PerDirection::from_fn(|_| {
                    rng.random_range(INITIAL_VOLUME_MIN..=INITIAL_VOLUME_MAX)
                }))
                .wait_times(PerDirection::from_fn(|_| {
                    rng.random_range(INITIAL_WAIT_MIN..=INITIAL_WAIT_MAX)
                }))
                .build()
        })
        .collect()
}

#[derive(Debug, Default)]
struct RegistryInner {
    by_id: HashMap<String, RwLock<Intersection>>,
    // Registration order, used for deterministic sampling and city listings.
    order: Vec<String>,
    initialized: bool,
}

impl RegistryInner {
    fn insert(&mut self, intersection: Intersection) {
        self.order.push(intersection.id.clone());
        self.by_id
            .insert(intersection.id.clone(), RwLock::new(intersection));
    }
}

/// Owns every intersection record. The outer lock guards the set of
/// intersections; each record carries its own lock so a writer on one
/// intersection never blocks readers of another.
#[derive(Debug, Default)]
pub struct IntersectionRegistry {
    inner: RwLock<RegistryInner>,
}

impl IntersectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the registry with a random number of intersections per city,
    /// drawn from `per_city`. Returns the total number created. Fails
    /// without touching the registry if it was already seeded or if two
    /// cities produce clashing ids.
    pub fn initialize<R: Rng + ?Sized>(
        &self,
        cities: &[String],
        per_city: RangeInclusive<usize>,
        rng: &mut R,
    ) -> Result<usize, RegistryError> {
        let mut inner = write_guard(&self.inner);
        if inner.initialized || !inner.by_id.is_empty() {
            return Err(RegistryError::AlreadyInitialized);
        }

        let mut created: Vec<Intersection> = Vec::new();
        for city in cities {
            let count = rng.random_range(per_city.clone());
            created.extend(create_city_intersections(city, count, &mut *rng));
        }

        {
            let mut seen = HashSet::with_capacity(created.len());
            if let Some(dup) = created.iter().find(|i| !seen.insert(i.id.as_str())) {
                return Err(RegistryError::DuplicateId { id: dup.id.clone() });
            }
        }

        let total = created.len();
        for intersection in created {
            inner.insert(intersection);
        }
        inner.initialized = true;
        log::info!(
            "Initialized {} intersections across {} cities",
            total,
            cities.len()
        );
        Ok(total)
    }

    /// Adds a fully built intersection. Ids are never reused.
    pub fn insert(&self, intersection: Intersection) -> Result<(), RegistryError> {
        let mut inner = write_guard(&self.inner);
        if inner.by_id.contains_key(&intersection.id) {
            return Err(RegistryError::DuplicateId {
                id: intersection.id,
            });
        }
        inner.insert(intersection);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<Intersection> {
        let inner = read_guard(&self.inner);
        inner.by_id.get(id).map(|entry| read_guard(entry).clone())
    }

    /// Case-insensitive exact match on city, in registration order.
    pub fn get_by_city(&self, city: &str) -> Vec<Intersection> {
        let wanted = city.to_lowercase();
        let inner = read_guard(&self.inner);
        inner
            .order
            .iter()
            .filter_map(|id| inner.by_id.get(id))
            .map(|entry| read_guard(entry))
            .filter(|intersection| intersection.city.to_lowercase() == wanted)
            .map(|intersection| intersection.clone())
            .collect()
    }

    /// Replaces the timing plan of `id` after validating every phase.
    /// Leaves the registry untouched on failure.
    pub fn update_timing(&self, id: &str, plan: TimingPlan) -> Result<(), RegistryError> {
        plan.validate()?;
        let inner = read_guard(&self.inner);
        let entry = inner.by_id.get(id).ok_or_else(|| RegistryError::NotFound {
            id: id.to_string(),
        })?;
        let mut intersection = write_guard(entry);
        intersection.timing_plan = plan;
        intersection.touch();
        log::info!("Updated timing plan for intersection {}", id);
        Ok(())
    }

    pub fn count(&self) -> usize {
        read_guard(&self.inner).by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Draws up to `amount` distinct ids uniformly at random.
    pub fn sample_ids<R: Rng + ?Sized>(&self, rng: &mut R, amount: usize) -> Vec<String> {
        let inner = read_guard(&self.inner);
        let amount = amount.min(inner.order.len());
        rand::seq::index::sample(rng, inner.order.len(), amount)
            .into_iter()
            .map(|i| inner.order[i].clone())
            .collect()
    }

    /// Runs `f` on the record for `id` while holding its write lock.
    pub fn modify<T>(&self, id: &str, f: impl FnOnce(&mut Intersection) -> T) -> Option<T> {
        let inner = read_guard(&self.inner);
        let entry = inner.by_id.get(id)?;
        let mut intersection = write_guard(entry);
        Some(f(&mut *intersection))
    }

    /// Visits every intersection, in registration order, under read locks.
    pub fn visit(&self, mut f: impl FnMut(&Intersection)) {
        let inner = read_guard(&self.inner);
        for entry in inner.order.iter().filter_map(|id| inner.by_id.get(id)) {
            f(&*read_guard(entry));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Direction;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn cities(names: &[&str]) -> Vec<String> {
        names.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn initialize_draws_counts_within_range() {
        let registry = IntersectionRegistry::new();
        let mut rng = SmallRng::seed_from_u64(42);
        let total = registry
            .initialize(&cities(&["New York", "Chicago"]), 500..=800, &mut rng)
            .unwrap();
        assert_eq!(total, registry.count());
        assert!((1000..=1600).contains(&total));

        let ny = registry.get_by_city("new york");
        let chicago = registry.get_by_city("CHICAGO");
        assert!((500..=800).contains(&ny.len()));
        assert_eq!(ny.len() + chicago.len(), total);
        assert_eq!(ny[0].id, "new_york_int_0000");
        assert_eq!(ny[0].name, "New York Intersection 1");
    }

    #[test]
    fn initialized_records_are_in_range() {
        let registry = IntersectionRegistry::new();
        let mut rng = SmallRng::seed_from_u64(1);
        registry
            .initialize(&cities(&["Phoenix"]), 20..=20, &mut rng)
            .unwrap();
        registry.visit(|i| {
            for d in Direction::ALL {
                assert!((10..=100).contains(&i.traffic_volume[d]));
                assert!((10.0..=60.0).contains(&i.wait_times[d]));
            }
            assert!((-90.0..=90.0).contains(&i.location.latitude));
            assert!((-180.0..=180.0).contains(&i.location.longitude));
            assert_eq!(i.timing_plan, TimingPlan::default());
        });
        assert!(registry.get("phoenix_int_0019").is_some());
        assert!(registry.get("phoenix_int_0020").is_none());
    }

    #[test]
    fn second_initialize_is_rejected() {
        let registry = IntersectionRegistry::new();
        let mut rng = SmallRng::seed_from_u64(3);
        registry
            .initialize(&cities(&["Houston"]), 5..=5, &mut rng)
            .unwrap();
        assert_eq!(
            registry.initialize(&cities(&["Houston"]), 5..=5, &mut rng),
            Err(RegistryError::AlreadyInitialized)
        );
        assert_eq!(registry.count(), 5);
    }

    #[test]
    fn clashing_city_slugs_leave_registry_empty() {
        let registry = IntersectionRegistry::new();
        let mut rng = SmallRng::seed_from_u64(3);
        let err = registry
            .initialize(&cities(&["Los Angeles", "los angeles"]), 2..=2, &mut rng)
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateId { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn update_timing_rejects_unknown_and_invalid() {
        let registry = IntersectionRegistry::new();
        registry
            .insert(Intersection::builder("t1", "Testville").build())
            .unwrap();
        let before = registry.get("t1").unwrap();

        let plan: TimingPlan = [("north_south_green", 30)].into_iter().collect();
        assert_eq!(
            registry.update_timing("nonexistent", plan.clone()),
            Err(RegistryError::NotFound {
                id: "nonexistent".to_string()
            })
        );
        let zero: TimingPlan = [("north_south_green", 0)].into_iter().collect();
        assert!(matches!(
            registry.update_timing("t1", zero),
            Err(RegistryError::InvalidTiming { .. })
        ));
        assert_eq!(registry.get("t1").unwrap(), before);

        registry.update_timing("t1", plan.clone()).unwrap();
        let after = registry.get("t1").unwrap();
        assert_eq!(after.timing_plan, plan);
        assert!(after.last_updated >= before.last_updated);
    }

    #[test]
    fn insert_refuses_duplicate_ids() {
        let registry = IntersectionRegistry::new();
        registry
            .insert(Intersection::builder("t1", "A").build())
            .unwrap();
        assert!(registry
            .insert(Intersection::builder("t1", "B").build())
            .is_err());
        assert_eq!(registry.get("t1").unwrap().city, "A");
    }

    #[test]
    fn sample_is_capped_and_distinct() {
        let registry = IntersectionRegistry::new();
        for i in 0..30 {
            registry
                .insert(Intersection::builder(format!("t{i}"), "Testville").build())
                .unwrap();
        }
        let mut rng = SmallRng::seed_from_u64(9);
        let mut ids = registry.sample_ids(&mut rng, 100);
        assert_eq!(ids.len(), 30);
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 30);
        assert_eq!(registry.sample_ids(&mut rng, 10).len(), 10);
    }
}
