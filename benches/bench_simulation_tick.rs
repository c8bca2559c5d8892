use criterion::{
    black_box, criterion_group, criterion_main, AxisScale, BenchmarkId, Criterion,
    PlotConfiguration,
};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::time::Duration;
use traffic_flow_engine::flow_analyzer::HistoryStore;
use traffic_flow_engine::simulation_engine::{simulate_tick, IntersectionRegistry};

// Registry with `per_city` intersections in each of the given cities.
fn seeded_registry(cities: &[&str], per_city: usize) -> IntersectionRegistry {
    let registry = IntersectionRegistry::new();
    let cities: Vec<String> = cities.iter().map(|c| c.to_string()).collect();
    let mut rng = SmallRng::seed_from_u64(7);
    registry
        .initialize(&cities, per_city..=per_city, &mut rng)
        .unwrap();
    registry
}

fn bench_simulation_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulation_tick");
    group.sample_size(100);
    group.measurement_time(Duration::from_secs(5));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Linear));

    // The smallest registry sits below the per-tick sample cap.
    for &per_city in [20, 500, 800].iter() {
        let registry = seeded_registry(&["New York", "Chicago", "Phoenix"], per_city);
        group.bench_with_input(
            BenchmarkId::from_parameter(per_city * 3),
            &registry,
            |b, registry| {
                // Zero retention keeps memory flat across iterations.
                let history = HistoryStore::new(chrono::Duration::zero());
                let mut rng = SmallRng::seed_from_u64(1);
                b.iter(|| {
                    let updated = simulate_tick(registry, &history, &mut rng, 100);
                    black_box(updated);
                });
            },
        );
    }
    group.finish();
}

fn bench_system_metrics(c: &mut Criterion) {
    let registry = seeded_registry(&["New York", "Los Angeles", "Chicago", "Houston", "Phoenix"], 650);
    let history = HistoryStore::default();
    c.bench_function("collect_system_metrics", |b| {
        b.iter(|| {
            let metrics = traffic_flow_engine::flow_analyzer::collect_system_metrics(
                &registry, &history, None,
            );
            black_box(metrics);
        });
    });
}

criterion_group!(benches, bench_simulation_tick, bench_system_metrics);
criterion_main!(benches);
