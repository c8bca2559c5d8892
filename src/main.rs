use std::error::Error;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use traffic_flow_engine::monitoring::write_observations_csv;
use traffic_flow_engine::{SubsystemEngine, SystemConfig, TrafficSystem};

fn load_config() -> Result<SystemConfig, Box<dyn Error>> {
    match std::env::var("TRAFFIC_CONFIG") {
        Ok(path) => Ok(SystemConfig::from_file(Path::new(&path))?),
        Err(_) => Ok(SystemConfig::default()),
    }
}

fn export_history(system: &TrafficSystem, path: &str) -> Result<(), Box<dyn Error>> {
    let file = File::create(path)?;
    let rows = write_observations_csv(file, &system.history().snapshot())?;
    log::info!("Exported {} observations to {}", rows, path);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let config = load_config()?;
    let optimizer = Arc::new(SubsystemEngine::signal_optimizer());
    let simulator = Arc::new(SubsystemEngine::traffic_simulator());
    let system = TrafficSystem::new(config)?
        .with_optimizer(optimizer.clone())
        .with_simulator(simulator.clone());

    log::info!("Starting Traffic Flow Optimization Engine...");
    system.initialize()?;
    system.start()?;
    simulator.start();
    optimizer.start();

    log::info!("Traffic optimization system started");
    log::info!("  Managing {} intersections", system.intersection_count());
    log::info!("  Simulation tick every {:?}", system.config().tick_period());

    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
    }

    log::info!("Shutting down traffic optimization system...");
    optimizer.stop();
    simulator.stop();
    system.stop().await;

    if let Ok(path) = std::env::var("TRAFFIC_HISTORY_CSV") {
        if let Err(e) = export_history(&system, &path) {
            log::error!("History export failed: {}", e);
        }
    }

    let metrics = system.get_system_metrics();
    log::info!("Final metrics: {}", serde_json::to_string(&metrics)?);
    log::info!("System shutdown complete");
    Ok(())
}
