use anyhow::Result;
use log::info;
use std::sync::Arc;
use std::time::{Duration, Instant};

use grid_traffic::{
    config::SimulationConfig,
    simulation::{FleetManager, PerformanceTracker, RoadNetwork, SimulationState},
    compute::{ComputeBackend, SimulationBackend},
};

fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
    info!("Starting grid traffic simulation (console mode)");

    let mut args = std::env::args().skip(1);
    let network_path = args.next().unwrap_or_else(|| "network.toml".to_string());
    let fleet_path = args.next().unwrap_or_else(|| "fleet.toml".to_string());

    // Load configuration
    let config = SimulationConfig::load_from_files(&network_path, &fleet_path)?;
    info!("Loaded configuration: {} vehicles, network: {}",
          config.fleet.simulation.vehicles,
          config.network.network.name);

    let network = Arc::new(RoadNetwork::from_config(&config.network)?);

    let mut simulation_state = SimulationState::new(config.fleet.simulation.dt);
    let mut fleet = FleetManager::new(&config.fleet)?;
    fleet.populate(&network, &mut simulation_state)?;

    let mut compute_backend = match ComputeBackend::new_parallel(network.clone()) {
        Ok(backend) => backend,
        Err(e) => {
            info!("{}, falling back to sequential stepping", e);
            ComputeBackend::new_sequential(network.clone())
        }
    };
    info!("Compute backend: {}", compute_backend.get_name());

    let mut performance_tracker = PerformanceTracker::new(
        config.fleet.performance.timing_samples as usize
    );

    let total_ticks = (config.fleet.simulation.duration / config.fleet.simulation.dt).ceil() as u64;
    let start_time = Instant::now();
    let mut last_report = Instant::now();
    let mut path_changes = 0usize;

    info!("Running {} ticks ({:.1}s of simulated time)...", total_ticks, config.fleet.simulation.duration);

    while simulation_state.ticks < total_ticks {
        performance_tracker.start_frame();
        performance_tracker.start_simulation();

        path_changes += compute_backend.update(&mut simulation_state)?.len();

        performance_tracker.end_simulation();
        performance_tracker.end_frame();

        // Print status every second of wall time
        if last_report.elapsed() >= Duration::from_secs(1) {
            info!("Tick {}: t={:.1}s, {} vehicles ({} parked), {:.0} ticks/s, sim {:.3}ms",
                  simulation_state.ticks,
                  simulation_state.time,
                  simulation_state.active_agents(),
                  simulation_state.parked_agents(),
                  performance_tracker.fps(),
                  performance_tracker.average_simulation_time().as_secs_f64() * 1000.0
            );
            last_report = Instant::now();
        }
    }

    // Final statistics
    info!("Simulation completed!");
    info!("Wall time: {:.2}s", start_time.elapsed().as_secs_f64());
    info!("Ticks: {}, simulated time: {:.1}s", simulation_state.ticks, simulation_state.time);
    info!("Path changes: {}", path_changes);
    for pose in simulation_state.poses() {
        log::debug!("Vehicle {} at ({:.2}, {:.2}, {:.2}) yaw {:.2}",
                    pose.id.0, pose.position.x, pose.position.y, pose.position.z, pose.yaw);
    }

    Ok(())
}
