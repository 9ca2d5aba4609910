use grid_traffic::{
    config::SimulationConfig,
    simulation::{FleetManager, RoadNetwork, SimulationState},
    compute::{ComputeBackend, SimulationBackend},
};
use anyhow::Result;
use std::sync::Arc;

fn populated_state(config: &SimulationConfig, network: &RoadNetwork) -> Result<SimulationState> {
    let mut state = SimulationState::new(config.fleet.simulation.dt);
    let mut fleet = FleetManager::new(&config.fleet)?;
    fleet.populate(network, &mut state)?;
    Ok(state)
}

/// Test that sequential and parallel stepping produce identical results with the same seed
#[test]
fn test_sequential_parallel_consistency() -> Result<()> {
    let config = SimulationConfig::load_from_files("network.toml", "fleet.toml")?;
    let network = Arc::new(RoadNetwork::from_config(&config.network)?);

    let mut sequential = ComputeBackend::new_sequential(network.clone());
    let mut parallel = match ComputeBackend::new_parallel(network.clone()) {
        Ok(backend) => backend,
        Err(e) => {
            println!("Skipping parallel test: {}", e);
            return Ok(());
        }
    };
    assert!(!sequential.is_parallel());
    assert!(parallel.is_parallel());

    let mut sequential_state = populated_state(&config, &network)?;
    let mut parallel_state = populated_state(&config, &network)?;
    assert_eq!(sequential_state.active_agents(), 12);

    let steps = 600;
    let mut total_changes = 0;
    for step in 0..steps {
        let sequential_changes = sequential.update(&mut sequential_state)?;
        let parallel_changes = parallel.update(&mut parallel_state)?;
        assert_eq!(sequential_changes, parallel_changes, "Path changes differ at step {}", step);
        total_changes += sequential_changes.len();

        for (a, b) in sequential_state.agents.iter().zip(&parallel_state.agents) {
            assert_eq!(a.id(), b.id());
            assert_eq!(a.position(), b.position(), "Vehicle {} position differs at step {}", a.id().0, step);
            assert_eq!(a.velocity(), b.velocity(), "Vehicle {} velocity differs at step {}", a.id().0, step);
            assert_eq!(a.next_intersection(), b.next_intersection());
        }
    }

    assert_eq!(sequential_state.ticks, steps);
    assert_eq!(sequential_state.ticks, parallel_state.ticks);
    assert!(total_changes > 0, "No vehicle reached an intersection in {} ticks", steps);

    println!("✓ {} ticks matched with {} path changes", steps, total_changes);
    Ok(())
}

/// Test that the same seed spawns the same fleet
#[test]
fn test_spawn_consistency() -> Result<()> {
    let config = SimulationConfig::load_from_files("network.toml", "fleet.toml")?;
    let network = RoadNetwork::from_config(&config.network)?;

    let first = populated_state(&config, &network)?;
    let second = populated_state(&config, &network)?;

    assert_eq!(first.total_spawned, config.fleet.simulation.vehicles);
    assert_eq!(first.total_spawned, second.total_spawned);
    for (a, b) in first.agents.iter().zip(&second.agents) {
        assert_eq!(a.speed(), b.speed());
        assert_eq!(a.position(), b.position());
        assert_eq!(a.exit_direction(), b.exit_direction());
        assert!(a.speed() > 0.0);
    }

    // Round-robin over the three spawn points
    let spawn_sites: Vec<_> = first.agents.iter().map(|a| a.current_intersection()).collect();
    assert_eq!(spawn_sites[0], spawn_sites[3]);
    assert_ne!(spawn_sites[0], spawn_sites[1]);
    Ok(())
}
