use criterion::{black_box, criterion_group, criterion_main, Criterion};
use grid_traffic::{
    config::SimulationConfig,
    simulation::{FleetManager, RoadNetwork, SimulationState},
    compute::{ComputeBackend, SimulationBackend},
};
use std::sync::Arc;

fn load() -> (SimulationConfig, Arc<RoadNetwork>) {
    let config = SimulationConfig::load_from_files("network.toml", "fleet.toml")
        .expect("Failed to load configuration");
    let network = Arc::new(RoadNetwork::from_config(&config.network).expect("Failed to build network"));
    (config, network)
}

fn populated_state(config: &SimulationConfig, network: &RoadNetwork, vehicles: u32) -> SimulationState {
    let mut fleet_config = config.fleet.clone();
    fleet_config.simulation.vehicles = vehicles;

    let mut state = SimulationState::new(fleet_config.simulation.dt);
    let mut fleet = FleetManager::new(&fleet_config).unwrap();
    fleet.populate(network, &mut state).unwrap();
    state
}

fn benchmark_sequential_simulation(c: &mut Criterion) {
    let (config, network) = load();
    let mut backend = ComputeBackend::new_sequential(network.clone());
    let mut state = populated_state(&config, &network, config.fleet.simulation.vehicles);

    c.bench_function("sequential_simulation_update", |b| {
        b.iter(|| {
            backend.update(black_box(&mut state)).unwrap();
        })
    });
}

#[cfg(feature = "parallel")]
fn benchmark_parallel_simulation(c: &mut Criterion) {
    let (config, network) = load();

    if let Ok(mut backend) = ComputeBackend::new_parallel(network.clone()) {
        let mut state = populated_state(&config, &network, config.fleet.simulation.vehicles);

        c.bench_function("parallel_simulation_update", |b| {
            b.iter(|| {
                backend.update(black_box(&mut state)).unwrap();
            })
        });
    }
}

fn benchmark_simulation_scaling(c: &mut Criterion) {
    let (config, network) = load();

    let mut group = c.benchmark_group("simulation_scaling");

    for vehicle_count in [10u32, 100, 1_000, 10_000].iter() {
        let mut sequential = ComputeBackend::new_sequential(network.clone());
        let mut state = populated_state(&config, &network, *vehicle_count);

        group.bench_with_input(
            format!("sequential_{}_vehicles", vehicle_count),
            vehicle_count,
            |b, _vehicle_count| {
                b.iter(|| {
                    sequential.update(black_box(&mut state)).unwrap();
                });
            },
        );

        if let Ok(mut parallel) = ComputeBackend::new_parallel(network.clone()) {
            let mut state = populated_state(&config, &network, *vehicle_count);

            group.bench_with_input(
                format!("parallel_{}_vehicles", vehicle_count),
                vehicle_count,
                |b, _vehicle_count| {
                    b.iter(|| {
                        parallel.update(black_box(&mut state)).unwrap();
                    });
                },
            );
        }
    }

    group.finish();
}

fn benchmark_network_construction(c: &mut Criterion) {
    let (config, _) = load();

    c.bench_function("network_construction", |b| {
        b.iter(|| RoadNetwork::from_config(black_box(&config.network)).unwrap())
    });
}

#[cfg(feature = "parallel")]
criterion_group!(
    benches,
    benchmark_sequential_simulation,
    benchmark_parallel_simulation,
    benchmark_simulation_scaling,
    benchmark_network_construction
);

#[cfg(not(feature = "parallel"))]
criterion_group!(
    benches,
    benchmark_sequential_simulation,
    benchmark_simulation_scaling,
    benchmark_network_construction
);

criterion_main!(benches);
