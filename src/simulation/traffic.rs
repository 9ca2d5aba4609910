use super::{AgentId, RoadNetwork, SimulationState, VehicleAgent};
use crate::config::{DrivingConfig, FleetConfig, SpawnPoint};
use anyhow::{Result, anyhow};
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

/// Places vehicles on the network according to the fleet configuration.
pub struct FleetManager {
    spawn_points: Vec<SpawnPoint>,
    driving: DrivingConfig,
    target_vehicles: u32,
    seed: Option<u64>,
    next_agent_id: usize,
    next_spawn_point: usize,
    speed_distribution: Option<Normal<f32>>,
    rng: StdRng,
}

impl FleetManager {
    pub fn new(fleet: &FleetConfig) -> Result<Self> {
        let seed = fleet.random.seed;
        let rng = if let Some(seed) = seed {
            StdRng::seed_from_u64(seed)
        } else {
            StdRng::from_entropy()
        };

        let speed_distribution = if fleet.driving.speed_variance > 0.0 {
            Some(Normal::new(fleet.driving.speed, fleet.driving.speed_variance)
                .map_err(|e| anyhow!("Invalid speed distribution: {}", e))?)
        } else {
            None
        };

        Ok(Self {
            spawn_points: fleet.spawn_points.clone(),
            driving: fleet.driving.clone(),
            target_vehicles: fleet.simulation.vehicles,
            seed,
            next_agent_id: 0,
            next_spawn_point: 0,
            speed_distribution,
            rng,
        })
    }

    /// Spawns vehicles until the configured fleet size is on the network.
    pub fn populate(&mut self, network: &RoadNetwork, state: &mut SimulationState) -> Result<usize> {
        let mut spawned = 0;
        while (state.active_agents() as u32) < self.target_vehicles {
            self.spawn_next(network, state)?;
            spawned += 1;
        }
        log::info!("Spawned {} vehicles ({} active)", spawned, state.active_agents());
        Ok(spawned)
    }

    /// Spawns one vehicle at the next spawn point, round-robin.
    pub fn spawn_next(&mut self, network: &RoadNetwork, state: &mut SimulationState) -> Result<AgentId> {
        if self.spawn_points.is_empty() {
            return Err(anyhow!("No spawn points configured"));
        }

        let point = self.spawn_points[self.next_spawn_point % self.spawn_points.len()].clone();
        self.next_spawn_point += 1;

        let intersection = network.at_grid(point.row, point.col).ok_or_else(|| {
            anyhow!("Spawn point {} at ({}, {}) has no intersection", point.id, point.row, point.col)
        })?;

        let id = AgentId(self.next_agent_id);
        self.next_agent_id += 1;

        let mut params = self.driving.params();
        params.speed = self.sample_speed();

        let agent = VehicleAgent::spawn(id, network, intersection, point.entry, params, self.agent_rng(id))?;
        log::debug!(
            "Vehicle {} spawned at {} ({}) from {}, speed {:.2}",
            id.0,
            point.id,
            intersection,
            point.entry,
            params.speed
        );

        state.add_agent(agent);
        Ok(id)
    }

    fn sample_speed(&mut self) -> f32 {
        let base = self.driving.speed;
        match &self.speed_distribution {
            // Keep every vehicle moving forward
            Some(normal) => normal.sample(&mut self.rng).max(base * 0.1),
            None => base,
        }
    }

    /// Each vehicle owns its generator so stepping order never changes the
    /// turns it picks.
    fn agent_rng(&mut self, id: AgentId) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed ^ (id.0 as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)),
            None => StdRng::seed_from_u64(self.rng.gen()),
        }
    }
}
