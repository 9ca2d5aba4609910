use crate::simulation::{PathChange, RoadNetwork, SimulationState};
use anyhow::Result;
use std::sync::Arc;
use super::SimulationBackend;

pub struct SequentialBackend {
    network: Arc<RoadNetwork>,
}

impl SequentialBackend {
    pub fn new(network: Arc<RoadNetwork>) -> Self {
        Self { network }
    }

    pub fn network(&self) -> &RoadNetwork {
        &self.network
    }
}

impl SimulationBackend for SequentialBackend {
    fn update(&mut self, state: &mut SimulationState) -> Result<Vec<PathChange>> {
        let dt = state.dt;
        let mut changes = Vec::new();

        for agent in &mut state.agents {
            let event = agent.tick(&self.network, dt)?;
            changes.extend(PathChange::from_event(agent.id(), &event));
        }

        state.advance_clock();
        Ok(changes)
    }

    fn get_name(&self) -> &'static str {
        "Sequential"
    }

    fn is_parallel(&self) -> bool {
        false
    }
}
