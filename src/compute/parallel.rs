use crate::error::SimResult;
use crate::simulation::{PathChange, RoadNetwork, SimulationState};
use anyhow::Result;
use rayon::prelude::*;
use std::sync::Arc;
use super::SimulationBackend;

/// Ticks vehicles on the rayon pool.
///
/// Vehicles only read the network and write their own state, so no locking
/// is involved; each one draws turns from its own generator, which keeps the
/// result identical to [`SequentialBackend`](super::SequentialBackend).
pub struct ParallelBackend {
    network: Arc<RoadNetwork>,
}

impl ParallelBackend {
    pub fn new(network: Arc<RoadNetwork>) -> Self {
        log::info!("Parallel backend using {} threads", rayon::current_num_threads());
        Self { network }
    }

    pub fn network(&self) -> &RoadNetwork {
        &self.network
    }
}

impl SimulationBackend for ParallelBackend {
    fn update(&mut self, state: &mut SimulationState) -> Result<Vec<PathChange>> {
        let dt = state.dt;
        let network = &*self.network;

        let changes: SimResult<Vec<Option<PathChange>>> = state
            .agents
            .par_iter_mut()
            .map(|agent| {
                let event = agent.tick(network, dt)?;
                Ok(PathChange::from_event(agent.id(), &event))
            })
            .collect();

        state.advance_clock();
        Ok(changes?.into_iter().flatten().collect())
    }

    fn get_name(&self) -> &'static str {
        "Parallel"
    }

    fn is_parallel(&self) -> bool {
        true
    }
}
