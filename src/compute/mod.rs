use crate::simulation::{PathChange, RoadNetwork, SimulationState};
use anyhow::Result;
use std::sync::Arc;

#[cfg(feature = "parallel")]
pub mod parallel;

pub mod sequential;

pub use sequential::*;

#[cfg(feature = "parallel")]
pub use parallel::*;

/// Advances every vehicle by one tick of `state.dt`.
///
/// Returns the path changes of the tick, in agent order.
pub trait SimulationBackend {
    fn update(&mut self, state: &mut SimulationState) -> Result<Vec<PathChange>>;
    fn get_name(&self) -> &'static str;
    fn is_parallel(&self) -> bool;
}

pub enum ComputeBackend {
    Sequential(SequentialBackend),
    #[cfg(feature = "parallel")]
    Parallel(ParallelBackend),
}

impl ComputeBackend {
    pub fn new_sequential(network: Arc<RoadNetwork>) -> Self {
        ComputeBackend::Sequential(SequentialBackend::new(network))
    }

    #[cfg(feature = "parallel")]
    pub fn new_parallel(network: Arc<RoadNetwork>) -> Result<Self> {
        Ok(ComputeBackend::Parallel(ParallelBackend::new(network)))
    }

    #[cfg(not(feature = "parallel"))]
    pub fn new_parallel(_network: Arc<RoadNetwork>) -> Result<Self> {
        anyhow::bail!("Parallel stepping not compiled in. Enable 'parallel' feature.")
    }

    pub fn network(&self) -> &RoadNetwork {
        match self {
            ComputeBackend::Sequential(backend) => backend.network(),
            #[cfg(feature = "parallel")]
            ComputeBackend::Parallel(backend) => backend.network(),
        }
    }
}

impl SimulationBackend for ComputeBackend {
    fn update(&mut self, state: &mut SimulationState) -> Result<Vec<PathChange>> {
        match self {
            ComputeBackend::Sequential(backend) => backend.update(state),
            #[cfg(feature = "parallel")]
            ComputeBackend::Parallel(backend) => backend.update(state),
        }
    }

    fn get_name(&self) -> &'static str {
        match self {
            ComputeBackend::Sequential(backend) => backend.get_name(),
            #[cfg(feature = "parallel")]
            ComputeBackend::Parallel(backend) => backend.get_name(),
        }
    }

    fn is_parallel(&self) -> bool {
        match self {
            ComputeBackend::Sequential(backend) => backend.is_parallel(),
            #[cfg(feature = "parallel")]
            ComputeBackend::Parallel(backend) => backend.is_parallel(),
        }
    }
}
