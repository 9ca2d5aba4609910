use serde::{Deserialize, Serialize};
use anyhow::{Result, anyhow};
use super::Validate;
use crate::simulation::{DeadEndPolicy, Direction, DrivingParams};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FleetConfig {
    pub simulation: SimulationParams,
    pub driving: DrivingConfig,
    #[serde(default)]
    pub spawn_points: Vec<SpawnPoint>,
    #[serde(default)]
    pub random: RandomConfig,
    pub performance: PerformanceConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimulationParams {
    pub vehicles: u32,
    pub dt: f32,       // seconds per tick
    pub duration: f32, // seconds
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DrivingConfig {
    pub speed: f32,
    #[serde(default)]
    pub speed_variance: f32, // standard deviation of the per-vehicle speed
    pub arrival_tolerance: f32,
    pub ground_clearance: f32,
    #[serde(default)]
    pub dead_end_policy: DeadEndPolicy,
}

impl DrivingConfig {
    pub fn params(&self) -> DrivingParams {
        DrivingParams {
            speed: self.speed,
            arrival_tolerance: self.arrival_tolerance,
            ground_clearance: self.ground_clearance,
            dead_end_policy: self.dead_end_policy,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SpawnPoint {
    pub id: String,
    pub row: usize,
    pub col: usize,
    pub entry: Direction, // side the vehicle arrives from
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RandomConfig {
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PerformanceConfig {
    pub timing_samples: u32,
}

impl Validate for FleetConfig {
    fn validate(&self) -> Result<()> {
        let sim = &self.simulation;
        if sim.dt <= 0.0 {
            return Err(anyhow!("Tick length must be positive"));
        }

        if sim.duration <= 0.0 {
            return Err(anyhow!("Simulation duration must be positive"));
        }

        if sim.vehicles > 0 && self.spawn_points.is_empty() {
            return Err(anyhow!("At least one spawn point is required to place {} vehicles", sim.vehicles));
        }

        let driving = &self.driving;
        if driving.speed <= 0.0 {
            return Err(anyhow!("Vehicle speed must be positive"));
        }

        if driving.speed_variance < 0.0 {
            return Err(anyhow!("Speed variance must be non-negative"));
        }

        if driving.arrival_tolerance <= 0.0 {
            return Err(anyhow!("Arrival tolerance must be positive"));
        }

        if driving.ground_clearance < 0.0 {
            return Err(anyhow!("Ground clearance must be non-negative"));
        }

        if self.performance.timing_samples == 0 {
            return Err(anyhow!("Timing samples must be greater than zero"));
        }

        Ok(())
    }
}
