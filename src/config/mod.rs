use anyhow::{Result, anyhow};
use crate::simulation::GridLayout;

pub mod roads;
pub mod fleet;

pub use roads::*;
pub use fleet::*;

#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub network: NetworkConfig,
    pub fleet: FleetConfig,
}

impl SimulationConfig {
    pub fn load_from_files(network_path: &str, fleet_path: &str) -> Result<Self> {
        let network_content = std::fs::read_to_string(network_path)?;
        let fleet_content = std::fs::read_to_string(fleet_path)?;

        Self::from_toml(&network_content, &fleet_content)
    }

    pub fn from_toml(network_content: &str, fleet_content: &str) -> Result<Self> {
        let network: NetworkConfig = toml::from_str(network_content)?;
        let fleet: FleetConfig = toml::from_str(fleet_content)?;

        // Validate configurations
        network.validate()?;
        fleet.validate()?;

        let config = SimulationConfig { network, fleet };
        config.validate()?;
        Ok(config)
    }
}

impl Validate for SimulationConfig {
    fn validate(&self) -> Result<()> {
        // Spawn points must sit on an intersection, on a side with a road
        let layout = GridLayout::from_config(&self.network.network.layout)?;
        for point in &self.fleet.spawn_points {
            if point.row >= layout.row_count() || point.col >= layout.column_count() {
                return Err(anyhow!("Spawn point {} is out of grid bounds at ({}, {})", point.id, point.row, point.col));
            }

            let pos = (point.row, point.col);
            if !layout.has_node(pos) {
                return Err(anyhow!("Spawn point {} at ({}, {}) is not on an intersection", point.id, point.row, point.col));
            }

            if !layout.connected_sides(pos).contains(point.entry) {
                return Err(anyhow!("Spawn point {} at ({}, {}) has no road on its {} side", point.id, point.row, point.col, point.entry));
            }
        }

        Ok(())
    }
}

pub trait Validate {
    fn validate(&self) -> Result<()>;
}
