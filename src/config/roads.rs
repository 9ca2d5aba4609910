use serde::{Deserialize, Serialize};
use anyhow::{Result, anyhow};
use super::Validate;
use crate::simulation::GridLayout;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworkConfig {
    pub network: Network,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Network {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub geometry: GeometryConfig,
    pub layout: LayoutConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeometryConfig {
    pub side_length: f32, // combined width of both lanes
    pub buffer: f32,      // sidewalk width
    #[serde(default)]
    pub right_radius: Option<f32>,
    #[serde(default)]
    pub left_radius: Option<f32>,
    pub arc_samples: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LayoutConfig {
    pub columns: Vec<f32>, // x of each node column, left to right
    pub rows: Vec<f32>,    // z of each node row, top to bottom
    pub cells: Vec<String>,
}

impl Validate for NetworkConfig {
    fn validate(&self) -> Result<()> {
        let geometry = &self.network.geometry;

        if geometry.side_length <= 0.0 {
            return Err(anyhow!("Side length must be positive"));
        }

        if geometry.buffer < 0.0 {
            return Err(anyhow!("Sidewalk buffer must be non-negative"));
        }

        if geometry.arc_samples == 0 {
            return Err(anyhow!("Arc sample count must be at least 1"));
        }

        let lane_offset = geometry.side_length / 4.0;
        let anchor_distance = geometry.side_length / 2.0 + geometry.buffer / 2.0;
        let right = geometry.right_radius.unwrap_or(anchor_distance - lane_offset);
        let left = geometry.left_radius.unwrap_or(anchor_distance + lane_offset);

        if right <= 0.0 || left <= 0.0 {
            return Err(anyhow!("Turn radii must be positive"));
        }

        if left <= right {
            return Err(anyhow!("Left turn radius ({}) must be larger than right turn radius ({})", left, right));
        }

        let layout = GridLayout::from_config(&self.network.layout)?;
        if layout.nodes().is_empty() {
            return Err(anyhow!("Layout contains no intersections"));
        }

        Ok(())
    }
}
