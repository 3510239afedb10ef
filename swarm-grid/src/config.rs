use serde::{Deserialize, Serialize};
use std::path::Path;
use swarm_core::Rect;

use crate::error::GridError;
use crate::topology::EdgeMode;

/// Construction-time grid configuration.
///
/// Everything here is fixed for the lifetime of a [`crate::SpatialGrid`];
/// there is no runtime reconfiguration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Number of cell columns. Default: 80.
    pub cells_x: u32,
    /// Number of cell rows. Default: 45.
    pub cells_y: u32,
    /// Maximum ids a single cell holds; further inserts are dropped. Default: 85.
    pub cell_capacity: u32,
    /// World rectangle covered by the grid. Default: 1920x1080 at the origin.
    pub world: Rect,
    /// Neighbour behaviour at the grid edges. Default: wrap.
    pub edges: EdgeMode,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cells_x: 80,
            cells_y: 45,
            cell_capacity: 85,
            world: Rect::from_size(1920.0, 1080.0),
            edges: EdgeMode::Wrap,
        }
    }
}

impl GridConfig {
    /// Small 4x4 grid over a 400x400 world, two ids per cell.
    pub fn for_testing() -> Self {
        Self {
            cells_x: 4,
            cells_y: 4,
            cell_capacity: 2,
            world: Rect::from_size(400.0, 400.0),
            edges: EdgeMode::Wrap,
        }
    }

    /// Check every field without building anything.
    pub fn validate(&self) -> Result<(), GridError> {
        let total = match self.cells_x.checked_mul(self.cells_y) {
            Some(total) if self.cells_x > 0 && self.cells_y > 0 => total as usize,
            _ => {
                return Err(GridError::InvalidDimensions {
                    cells_x: self.cells_x,
                    cells_y: self.cells_y,
                })
            }
        };
        if !self.world.has_area() || !self.world.origin().is_finite() {
            return Err(GridError::InvalidBounds {
                width: self.world.width,
                height: self.world.height,
            });
        }
        if self.cell_capacity == 0 || total.checked_mul(self.cell_capacity as usize).is_none() {
            return Err(GridError::InvalidCapacity(self.cell_capacity));
        }
        Ok(())
    }

    /// Parse and validate a JSON document.  Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, GridError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GridError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&contents)?;
        log::info!(
            "Loaded grid config from {}: {}x{} cells, capacity {}",
            path.display(),
            config.cells_x,
            config.cells_y,
            config.cell_capacity
        );
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String, GridError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
