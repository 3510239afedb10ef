use thiserror::Error;

use crate::topology::CellIndex;

/// Errors surfaced by grid construction, configuration and lookups.
///
/// A full bucket is not an error: inserts past `cell_capacity` are dropped
/// and reported through [`crate::Insertion::stored`].
#[derive(Error, Debug)]
pub enum GridError {
    #[error("position ({x}, {y}) lies outside the grid bounds")]
    OutOfRange { x: f32, y: f32 },
    #[error("cell {0} does not exist in this grid")]
    InvalidCell(CellIndex),
    #[error("invalid grid dimensions {cells_x}x{cells_y}")]
    InvalidDimensions { cells_x: u32, cells_y: u32 },
    #[error("world bounds must have a positive, finite size (got {width}x{height})")]
    InvalidBounds { width: f32, height: f32 },
    #[error("cell capacity {0} is not usable")]
    InvalidCapacity(u32),
    #[error("query radius must be finite and non-negative (got {0})")]
    InvalidRadius(f32),
    #[error("config parse error: {0}")]
    Config(#[from] serde_json::Error),
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),
}

impl GridError {
    /// True for the caller-error kinds: a position or cell outside the grid.
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, GridError::OutOfRange { .. } | GridError::InvalidCell(_))
    }
}
