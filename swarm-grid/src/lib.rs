//! # swarm-grid — fixed-capacity spatial hash grid
//!
//! Broad-phase proximity queries for large, dynamic 2-D populations that are
//! rebuilt every frame.
//!
//! ## Architecture
//!
//! ```text
//!  GridConfig ──▸ GridTopology ──(read-only)──▸ SpatialGrid ──▸ QueryResult
//!                 cell size                     buckets         9 × capacity
//!                 neighbour table               add / clear     ids
//!                 border flags                  find
//! ```
//!
//! ## Modules
//!
//! - [`config`] — construction-time configuration, JSON loading
//! - [`topology`] — cell mapping and precomputed Moore neighbourhoods
//! - [`grid`] — bucket store and neighbourhood queries
//! - [`query`] — fixed-capacity query result buffer
//! - [`error`] — [`GridError`]
//!
//! ## Example
//!
//! ```
//! use swarm_core::Vec2;
//! use swarm_grid::{GridConfig, SpatialGrid};
//!
//! let mut grid = SpatialGrid::new(&GridConfig::for_testing()).unwrap();
//! grid.clear();
//! let ins = grid.add_object(Vec2::new(10.0, 10.0), 1).unwrap();
//! grid.add_object(Vec2::new(390.0, 390.0), 2).unwrap();
//!
//! // The 4x4 grid wraps, so the opposite corner is a neighbour.
//! let found = grid.find(ins.cell).unwrap();
//! assert!(found.contains(1) && found.contains(2));
//! ```

pub mod config;
pub mod error;
pub mod grid;
pub mod query;
pub mod topology;

pub use config::GridConfig;
pub use error::GridError;
pub use grid::{Insertion, ObjectId, OccupancyStats, RebuildStats, SpatialGrid};
pub use query::QueryResult;
pub use topology::{
    bounds_margin, CellCoord, CellIndex, EdgeMode, GridTopology, BOUNDS_EPSILON, NEIGHBORHOOD,
};
