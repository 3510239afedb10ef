//! Grid topology: everything about the grid that is fixed at construction.
//!
//! Converts a world rectangle and a cell-count pair into a cell size, a
//! position → cell mapping and a precomputed Moore neighbourhood per cell.
//!
//! # Neighbour order
//!
//! Neighbours are enumerated with `dx` as the outer loop and `dy` as the
//! inner loop, both over `-1..=1`:
//!
//! ```text
//!   slot:   0        1        2        3       4       5       6        7        8
//!   cell: (x-1,y-1) (x-1,y) (x-1,y+1) (x,y-1) (x,y) (x,y+1) (x+1,y-1) (x+1,y) (x+1,y+1)
//! ```
//!
//! Query results concatenate buckets in exactly this order.

use serde::{Deserialize, Serialize};
use std::fmt;
use swarm_core::{Rect, Vec2};

use crate::error::GridError;

/// Minimum outward margin added to the world bounds on every side, so that a
/// position lying exactly on the world boundary still maps into the grid.
///
/// Large worlds get a wider margin: a few f32 ulps of their largest
/// coordinate, see [`bounds_margin`].
pub const BOUNDS_EPSILON: f32 = 1e-3;

/// Size of a Moore neighbourhood (the cell itself plus its 8 neighbours).
pub const NEIGHBORHOOD: usize = 9;

// ───────────────────────────────────────────────────────────────────
// Index types
// ───────────────────────────────────────────────────────────────────

/// Row-major linear cell index: `cell_y * cells_x + cell_x`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellIndex(pub u32);

impl CellIndex {
    #[inline(always)]
    pub fn get(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for CellIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Two-dimensional cell coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellCoord {
    pub x: u32,
    pub y: u32,
}

impl CellCoord {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// What lies beyond the grid edges.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeMode {
    /// Opposite edges are adjacent (toroidal world).
    #[default]
    Wrap,
    /// Nothing lies beyond the edges; edge cells have fewer neighbours.
    Bounded,
}

// ───────────────────────────────────────────────────────────────────
// GridTopology
// ───────────────────────────────────────────────────────────────────

/// Immutable cell layout of a spatial grid.
#[derive(Clone, Debug)]
pub struct GridTopology {
    cells_x: u32,
    cells_y: u32,
    edges: EdgeMode,
    /// World bounds after growing by [`BOUNDS_EPSILON`].
    world_bounds: Rect,
    cell_size: Vec2,
    /// Grown origin and reciprocal cell size in f64.  Mapping in f32 loses
    /// the margin once coordinates pass a few thousand units.
    origin: (f64, f64),
    inv_cell_size: (f64, f64),
    neighbors: Box<[[CellIndex; NEIGHBORHOOD]]>,
    /// Valid prefix length of each `neighbors` row (9 unless `Bounded`).
    neighbor_counts: Box<[u8]>,
    at_border: Box<[bool]>,
}

impl GridTopology {
    /// Build the topology for `world` split into `cells_x × cells_y` cells.
    pub fn new(world: Rect, cells_x: u32, cells_y: u32, edges: EdgeMode) -> Result<Self, GridError> {
        let total = match cells_x.checked_mul(cells_y) {
            Some(total) if cells_x > 0 && cells_y > 0 => total as usize,
            _ => return Err(GridError::InvalidDimensions { cells_x, cells_y }),
        };
        if !world.has_area() || !world.origin().is_finite() {
            return Err(GridError::InvalidBounds {
                width: world.width,
                height: world.height,
            });
        }

        let margin = bounds_margin(&world);
        let world_bounds = world.grown(margin);
        let cell_size = Vec2::new(
            world_bounds.width / cells_x as f32,
            world_bounds.height / cells_y as f32,
        );
        let m = margin as f64;
        let origin = (world.x as f64 - m, world.y as f64 - m);
        let inv_cell_size = (
            cells_x as f64 / (world.width as f64 + 2.0 * m),
            cells_y as f64 / (world.height as f64 + 2.0 * m),
        );

        let mut neighbors = vec![[CellIndex::default(); NEIGHBORHOOD]; total].into_boxed_slice();
        let mut neighbor_counts = vec![0u8; total].into_boxed_slice();
        let mut at_border = vec![false; total].into_boxed_slice();

        let (cx, cy) = (cells_x as i64, cells_y as i64);
        for y in 0..cy {
            for x in 0..cx {
                let index = (y * cx + x) as usize;
                at_border[index] = x == 0 || y == 0 || x == cx - 1 || y == cy - 1;

                let row = &mut neighbors[index];
                let mut slot = 0;
                for dx in -1_i64..=1 {
                    for dy in -1_i64..=1 {
                        let (nx, ny) = match edges {
                            EdgeMode::Wrap => ((x + dx).rem_euclid(cx), (y + dy).rem_euclid(cy)),
                            EdgeMode::Bounded => {
                                let (nx, ny) = (x + dx, y + dy);
                                if nx < 0 || ny < 0 || nx >= cx || ny >= cy {
                                    continue;
                                }
                                (nx, ny)
                            }
                        };
                        row[slot] = CellIndex((ny * cx + nx) as u32);
                        slot += 1;
                    }
                }
                neighbor_counts[index] = slot as u8;
            }
        }

        log::debug!(
            "Grid topology {cells_x}x{cells_y} ({total} cells, {edges:?}), cell size {:.3}x{:.3}",
            cell_size.x,
            cell_size.y
        );

        Ok(Self {
            cells_x,
            cells_y,
            edges,
            world_bounds,
            cell_size,
            origin,
            inv_cell_size,
            neighbors,
            neighbor_counts,
            at_border,
        })
    }

    // ───────────────────── accessors ─────────────────────

    #[inline]
    pub fn cells_x(&self) -> u32 {
        self.cells_x
    }

    #[inline]
    pub fn cells_y(&self) -> u32 {
        self.cells_y
    }

    #[inline]
    pub fn total_cells(&self) -> usize {
        self.at_border.len()
    }

    #[inline]
    pub fn edges(&self) -> EdgeMode {
        self.edges
    }

    /// Grown world bounds actually covered by the cells.
    #[inline]
    pub fn world_bounds(&self) -> Rect {
        self.world_bounds
    }

    #[inline]
    pub fn cell_size(&self) -> Vec2 {
        self.cell_size
    }

    // ───────────────────── mapping ─────────────────────

    /// Map a world position to its cell coordinate.
    ///
    /// No clamping: positions outside the grown world bounds, and
    /// non-finite positions, fail with [`GridError::OutOfRange`].
    #[inline]
    pub fn position_to_cell(&self, p: Vec2) -> Result<CellCoord, GridError> {
        let fx = ((p.x as f64 - self.origin.0) * self.inv_cell_size.0).floor();
        let fy = ((p.y as f64 - self.origin.1) * self.inv_cell_size.1).floor();

        // NaN fails every comparison, so test for the valid range.
        let inside = fx >= 0.0
            && fy >= 0.0
            && fx < self.cells_x as f64
            && fy < self.cells_y as f64;
        if !inside {
            return Err(GridError::OutOfRange { x: p.x, y: p.y });
        }
        Ok(CellCoord::new(fx as u32, fy as u32))
    }

    /// Linear index of the cell containing `p`.
    #[inline]
    pub fn cell_index(&self, p: Vec2) -> Result<CellIndex, GridError> {
        let coord = self.position_to_cell(p)?;
        Ok(CellIndex(coord.y * self.cells_x + coord.x))
    }

    /// Linear index of `coord`, or `None` if it lies outside the grid.
    /// Coordinates are plain arithmetic input, so a miss is not an error.
    #[inline]
    pub fn index_of(&self, coord: CellCoord) -> Option<CellIndex> {
        if coord.x < self.cells_x && coord.y < self.cells_y {
            Some(CellIndex(coord.y * self.cells_x + coord.x))
        } else {
            None
        }
    }

    pub fn coord_of(&self, cell: CellIndex) -> Result<CellCoord, GridError> {
        self.check(cell)?;
        Ok(CellCoord::new(cell.0 % self.cells_x, cell.0 / self.cells_x))
    }

    /// Validate `cell` and return it as a slice index.
    #[inline]
    pub fn check(&self, cell: CellIndex) -> Result<usize, GridError> {
        let i = cell.get();
        if i < self.total_cells() {
            Ok(i)
        } else {
            Err(GridError::InvalidCell(cell))
        }
    }

    // ───────────────────── neighbourhood ─────────────────────

    /// The precomputed neighbourhood of `cell`, in the fixed module-level
    /// order.  Nine entries in `Wrap` mode; fewer at the edges in `Bounded`.
    pub fn neighbors(&self, cell: CellIndex) -> Result<&[CellIndex], GridError> {
        let i = self.check(cell)?;
        Ok(self.neighbors_at(i))
    }

    /// Unchecked-by-contract variant for callers that already validated `i`.
    #[inline(always)]
    pub(crate) fn neighbors_at(&self, i: usize) -> &[CellIndex] {
        &self.neighbors[i][..self.neighbor_counts[i] as usize]
    }

    /// Whether `cell` touches any grid edge.  Independent of [`EdgeMode`].
    pub fn is_border(&self, cell: CellIndex) -> Result<bool, GridError> {
        let i = self.check(cell)?;
        Ok(self.at_border[i])
    }

    #[inline(always)]
    pub(crate) fn border_at(&self, i: usize) -> bool {
        self.at_border[i]
    }

    /// World rectangle covered by `cell`.
    pub fn cell_bounds(&self, cell: CellIndex) -> Result<Rect, GridError> {
        let coord = self.coord_of(cell)?;
        Ok(Rect::new(
            self.world_bounds.x + coord.x as f32 * self.cell_size.x,
            self.world_bounds.y + coord.y as f32 * self.cell_size.y,
            self.cell_size.x,
            self.cell_size.y,
        ))
    }

    /// Cell columns (or rows) whose span intersects `[min, max]` along one
    /// axis, as raw, possibly off-grid, coordinates.
    pub(crate) fn axis_span(&self, min: f32, max: f32, vertical: bool) -> (i64, i64) {
        let (origin, inv) = if vertical {
            (self.origin.1, self.inv_cell_size.1)
        } else {
            (self.origin.0, self.inv_cell_size.0)
        };
        (
            ((min as f64 - origin) * inv).floor() as i64,
            ((max as f64 - origin) * inv).floor() as i64,
        )
    }
}

/// Outward margin for `world`: [`BOUNDS_EPSILON`], or four f32 ulps of the
/// largest coordinate magnitude when that is wider.
///
/// A boundary coordinate such as `world.x + world.width` is itself rounded
/// to f32, so the margin has to exceed that rounding error.
pub fn bounds_margin(world: &Rect) -> f32 {
    let extent = world
        .x
        .abs()
        .max(world.y.abs())
        .max(world.right().abs())
        .max(world.bottom().abs());
    BOUNDS_EPSILON.max(extent * f32::EPSILON * 4.0)
}
