//! Fixed-capacity spatial hash grid.
//!
//! Per-frame usage:
//!
//! ```text
//!  clear() ──▸ add_object(pos, id) × N ──▸ find(cell) × M
//! ```
//!
//! # Design decisions
//!
//! * **One flat slab.**  Bucket `i` owns slots
//!   `objects[i * cell_capacity .. (i + 1) * cell_capacity]`; only the first
//!   `object_counts[i]` of them are live.  `clear` resets the counts and
//!   leaves the slots alone, so it costs O(cells), not O(cells × capacity).
//! * **Overflow caps, it does not fail.**  A full bucket drops the insert and
//!   reports `stored == false`.  Positions off the grid are caller bugs and
//!   fail with [`GridError::OutOfRange`].
//! * **No allocation on the query path.**  Neighbourhoods come from the
//!   topology table and results land in a preallocated [`QueryResult`].

use swarm_core::{Rect, Vec2};

use crate::config::GridConfig;
use crate::error::GridError;
use crate::query::QueryResult;
use crate::topology::{CellIndex, EdgeMode, GridTopology};

/// Opaque caller-assigned object identifier.
pub type ObjectId = u32;

/// Outcome of a single insert.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Insertion {
    /// Cell the object mapped to, whether or not it was stored.
    pub cell: CellIndex,
    /// False when the bucket was already at capacity.
    pub stored: bool,
}

/// Counters returned by [`SpatialGrid::rebuild`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RebuildStats {
    pub inserted: usize,
    pub dropped: usize,
}

/// Occupancy snapshot, e.g. for debug overlays.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OccupancyStats {
    /// Cells holding at least one id.
    pub occupied_cells: usize,
    /// Ids stored across all cells.
    pub total_objects: usize,
    /// Highest per-cell count.
    pub largest_cell: u32,
    /// Cells at `cell_capacity`.
    pub saturated_cells: usize,
}

// ───────────────────────────────────────────────────────────────────
// SpatialGrid
// ───────────────────────────────────────────────────────────────────

/// Uniform grid of fixed-capacity buckets with precomputed neighbourhoods.
#[derive(Clone, Debug)]
pub struct SpatialGrid {
    topology: GridTopology,
    cell_capacity: usize,
    object_counts: Box<[u32]>,
    objects: Box<[ObjectId]>,
    /// Scratch result handed out by [`SpatialGrid::find`].
    found: QueryResult,
}

impl SpatialGrid {
    pub fn new(config: &GridConfig) -> Result<Self, GridError> {
        config.validate()?;
        let topology = GridTopology::new(config.world, config.cells_x, config.cells_y, config.edges)?;
        Self::with_topology(topology, config.cell_capacity)
    }

    /// Build the bucket store on top of an existing topology.
    pub fn with_topology(topology: GridTopology, cell_capacity: u32) -> Result<Self, GridError> {
        let cap = cell_capacity as usize;
        let slots = match topology.total_cells().checked_mul(cap) {
            Some(slots) if cap > 0 => slots,
            _ => return Err(GridError::InvalidCapacity(cell_capacity)),
        };

        log::debug!(
            "Spatial grid ready: {} cells x {cap} slots ({} KiB of ids)",
            topology.total_cells(),
            slots * std::mem::size_of::<ObjectId>() / 1024
        );

        Ok(Self {
            object_counts: vec![0; topology.total_cells()].into_boxed_slice(),
            objects: vec![0; slots].into_boxed_slice(),
            found: QueryResult::new(cap),
            cell_capacity: cap,
            topology,
        })
    }

    // ───────────────────── accessors ─────────────────────

    #[inline]
    pub fn topology(&self) -> &GridTopology {
        &self.topology
    }

    #[inline]
    pub fn cell_capacity(&self) -> usize {
        self.cell_capacity
    }

    #[inline]
    pub fn cell_size(&self) -> Vec2 {
        self.topology.cell_size()
    }

    #[inline]
    pub fn world_bounds(&self) -> Rect {
        self.topology.world_bounds()
    }

    /// Live count of every bucket, indexed by [`CellIndex::get`].
    #[inline]
    pub fn object_counts(&self) -> &[u32] {
        &self.object_counts
    }

    /// Live ids of one bucket, in insertion order.
    pub fn objects_in(&self, cell: CellIndex) -> Result<&[ObjectId], GridError> {
        let i = self.topology.check(cell)?;
        Ok(self.bucket(i))
    }

    #[inline(always)]
    fn bucket(&self, i: usize) -> &[ObjectId] {
        let start = i * self.cell_capacity;
        &self.objects[start..start + self.object_counts[i] as usize]
    }

    pub fn occupancy(&self) -> OccupancyStats {
        let mut stats = OccupancyStats::default();
        for &count in self.object_counts.iter() {
            if count == 0 {
                continue;
            }
            stats.occupied_cells += 1;
            stats.total_objects += count as usize;
            stats.largest_cell = stats.largest_cell.max(count);
            if count as usize == self.cell_capacity {
                stats.saturated_cells += 1;
            }
        }
        stats
    }

    // ───────────────────── mutation ─────────────────────

    /// Insert `id` into the bucket under `position`.
    ///
    /// Fails only if `position` is off the grid, in which case nothing
    /// changes.  A full bucket yields `Ok` with `stored == false`.
    #[inline]
    pub fn add_object(&mut self, position: Vec2, id: ObjectId) -> Result<Insertion, GridError> {
        let cell = self.topology.cell_index(position)?;
        Ok(self.push(cell.get(), cell, id))
    }

    /// Insert `id` into a cell the caller already resolved.
    #[inline]
    pub fn add_to_cell(&mut self, cell: CellIndex, id: ObjectId) -> Result<Insertion, GridError> {
        let i = self.topology.check(cell)?;
        Ok(self.push(i, cell, id))
    }

    #[inline(always)]
    fn push(&mut self, i: usize, cell: CellIndex, id: ObjectId) -> Insertion {
        let count = &mut self.object_counts[i];
        let n = *count as usize;
        if n < self.cell_capacity {
            self.objects[i * self.cell_capacity + n] = id;
            *count += 1;
            Insertion { cell, stored: true }
        } else {
            log::trace!("Cell {cell} saturated, dropping object {id}");
            Insertion {
                cell,
                stored: false,
            }
        }
    }

    /// Empty every bucket.  Slot contents are left stale.
    #[inline]
    pub fn clear(&mut self) {
        self.object_counts.fill(0);
    }

    /// Clear, then insert every `(position, id)` pair.
    ///
    /// Stops at the first off-grid position and returns its error; the grid
    /// then holds the objects inserted before it.
    pub fn rebuild<I>(&mut self, objects: I) -> Result<RebuildStats, GridError>
    where
        I: IntoIterator<Item = (Vec2, ObjectId)>,
    {
        self.clear();
        let mut stats = RebuildStats::default();
        for (position, id) in objects {
            if self.add_object(position, id)?.stored {
                stats.inserted += 1;
            } else {
                stats.dropped += 1;
            }
        }
        if stats.dropped > 0 {
            log::debug!(
                "Rebuild stored {} objects, dropped {} in saturated cells",
                stats.inserted,
                stats.dropped
            );
        }
        Ok(stats)
    }

    // ───────────────────── queries ─────────────────────

    /// Gather the neighbourhood of `cell` into the grid's scratch result.
    ///
    /// The returned borrow ends before the grid can be queried or mutated
    /// again, so a stale result can never be observed.  Use
    /// [`find_into`](Self::find_into) to keep results around or to query
    /// from several threads.
    pub fn find(&mut self, cell: CellIndex) -> Result<&QueryResult, GridError> {
        let mut found = std::mem::take(&mut self.found);
        let outcome = self.find_into(cell, &mut found);
        self.found = found;
        outcome?;
        Ok(&self.found)
    }

    /// [`find`](Self::find) for the cell under `position`.
    pub fn find_at(&mut self, position: Vec2) -> Result<&QueryResult, GridError> {
        let cell = self.topology.cell_index(position)?;
        self.find(cell)
    }

    /// Gather the neighbourhood of `cell` into a caller-owned buffer.
    ///
    /// `out` is reset first.  Ids beyond `out.capacity()` are dropped.
    pub fn find_into(&self, cell: CellIndex, out: &mut QueryResult) -> Result<(), GridError> {
        let i = self.topology.check(cell)?;
        out.reset(cell, self.topology.border_at(i));
        for neighbor in self.topology.neighbors_at(i) {
            let live = self.bucket(neighbor.get());
            if out.extend_from(live) < live.len() {
                break;
            }
        }
        Ok(())
    }

    pub fn find_at_into(&self, position: Vec2, out: &mut QueryResult) -> Result<(), GridError> {
        let cell = self.topology.cell_index(position)?;
        self.find_into(cell, out)
    }

    /// Collect ids from every cell overlapping the square of half-extent
    /// `radius` around `position`.  Each cell is visited once even when the
    /// square wraps onto itself.  Broad phase only: no distance filtering.
    ///
    /// The column and row lists from `axis_cells` are each free of
    /// duplicates, so every `(x, y)` pair names a distinct cell.
    ///
    /// `out` is cleared first; returns the number of ids collected.
    pub fn find_in_radius(
        &self,
        position: Vec2,
        radius: f32,
        out: &mut Vec<ObjectId>,
    ) -> Result<usize, GridError> {
        if !radius.is_finite() || radius < 0.0 {
            return Err(GridError::InvalidRadius(radius));
        }
        self.topology.position_to_cell(position)?;
        out.clear();

        let xs = self.axis_cells(position.x - radius, position.x + radius, false);
        let ys = self.axis_cells(position.y - radius, position.y + radius, true);
        let cells_x = self.topology.cells_x();

        for &x in &xs {
            for &y in &ys {
                out.extend_from_slice(self.bucket((y * cells_x + x) as usize));
            }
        }
        Ok(out.len())
    }

    /// Grid columns (or rows) touched by `[min, max]` along one axis, each
    /// listed once.  A wrapped span covering `n - 1` or more steps would
    /// revisit a column, so it collapses to the whole axis.
    fn axis_cells(&self, min: f32, max: f32, vertical: bool) -> Vec<u32> {
        let cells = if vertical {
            self.topology.cells_y()
        } else {
            self.topology.cells_x()
        };
        let n = cells as i64;
        let (lo, hi) = self.topology.axis_span(min, max, vertical);

        match self.topology.edges() {
            EdgeMode::Wrap => {
                if hi.saturating_sub(lo) >= n - 1 {
                    (0..cells).collect()
                } else {
                    (lo..=hi).map(|v| v.rem_euclid(n) as u32).collect()
                }
            }
            EdgeMode::Bounded => {
                let (lo, hi) = (lo.max(0), hi.min(n - 1));
                (lo..=hi).map(|v| v as u32).collect()
            }
        }
    }
}
