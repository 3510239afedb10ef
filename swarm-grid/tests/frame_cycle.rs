//! Frame-cycle integration tests.
//!
//! Verifies:
//! - The 4x4 corner scenario under wrapping and bounded edges
//! - Broad-phase completeness: every pair closer than one cell is reported
//! - Repeated clear → add → find cycles never leak ids between frames
//! - Concurrent readers with their own result buffers

use swarm_core::{toroidal_distance, wrap_position, Rect, Vec2};
use swarm_grid::{
    CellCoord, CellIndex, EdgeMode, GridConfig, GridError, ObjectId, QueryResult, SpatialGrid,
};

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Deterministic scatter of `n` points over `world` (golden-ratio sequence).
fn scatter(n: usize, world: Rect, offset: f32) -> Vec<Vec2> {
    const PHI: f32 = 0.618_034;
    const PSI: f32 = 0.754_877_7;
    (0..n)
        .map(|i| {
            let fx = (i as f32 * PHI + offset).fract();
            let fy = (i as f32 * PSI + offset * 0.5).fract();
            Vec2::new(world.x + fx * world.width, world.y + fy * world.height)
        })
        .collect()
}

fn build(config: &GridConfig, positions: &[Vec2]) -> SpatialGrid {
    let mut grid = SpatialGrid::new(config).unwrap();
    grid.rebuild(positions.iter().enumerate().map(|(i, &p)| (p, i as ObjectId)))
        .unwrap();
    grid
}

// ─── Corner scenario ─────────────────────────────────────────────────────────

#[test]
fn corner_scenario_wraps() {
    let mut grid = SpatialGrid::new(&GridConfig::for_testing()).unwrap();
    let a = grid.add_object(Vec2::new(10.0, 10.0), 1).unwrap();
    let b = grid.add_object(Vec2::new(390.0, 390.0), 2).unwrap();

    assert_eq!(grid.topology().coord_of(a.cell).unwrap(), CellCoord::new(0, 0));
    assert_eq!(grid.topology().coord_of(b.cell).unwrap(), CellCoord::new(3, 3));

    let found = grid.find(a.cell).unwrap();
    assert!(found.contains(1));
    assert!(found.contains(2));
    assert!(found.at_border());
}

#[test]
fn corner_scenario_bounded() {
    let config = GridConfig {
        edges: EdgeMode::Bounded,
        ..GridConfig::for_testing()
    };
    let mut grid = SpatialGrid::new(&config).unwrap();
    let a = grid.add_object(Vec2::new(10.0, 10.0), 1).unwrap();
    grid.add_object(Vec2::new(390.0, 390.0), 2).unwrap();

    let found = grid.find(a.cell).unwrap();
    assert_eq!(found.as_slice(), &[1]);
}

// ─── Broad-phase completeness ────────────────────────────────────────────────

#[test]
fn every_close_pair_is_reported() {
    let config = GridConfig {
        cells_x: 20,
        cells_y: 15,
        cell_capacity: 64,
        world: Rect::from_size(800.0, 600.0),
        edges: EdgeMode::Wrap,
    };
    let positions = scatter(1_500, config.world, 0.1);
    let mut grid = build(&config, &positions);
    assert_eq!(grid.occupancy().total_objects, positions.len());

    let world = config.world;
    let reach = grid.cell_size().x.min(grid.cell_size().y) * 0.99;

    for (i, &p) in positions.iter().enumerate() {
        let found = grid.find_at(p).unwrap();
        for (j, &q) in positions.iter().enumerate() {
            if toroidal_distance(p, q, &world) < reach {
                assert!(found.contains(j as ObjectId), "{i} should see {j}");
            }
        }
    }
}

// ─── Frame cycles ────────────────────────────────────────────────────────────

#[test]
fn moving_population_across_frames() {
    let config = GridConfig {
        cells_x: 16,
        cells_y: 16,
        cell_capacity: 32,
        world: Rect::from_size(512.0, 512.0),
        edges: EdgeMode::Wrap,
    };
    let mut grid = SpatialGrid::new(&config).unwrap();
    let mut positions = scatter(500, config.world, 0.3);
    let velocity = Vec2::new(7.5, -3.25);

    for _frame in 0..30 {
        for p in positions.iter_mut() {
            *p = wrap_position(*p + velocity, &config.world);
        }
        let stats = grid
            .rebuild(positions.iter().enumerate().map(|(i, &p)| (p, i as ObjectId)))
            .unwrap();
        assert_eq!(stats.inserted + stats.dropped, positions.len());
        assert_eq!(grid.occupancy().total_objects, stats.inserted);

        // Each object's own neighbourhood contains it (no bucket overflows here).
        assert_eq!(stats.dropped, 0);
        for (i, &p) in positions.iter().enumerate().step_by(25) {
            assert!(grid.find_at(p).unwrap().contains(i as ObjectId));
        }
    }

    grid.clear();
    for &p in positions.iter().take(50) {
        assert!(grid.find_at(p).unwrap().is_empty());
    }
}

#[test]
fn out_of_world_position_is_rejected() {
    let config = GridConfig::for_testing();
    let mut grid = SpatialGrid::new(&config).unwrap();
    grid.add_object(Vec2::new(50.0, 50.0), 1).unwrap();

    let err = grid.add_object(Vec2::new(400.5, 50.0), 2).unwrap_err();
    assert!(matches!(err, GridError::OutOfRange { .. }));
    assert_eq!(grid.occupancy().total_objects, 1);
}

// ─── Concurrent readers ──────────────────────────────────────────────────────

#[test]
fn parallel_find_into_matches_find() {
    let config = GridConfig {
        cells_x: 12,
        cells_y: 12,
        cell_capacity: 16,
        world: Rect::from_size(300.0, 300.0),
        edges: EdgeMode::Wrap,
    };
    let positions = scatter(400, config.world, 0.7);
    let mut grid = build(&config, &positions);

    let expected: Vec<Vec<ObjectId>> = (0..grid.topology().total_cells() as u32)
        .map(|c| grid.find(CellIndex(c)).unwrap().as_slice().to_vec())
        .collect();

    let grid = &grid;
    let total = grid.topology().total_cells() as u32;
    let results: Vec<Vec<Vec<ObjectId>>> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..4u32)
            .map(|t| {
                s.spawn(move || {
                    let mut out = QueryResult::new(grid.cell_capacity());
                    (t..total)
                        .step_by(4)
                        .map(|c| {
                            grid.find_into(CellIndex(c), &mut out).unwrap();
                            out.as_slice().to_vec()
                        })
                        .collect::<Vec<Vec<ObjectId>>>()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for (t, per_thread) in results.iter().enumerate() {
        for (k, ids) in per_thread.iter().enumerate() {
            let cell = t + k * 4;
            assert_eq!(ids, &expected[cell]);
        }
    }
}
