//! Simulation state: a wrapped world of particles with separation steering.
//!
//! Each tick runs the broad phase through the spatial grid
//! (`rebuild` → `find` per particle) and the narrow phase with exact
//! toroidal distances.

use rand::{rngs::StdRng, Rng, SeedableRng};
use swarm_core::{toroidal_delta, wrap_position, Rect, Vec2};
use swarm_grid::{GridConfig, GridError, ObjectId, SpatialGrid};

/// One moving particle.
#[derive(Clone, Copy, Debug)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
}

/// Per-tick statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TickStats {
    /// Candidate ids returned by the broad phase, summed over all queries.
    pub candidates: usize,
    /// Ordered pairs closer than the interaction radius.
    pub close_pairs: usize,
    /// Inserts dropped by saturated cells.
    pub dropped: usize,
    pub occupied_cells: usize,
    pub largest_cell: u32,
}

pub struct SimState {
    grid: SpatialGrid,
    particles: Vec<Particle>,
    world: Rect,
    /// Interaction radius, kept inside one cell so the 3x3 broad phase
    /// sees every pair closer than it.
    radius: f32,
    max_speed: f32,
    rng: StdRng,
    /// Steering accumulated during the narrow phase, applied after it.
    steering: Vec<Vec2>,
}

impl SimState {
    pub fn new(config: &GridConfig, count: usize, seed: u64) -> Result<Self, GridError> {
        let grid = SpatialGrid::new(config)?;
        let world = config.world;
        let cell = grid.cell_size();
        let radius = cell.x.min(cell.y) * 0.9;
        let max_speed = radius * 0.25;

        let mut rng = StdRng::seed_from_u64(seed);
        let particles = (0..count)
            .map(|_| Particle {
                position: Vec2::new(
                    world.x + rng.gen_range(0.0..world.width),
                    world.y + rng.gen_range(0.0..world.height),
                ),
                velocity: Vec2::new(
                    rng.gen_range(-max_speed..max_speed),
                    rng.gen_range(-max_speed..max_speed),
                ),
            })
            .collect();

        log::info!(
            "Spawned {count} particles in {}x{} world (radius {radius:.2}, seed {seed})",
            world.width,
            world.height
        );

        Ok(Self {
            grid,
            particles,
            world,
            radius,
            max_speed,
            rng,
            steering: vec![Vec2::ZERO; count],
        })
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Advance one tick: rebuild the grid, steer apart close pairs, move.
    pub fn step(&mut self) -> Result<TickStats, GridError> {
        let rebuild = self.grid.rebuild(
            self.particles
                .iter()
                .enumerate()
                .map(|(i, p)| (p.position, i as ObjectId)),
        )?;

        let mut stats = TickStats {
            dropped: rebuild.dropped,
            ..TickStats::default()
        };
        let radius_sq = self.radius * self.radius;

        for (i, particle) in self.particles.iter().enumerate() {
            let found = self.grid.find_at(particle.position)?;
            stats.candidates += found.len();

            let mut push = Vec2::ZERO;
            for &other in found {
                if other as usize == i {
                    continue;
                }
                let delta = toroidal_delta(
                    self.particles[other as usize].position,
                    particle.position,
                    &self.world,
                );
                let dist_sq = delta.length_sq();
                if dist_sq < radius_sq && dist_sq > 0.0 {
                    stats.close_pairs += 1;
                    push += delta * (1.0 / dist_sq.sqrt());
                }
            }
            self.steering[i] = push;
        }

        let occupancy = self.grid.occupancy();
        stats.occupied_cells = occupancy.occupied_cells;
        stats.largest_cell = occupancy.largest_cell;

        for (particle, push) in self.particles.iter_mut().zip(&self.steering) {
            let jitter = Vec2::new(
                self.rng.gen_range(-0.05..0.05),
                self.rng.gen_range(-0.05..0.05),
            ) * self.max_speed;
            let mut velocity = particle.velocity + *push * (self.max_speed * 0.1) + jitter;
            let speed = velocity.length();
            if speed > self.max_speed {
                velocity = velocity * (self.max_speed / speed);
            }
            particle.velocity = velocity;
            particle.position = wrap_position(particle.position + velocity, &self.world);
        }

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swarm_core::toroidal_distance_sq;

    #[test]
    fn test_particles_stay_in_world() {
        let config = GridConfig::for_testing();
        let mut sim = SimState::new(&config, 64, 7).unwrap();
        for _ in 0..50 {
            sim.step().unwrap();
        }
        for p in sim.particles() {
            assert!(config.world.contains(p.position), "{:?}", p.position);
        }
    }

    #[test]
    fn test_close_pairs_match_brute_force() {
        let config = GridConfig {
            cell_capacity: 256,
            ..GridConfig::default()
        };
        let mut sim = SimState::new(&config, 2_000, 42).unwrap();
        let radius_sq = sim.radius * sim.radius;

        let mut expected = 0;
        for (i, a) in sim.particles().iter().enumerate() {
            for (j, b) in sim.particles().iter().enumerate() {
                let d = toroidal_distance_sq(a.position, b.position, &config.world);
                if i != j && d < radius_sq && d > 0.0 {
                    expected += 1;
                }
            }
        }

        let stats = sim.step().unwrap();
        assert_eq!(stats.dropped, 0);
        assert_eq!(stats.close_pairs, expected);
    }

    #[test]
    fn test_same_seed_same_run() {
        let config = GridConfig::for_testing();
        let mut a = SimState::new(&config, 16, 3).unwrap();
        let mut b = SimState::new(&config, 16, 3).unwrap();
        for _ in 0..10 {
            assert_eq!(a.step().unwrap(), b.step().unwrap());
        }
        for (pa, pb) in a.particles().iter().zip(b.particles()) {
            assert_eq!(pa.position, pb.position);
        }
    }
}
