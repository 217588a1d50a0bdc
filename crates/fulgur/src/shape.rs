//! Fractal bolt shape generation.
//!
//! Subdivides a two-point trunk into a branching polyline tree through
//! generational midpoint displacement. Each generation halves the jitter
//! magnitude and may fork child branches off fresh midpoints; a periodic
//! reseed plus a continuous horizontal drift keep the bolt writhing between
//! full shape changes.

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::branch::{BoltBranch, BoltPoint};
use crate::config::ShapeConfig;
use crate::error::ConfigResult;
use crate::flicker::FlickerState;
use crate::frame::Frame;

/// Stateful generator producing one bolt shape per simulation tick.
///
/// All shape randomness is drawn from a [`StdRng`] re-seeded from the
/// internal seed counter on every call, so a fixed seed reproduces the same
/// bolt exactly. The seed counter only advances when the reseed timer
/// elapses; timer intervals and drift targets come from a separate
/// persistent RNG seeded at construction.
pub struct ShapeGenerator {
    config: ShapeConfig,
    /// Seed for the per-call shape RNG; incremented on every reseed tick.
    seed: u64,
    /// Persistent stream for timer intervals and drift targets only.
    anim_rng: StdRng,
    elapsed_since_reseed: f32,
    reseed_interval: f32,
    /// Drift magnitude reached at the end of the current reseed window.
    end_horizontal_offset: f32,
    flicker: FlickerState,
}

impl ShapeGenerator {
    /// # Errors
    ///
    /// Returns an error if the configuration fails validation.
    pub fn new(config: ShapeConfig, seed: u64) -> ConfigResult<Self> {
        config.validate()?;
        let mut anim_rng = StdRng::seed_from_u64(seed);
        let reseed_interval =
            anim_rng.random_range(config.min_shape_interval..=config.max_shape_interval);
        let end_horizontal_offset = anim_rng
            .random_range(config.min_end_horizontal_offset..=config.max_end_horizontal_offset);
        let flicker = FlickerState::new(&config, seed);
        Ok(Self {
            config,
            seed,
            anim_rng,
            elapsed_since_reseed: 0.0,
            reseed_interval,
            end_horizontal_offset,
            flicker,
        })
    }

    /// Produce the current bolt shape between two generator-local anchors.
    ///
    /// `dt` is the time elapsed since the previous call; it drives both the
    /// reseed timer and the flicker timer. The same constructor seed and
    /// the same scripted `dt`/anchor sequence reproduce the same output
    /// bit for bit.
    ///
    /// The returned list is already filtered down to the branches the
    /// flicker model currently marks visible.
    pub fn generate(&mut self, dt: f32, origin: Vec3, impact: Vec3) -> Vec<BoltBranch> {
        self.advance_animation(dt);

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut branches = vec![BoltBranch::trunk(origin, impact)];
        self.subdivide(&mut rng, &mut branches);
        self.flicker.filter(dt, &self.config, &mut branches);
        branches
    }

    fn advance_animation(&mut self, dt: f32) {
        self.elapsed_since_reseed += dt;
        if self.elapsed_since_reseed > self.reseed_interval {
            self.seed = self.seed.wrapping_add(1);
            self.elapsed_since_reseed = 0.0;
            self.reseed_interval = self
                .anim_rng
                .random_range(self.config.min_shape_interval..=self.config.max_shape_interval);
            self.end_horizontal_offset = self.anim_rng.random_range(
                self.config.min_end_horizontal_offset..=self.config.max_end_horizontal_offset,
            );
            debug!(
                seed = self.seed,
                interval = self.reseed_interval,
                "bolt shape reseeded"
            );
        }
    }

    /// Horizontal midpoint bias, ramping from zero to the drawn target over
    /// the current reseed window.
    fn horizontal_offset(&self) -> f32 {
        if self.reseed_interval > 0.0 {
            let progress = (self.elapsed_since_reseed / self.reseed_interval).min(1.0);
            self.end_horizontal_offset * progress
        } else {
            self.end_horizontal_offset
        }
    }

    fn subdivide(&self, rng: &mut StdRng, branches: &mut Vec<BoltBranch>) {
        if self.config.max_generations == 0 {
            return;
        }
        let horizontal_offset = self.horizontal_offset();

        // The list grows while it is being walked; the length is re-read
        // every iteration so spawned branches get subdivided too.
        let mut branch_index = 0;
        while branch_index < branches.len() {
            // The trunk's endpoints are seeded by hand, so it starts at
            // generation 1. A spawned branch re-runs the generation it was
            // born in: its tail past the fork has not seen that generation
            // yet. The asymmetry is intentional.
            let start_generation = if branch_index == 0 {
                1
            } else {
                branches[branch_index].creation_generation
            };

            for generation in start_generation..=self.config.max_generations {
                let mut spawned = Vec::new();
                let existing = branches.len();
                self.subdivide_pass(
                    rng,
                    &mut branches[branch_index],
                    generation,
                    horizontal_offset,
                    existing,
                    &mut spawned,
                );
                branches.append(&mut spawned);
            }
            branch_index += 1;
        }
    }

    /// Run one generation of midpoint subdivision over a single branch.
    ///
    /// Children forked during the pass are collected into `spawned`;
    /// `existing` is the branch count they add onto for the cap check.
    #[allow(clippy::cast_precision_loss)]
    fn subdivide_pass(
        &self,
        rng: &mut StdRng,
        branch: &mut BoltBranch,
        generation: u32,
        horizontal_offset: f32,
        existing: usize,
        spawned: &mut Vec<BoltBranch>,
    ) {
        let config = &self.config;
        let generation_progress = generation as f32 / config.max_generations as f32;
        // The bias pulls midpoints off center early on and fades out as the
        // generations get finer.
        let split = 0.5 - horizontal_offset * (1.0 - generation_progress);
        let displacement_limit =
            config.max_displacement * config.displacement_decay.powi((generation - 1).cast_signed());
        let birth_chance = (config.birth_chance
            * config.birth_chance_growth.powi((generation - 1).cast_signed()))
        .clamp(0.0, 1.0);
        let last_generation = generation == config.max_generations;

        // Each insertion grows the list, so the bound is re-read every step.
        let mut i = branch.spawn_point_index;
        while i + 1 < branch.points.len() {
            let current = branch.points[i];
            let next = branch.points[i + 1];

            let mut position = current.position.lerp(next.position, split);
            if current.supports_next_generations || next.supports_next_generations {
                let along_right = rng.random_range(-displacement_limit..=displacement_limit);
                let along_up = rng.random_range(-displacement_limit..=displacement_limit);
                position += current.frame.right * along_right + current.frame.up * along_up;
            }
            let supports_next = generation <= config.min_generations
                || rng.random_bool(f64::from(config.next_generation_support_chance));

            // Keep the tube orientation continuous across the insertion:
            // current now faces the midpoint, the midpoint faces next.
            let midpoint = BoltPoint::new(
                position,
                Frame::looking_at(position, next.position),
                supports_next,
            );
            branch.points[i].face(position);
            branch.points.insert(i + 1, midpoint);

            if !last_generation
                && existing + spawned.len() < config.max_branches
                && rng.random_bool(f64::from(birth_chance))
            {
                spawned.push(branch.fork(
                    generation,
                    i + 2,
                    config.branch_intensity_decay,
                    config.branch_width_decay,
                ));
            }

            // Skip over the midpoint we just inserted.
            i += 2;
        }
    }
}
