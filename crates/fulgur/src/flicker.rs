//! Per-branch visibility flicker.
//!
//! Which branches get drawn is recomputed on its own randomized cadence,
//! independent of how often the shape itself regenerates. Later-generation
//! branches are thinner and flicker more.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::branch::BoltBranch;
use crate::config::ShapeConfig;

/// Decorrelates the flicker stream from the shape seed counter.
const FLICKER_SEED_SALT: u64 = 0xA5A5_A5A5;

/// Visibility state carried between generator calls.
///
/// Unlike the shape RNG, the flicker RNG is never reset per call; it
/// advances over time so consecutive recomputes actually pick different
/// visible sets while the bolt shape stays seed-reproducible.
pub(crate) struct FlickerState {
    rng: StdRng,
    elapsed: f32,
    interval: f32,
    /// Branch indices visible since the last recompute, ascending.
    visible: Vec<usize>,
    stale: bool,
}

impl FlickerState {
    pub(crate) fn new(config: &ShapeConfig, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed ^ FLICKER_SEED_SALT);
        let interval = rng.random_range(config.min_flicker_interval..=config.max_flicker_interval);
        Self {
            rng,
            elapsed: 0.0,
            interval,
            visible: Vec::new(),
            stale: true,
        }
    }

    /// Strip branches outside the current visible set, in one
    /// index-adjusted pass.
    ///
    /// The set is recomputed only when this state's own timer elapses;
    /// between recomputes the cached set is reapplied even though the shape
    /// may have been regenerated every call since.
    pub(crate) fn filter(&mut self, dt: f32, config: &ShapeConfig, branches: &mut Vec<BoltBranch>) {
        self.elapsed += dt;
        if self.stale || self.elapsed > self.interval {
            self.recompute(config, branches);
        }

        // `visible` is ascending, so one cursor tracks the retain walk.
        // Stale indices beyond the current branch count fall off the end.
        let mut cursor = 0;
        let mut index = 0;
        branches.retain(|_| {
            let keep = self.visible.get(cursor) == Some(&index);
            if keep {
                cursor += 1;
            }
            index += 1;
            keep
        });
    }

    fn recompute(&mut self, config: &ShapeConfig, branches: &[BoltBranch]) {
        self.elapsed = 0.0;
        self.stale = false;
        self.interval = self
            .rng
            .random_range(config.min_flicker_interval..=config.max_flicker_interval);

        self.visible.clear();
        for (index, branch) in branches.iter().enumerate() {
            let invisible_chance = (config.branch_invisible_chance
                * config
                    .invisible_chance_growth
                    .powi(branch.creation_generation.cast_signed()))
            .min(config.max_invisible_chance);
            if !self.rng.random_bool(f64::from(invisible_chance)) {
                self.visible.push(index);
            }
        }
        debug!(
            visible = self.visible.len(),
            total = branches.len(),
            "flicker set recomputed"
        );
    }
}
