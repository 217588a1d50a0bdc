//! Tuning parameters for shape generation and meshing.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Tunables for the fractal subdivision, drift, and flicker model.
///
/// Every field is a plain number so a tuning can be serialized alongside
/// other scene settings. The defaults reproduce the reference bolt look.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeConfig {
    /// Generations up to which new midpoints always keep subdividing.
    pub min_generations: u32,
    /// Total subdivision depth. 0 yields the bare two-point trunk.
    pub max_generations: u32,
    /// Chance a new midpoint keeps displacing in later generations.
    pub next_generation_support_chance: f32,
    /// Perpendicular jitter magnitude at generation 1.
    pub max_displacement: f32,
    /// Geometric decay of the jitter magnitude per generation.
    pub displacement_decay: f32,
    /// Chance of forking a child branch at a fresh midpoint.
    pub birth_chance: f32,
    /// Per-generation multiplier applied to the birth chance.
    pub birth_chance_growth: f32,
    /// Hard cap on the total number of branches, trunk included.
    pub max_branches: usize,
    /// Intensity attenuation applied to each spawned branch.
    pub branch_intensity_decay: f32,
    /// Width attenuation applied to each spawned branch.
    pub branch_width_decay: f32,
    /// Lower bound of the randomized reseed interval, in seconds.
    pub min_shape_interval: f32,
    /// Upper bound of the randomized reseed interval, in seconds.
    pub max_shape_interval: f32,
    /// Lower bound of the animated horizontal drift magnitude.
    pub min_end_horizontal_offset: f32,
    /// Upper bound of the animated horizontal drift magnitude.
    pub max_end_horizontal_offset: f32,
    /// Base chance a branch sits out a flicker window.
    pub branch_invisible_chance: f32,
    /// Per-generation growth of the invisible chance; later generations
    /// flicker more.
    pub invisible_chance_growth: f32,
    /// Ceiling for the invisible chance.
    pub max_invisible_chance: f32,
    /// Lower bound of the randomized flicker recompute interval, in seconds.
    pub min_flicker_interval: f32,
    /// Upper bound of the randomized flicker recompute interval, in seconds.
    pub max_flicker_interval: f32,
}

impl Default for ShapeConfig {
    fn default() -> Self {
        Self {
            min_generations: 2,
            max_generations: 5,
            next_generation_support_chance: 0.5,
            max_displacement: 1.2,
            displacement_decay: 0.5,
            birth_chance: 0.2,
            birth_chance_growth: 1.4,
            max_branches: 12,
            branch_intensity_decay: 0.5,
            branch_width_decay: 0.5,
            min_shape_interval: 0.05,
            max_shape_interval: 0.25,
            min_end_horizontal_offset: 0.05,
            max_end_horizontal_offset: 0.3,
            branch_invisible_chance: 0.1,
            invisible_chance_growth: 1.5,
            max_invisible_chance: 0.85,
            min_flicker_interval: 0.03,
            max_flicker_interval: 0.15,
        }
    }
}

impl ShapeConfig {
    /// Check bounds that would otherwise poison generation at runtime.
    ///
    /// # Errors
    ///
    /// Returns an error for probabilities outside `[0, 1]` or inverted
    /// interval bounds.
    pub fn validate(&self) -> ConfigResult<()> {
        let chances = [
            (
                "next_generation_support_chance",
                self.next_generation_support_chance,
            ),
            ("birth_chance", self.birth_chance),
            ("branch_invisible_chance", self.branch_invisible_chance),
            ("max_invisible_chance", self.max_invisible_chance),
        ];
        for (name, value) in chances {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::ChanceOutOfRange { name, value });
            }
        }

        let intervals = [
            (
                "shape interval",
                self.min_shape_interval,
                self.max_shape_interval,
            ),
            (
                "flicker interval",
                self.min_flicker_interval,
                self.max_flicker_interval,
            ),
            (
                "end horizontal offset",
                self.min_end_horizontal_offset,
                self.max_end_horizontal_offset,
            ),
        ];
        for (name, min, max) in intervals {
            if min > max {
                return Err(ConfigError::InvertedInterval { name, min, max });
            }
        }

        let scales = [
            ("max_displacement", self.max_displacement),
            ("displacement_decay", self.displacement_decay),
            ("birth_chance_growth", self.birth_chance_growth),
            ("invisible_chance_growth", self.invisible_chance_growth),
            ("branch_intensity_decay", self.branch_intensity_decay),
            ("branch_width_decay", self.branch_width_decay),
        ];
        for (name, value) in scales {
            if value < 0.0 {
                return Err(ConfigError::NegativeScale { name, value });
            }
        }

        Ok(())
    }
}

/// Tunables for tube mesh construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    /// Vertices forming each ring around a point. Minimum 3.
    pub segment_resolution: usize,
    /// Base tube radius, before per-branch width attenuation.
    pub segment_radius: f32,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            segment_resolution: 8,
            segment_radius: 0.05,
        }
    }
}

impl MeshConfig {
    /// # Errors
    ///
    /// Returns an error for a resolution below 3 (degenerate ring) or a
    /// non-positive radius.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.segment_resolution < 3 {
            return Err(ConfigError::ResolutionTooLow {
                resolution: self.segment_resolution,
            });
        }
        if self.segment_radius <= 0.0 {
            return Err(ConfigError::NonPositiveRadius {
                radius: self.segment_radius,
            });
        }
        Ok(())
    }
}
