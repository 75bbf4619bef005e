//! Simulation configuration.

use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, Result};
use crate::graph::MassMode;

/// Tunables of the integration loop.
///
/// Deserializes from a partial object; missing fields keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimulationConfig {
    /// Fraction of velocity kept per tick (default: 0.85).
    pub damping: f32,
    /// Kinetic energy above which the system counts as energetic (default: 1e6).
    pub energy_threshold: f32,
    /// `dt` multiplier while calm, to converge faster (default: 10).
    pub calm_time_scale: f32,
    /// `dt` multiplier while energetic, to avoid overshoot (default: 1).
    pub energetic_time_scale: f32,
    /// Keep the layout's top-left corner anchored at the origin (default: true).
    pub recentre: bool,
    /// Compute forces but do not move anything (default: false).
    pub paused: bool,
    /// How node masses are derived when the host asks for it (default: uniform).
    pub mass_mode: MassMode,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            damping: 0.85,
            energy_threshold: 1_000_000.0,
            calm_time_scale: 10.0,
            energetic_time_scale: 1.0,
            recentre: true,
            paused: false,
            mass_mode: MassMode::Uniform,
        }
    }
}

impl SimulationConfig {
    /// Reject values that would make the integration diverge or go backwards.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.damping) {
            return Err(LayoutError::InvalidConfig(format!(
                "damping must be within [0, 1], got {}",
                self.damping
            )));
        }
        if self.energy_threshold.is_nan() || self.energy_threshold < 0.0 {
            return Err(LayoutError::InvalidConfig(format!(
                "energyThreshold must be non-negative, got {}",
                self.energy_threshold
            )));
        }
        for (name, scale) in [
            ("calmTimeScale", self.calm_time_scale),
            ("energeticTimeScale", self.energetic_time_scale),
        ] {
            if !scale.is_finite() || scale < 0.0 {
                return Err(LayoutError::InvalidConfig(format!(
                    "{name} must be a non-negative number, got {scale}"
                )));
            }
        }
        Ok(())
    }
}
