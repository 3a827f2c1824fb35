//! Atmosphere layer configuration.

use serde::{Deserialize, Serialize};

use crate::clouds::clamp_param;

pub const MIN_HALO_THICKNESS: u32 = 1;
pub const MAX_HALO_THICKNESS: u32 = 10;

/// Parameters for the glow and halo around one planet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtmosphereConfig {
    pub seed: u64,
    pub enabled: bool,
    /// Strength of the soft outer glow, 0.0 to 1.0.
    pub glow_intensity: f32,
    /// Opacity of the ring halo, 0.0 to 1.0. Zero skips the halo entirely.
    pub halo_intensity: f32,
    /// Halo band thickness in pixels, 1 to 10.
    pub halo_thickness: u32,
    pub blur_amount: f32,
}

impl Default for AtmosphereConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            enabled: true,
            glow_intensity: 0.5,
            halo_intensity: 0.5,
            halo_thickness: 3,
            blur_amount: 0.5,
        }
    }
}

impl AtmosphereConfig {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Default::default()
        }
    }

    pub fn clamped(&self) -> Self {
        Self {
            seed: self.seed,
            enabled: self.enabled,
            glow_intensity: clamp_param(self.glow_intensity, 0.0, 1.0),
            halo_intensity: clamp_param(self.halo_intensity, 0.0, 1.0),
            halo_thickness: self.halo_thickness.clamp(MIN_HALO_THICKNESS, MAX_HALO_THICKNESS),
            blur_amount: clamp_param(self.blur_amount, 0.0, 1.0),
        }
    }

    /// True when neither the glow nor the halo would draw anything.
    pub fn is_noop(&self) -> bool {
        !self.enabled || (self.glow_intensity <= 0.0 && self.halo_intensity <= 0.0)
    }
}
