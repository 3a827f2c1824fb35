//! Single-intensity atmosphere calls.

use image::{DynamicImage, Rgba, RgbaImage};

use super::{Atmosphere, AtmosphereConfig};
use crate::error::GenerationError;

/// Maps an old single `intensity` onto the glow/halo parameter set.
///
/// `intensity <= 0` disables the layer.
pub fn legacy_config(intensity: f32, seed: u64) -> AtmosphereConfig {
    let intensity = if intensity.is_nan() { 0.0 } else { intensity.clamp(0.0, 1.0) };
    AtmosphereConfig {
        seed,
        enabled: intensity > 0.0,
        glow_intensity: intensity,
        halo_intensity: 0.7 * intensity,
        halo_thickness: 1 + (4.0 * intensity).round() as u32,
        blur_amount: 0.5,
    }
}

/// Applies an atmosphere through the single-intensity interface.
///
/// `light_angle` is accepted for call-site compatibility and has no effect.
pub fn apply_legacy_atmosphere(
    planet: &DynamicImage,
    planet_type: &str,
    intensity: f32,
    color: Option<Rgba<u8>>,
    _light_angle: f32,
    seed: u64,
) -> Result<RgbaImage, GenerationError> {
    Atmosphere::from_config(legacy_config(intensity, seed)).apply_to_planet(planet, planet_type, false, color)
}
