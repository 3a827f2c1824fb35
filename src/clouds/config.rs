//! Cloud layer configuration.

use serde::{Deserialize, Serialize};

pub const DEFAULT_CANVAS_SIZE: u32 = 512;
pub const DEFAULT_LIGHT_ANGLE: f32 = 45.0;
pub const MAX_DETAIL_LEVEL: f32 = 2.0;

/// Clamps into `[lo, hi]`, mapping NaN to `lo`.
pub(crate) fn clamp_param(v: f32, lo: f32, hi: f32) -> f32 {
    if v.is_nan() {
        lo
    } else {
        v.clamp(lo, hi)
    }
}

/// Wraps an angle in degrees into `[0, 360)`; non-finite input falls back to the default.
pub(crate) fn wrap_angle(deg: f32) -> f32 {
    if deg.is_finite() {
        deg.rem_euclid(360.0)
    } else {
        DEFAULT_LIGHT_ANGLE
    }
}

/// Parameters for one cloud layer.
///
/// Values loaded from files may be out of range; [`CloudConfig::clamped`]
/// brings them back before use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudConfig {
    /// Reproducibility key for every noise field and jitter draw.
    pub seed: u64,
    pub enabled: bool,
    /// Target fraction of the disc covered by cloud, 0.0 to 1.0.
    pub coverage: f32,
    /// Canvas side length in pixels.
    pub size: u32,
    /// Fractal detail multiplier, 0.0 to 2.0.
    pub detail_level: f32,
    /// Wind drift strength, 0.0 to 1.0. `None` draws a value from the seed.
    pub wind_effect: Option<f32>,
    /// Light direction in degrees; 0 lights from the right, 90 from the top.
    pub light_angle: f32,
    pub ambient_light: f32,
    pub diffuse_light: f32,
    pub specular_light: f32,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            enabled: true,
            coverage: 0.5,
            size: DEFAULT_CANVAS_SIZE,
            detail_level: 1.0,
            wind_effect: None,
            light_angle: DEFAULT_LIGHT_ANGLE,
            ambient_light: 0.75,
            diffuse_light: 0.7,
            specular_light: 0.02,
        }
    }
}

impl CloudConfig {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Default::default()
        }
    }

    /// Dense, finely detailed cloud deck.
    pub fn overcast(seed: u64) -> Self {
        Self {
            seed,
            coverage: 0.9,
            detail_level: 1.4,
            ..Default::default()
        }
    }

    /// Scattered fair-weather clouds.
    pub fn sparse(seed: u64) -> Self {
        Self {
            seed,
            coverage: 0.25,
            detail_level: 0.8,
            ..Default::default()
        }
    }

    /// Returns a copy with every bounded value forced into its range.
    pub fn clamped(&self) -> Self {
        Self {
            seed: self.seed,
            enabled: self.enabled,
            coverage: clamp_param(self.coverage, 0.0, 1.0),
            size: self.size,
            detail_level: clamp_param(self.detail_level, 0.0, MAX_DETAIL_LEVEL),
            wind_effect: self.wind_effect.map(|w| clamp_param(w, 0.0, 1.0)),
            light_angle: wrap_angle(self.light_angle),
            ambient_light: clamp_param(self.ambient_light, 0.0, 1.0),
            diffuse_light: clamp_param(self.diffuse_light, 0.0, 1.0),
            specular_light: clamp_param(self.specular_light, 0.0, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CloudConfig::default();
        assert_eq!(config.size, 512);
        assert_eq!(config.light_angle, 45.0);
        assert_eq!(config.ambient_light, 0.75);
        assert!(config.wind_effect.is_none());
    }

    #[test]
    fn test_clamped() {
        let config = CloudConfig {
            coverage: 1.5,
            detail_level: -3.0,
            wind_effect: Some(f32::NAN),
            light_angle: -90.0,
            specular_light: 4.0,
            ..Default::default()
        }
        .clamped();

        assert_eq!(config.coverage, 1.0);
        assert_eq!(config.detail_level, 0.0);
        assert_eq!(config.wind_effect, Some(0.0));
        assert_eq!(config.light_angle, 270.0);
        assert_eq!(config.specular_light, 1.0);
    }

    #[test]
    fn test_presets_keep_seed() {
        assert_eq!(CloudConfig::overcast(9).seed, 9);
        assert!(CloudConfig::overcast(9).coverage > CloudConfig::sparse(9).coverage);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: CloudConfig = serde_json::from_str(r#"{"seed": 7, "coverage": 0.3}"#).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.coverage, 0.3);
        assert_eq!(config.size, DEFAULT_CANVAS_SIZE);
    }
}
