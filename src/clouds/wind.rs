//! Wind drift applied to the cloud sprite.

use glam::Vec2;
use image::RgbaImage;

use crate::noise::{NoiseField, NoiseSource};

/// Largest drift in pixels on the 512 px reference canvas at full wind.
const MAX_DRIFT_PX: f32 = 10.0;
const REFERENCE_SIZE: f32 = 512.0;
const WIND_FREQUENCY: f32 = 4.0;
const WIND_OFFSET: f32 = 211.5;
/// Direction wobble in radians at the noise extremes.
const ANGLE_JITTER: f32 = 0.35;

/// Unit wind direction: perpendicular to the light, 90 degrees counter-clockwise.
pub fn wind_direction(light_angle: f32) -> Vec2 {
    let a = (light_angle + 90.0).to_radians();
    Vec2::new(a.cos(), -a.sin())
}

/// Per-pixel displacement for a wind-noise sample `n` in `[-1, 1]`.
#[inline]
fn displacement(direction: Vec2, magnitude: f32, n: f32) -> Vec2 {
    let local = Vec2::from_angle(n * ANGLE_JITTER).rotate(direction);
    local * magnitude * (0.6 + 0.4 * n)
}

/// Backward-warps `texture` along the wind field.
///
/// Each destination pixel copies the source pixel found by stepping back
/// along its local wind vector, with source coordinates clamped to the
/// canvas, so no holes appear. `wind_effect <= 0` returns an exact copy.
pub fn apply_wind(texture: &RgbaImage, noise: &dyn NoiseSource, wind_effect: f32, light_angle: f32) -> RgbaImage {
    if wind_effect <= 0.0 {
        return texture.clone();
    }

    let (w, h) = texture.dimensions();
    let direction = wind_direction(light_angle);
    let magnitude = wind_effect * MAX_DRIFT_PX * w as f32 / REFERENCE_SIZE;
    let field = NoiseField::sample(w, h, |u, v| {
        noise.fractal_simplex(u + WIND_OFFSET, v + WIND_OFFSET, 3, 0.5, 2.0, WIND_FREQUENCY)
    });

    let max_x = w as f32 - 1.0;
    let max_y = h as f32 - 1.0;
    RgbaImage::from_fn(w, h, |x, y| {
        let d = displacement(direction, magnitude, field.get(x, y));
        let sx = (x as f32 + 0.5 - d.x).floor().clamp(0.0, max_x) as u32;
        let sy = (y as f32 + 0.5 - d.y).floor().clamp(0.0, max_y) as u32;
        *texture.get_pixel(sx, sy)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::FastNoiseGenerator;
    use image::Rgba;

    fn striped(size: u32) -> RgbaImage {
        RgbaImage::from_fn(size, size, |x, y| Rgba([(x * 4) as u8, (y * 4) as u8, 128, 255]))
    }

    #[test]
    fn test_zero_wind_is_identity() {
        let tex = striped(32);
        let noise = FastNoiseGenerator::new(1);
        assert_eq!(apply_wind(&tex, &noise, 0.0, 45.0), tex);
    }

    #[test]
    fn test_wind_perpendicular_to_light() {
        let light = crate::lighting::LightDirection::from_angle(30.0).planar();
        let wind = wind_direction(30.0);
        assert!(light.dot(wind).abs() < 1e-6);
        assert!((wind.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_displacement_bounded() {
        let dir = wind_direction(0.0);
        for n in [-1.0, -0.3, 0.0, 0.5, 1.0] {
            assert!(displacement(dir, 10.0, n).length() <= 10.0 + 1e-4);
        }
    }

    #[test]
    fn test_full_wind_moves_pixels_without_holes() {
        let tex = striped(64);
        let noise = FastNoiseGenerator::new(9);
        let out = apply_wind(&tex, &noise, 1.0, 0.0);
        assert_ne!(out, tex);
        assert!(out.pixels().all(|p| p[3] == 255));
    }

    #[test]
    fn test_wind_is_deterministic() {
        let tex = striped(48);
        let a = apply_wind(&tex, &FastNoiseGenerator::new(4), 0.7, 120.0);
        let b = apply_wind(&tex, &FastNoiseGenerator::new(4), 0.7, 120.0);
        assert_eq!(a, b);
    }
}
