//! Soft outer glow drawn behind the planet disc.

use image::{Rgba, RgbaImage};
use serde::Serialize;

use super::config::AtmosphereConfig;
use crate::raster::{blur_layer, composite_centered};

/// Padding as a fraction of the planet canvas at zero glow.
const BASE_PADDING: f32 = 0.11;
/// Extra padding fraction at full glow.
const GLOW_PADDING: f32 = 0.03;
const RING_PADDING_SCALE: f32 = 1.08;
const RING_BLUR_SCALE: f32 = 2.0;
/// Blur sigma per pixel of halo thickness.
const BLUR_PER_THICKNESS: f32 = 1.5;

/// Sizes used for one glow pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GlowGeometry {
    /// Extra radius of the glow disc beyond the planet edge.
    pub padding_px: u32,
    /// `padding_px` as a percentage of the planet canvas width.
    pub padding_pct: f32,
    pub blur_sigma: f32,
    /// Border added on every side of the planet canvas.
    pub margin_px: u32,
    /// Side of the output canvas.
    pub canvas_size: u32,
}

/// Computes padding, blur and output size for a `size` px planet.
///
/// The margin covers the padding plus three blur sigmas, so the blurred
/// glow never touches the canvas border.
pub fn glow_geometry(size: u32, config: &AtmosphereConfig, has_rings: bool) -> GlowGeometry {
    let mut fraction = BASE_PADDING + GLOW_PADDING * config.glow_intensity;
    let mut sigma = (config.halo_thickness as f32 * BLUR_PER_THICKNESS * (0.5 + config.blur_amount)).max(1.0);
    if has_rings {
        fraction *= RING_PADDING_SCALE;
        sigma *= RING_BLUR_SCALE;
    }

    let padding_px = (size as f32 * fraction).round() as u32;
    let margin_px = padding_px + (3.0 * sigma).ceil() as u32;
    GlowGeometry {
        padding_px,
        padding_pct: fraction * 100.0,
        blur_sigma: sigma,
        margin_px,
        canvas_size: size + 2 * margin_px,
    }
}

/// Atmosphere color with alpha boosted by `1 + 0.5 * glow`, capped at 255.
pub fn glow_color(color: Rgba<u8>, glow_intensity: f32) -> Rgba<u8> {
    let [r, g, b, a] = color.0;
    let boosted = (a as f32 * (1.0 + 0.5 * glow_intensity)).min(255.0) as u8;
    Rgba([r, g, b, boosted])
}

/// Draws the blurred glow disc on an enlarged canvas and pastes `planet`
/// centered on top of it.
pub fn build_glow(planet: &RgbaImage, color: Rgba<u8>, geometry: &GlowGeometry) -> RgbaImage {
    let side = geometry.canvas_size;
    let center = side as f32 * 0.5;
    let radius = planet.width() as f32 * 0.5 + geometry.padding_px as f32;
    let r2 = radius * radius;

    let disc = RgbaImage::from_fn(side, side, |x, y| {
        let dx = x as f32 + 0.5 - center;
        let dy = y as f32 + 0.5 - center;
        if dx * dx + dy * dy <= r2 {
            color
        } else {
            Rgba([0, 0, 0, 0])
        }
    });

    let rgb = [color[0], color[1], color[2]];
    let mut result = blur_layer(&disc, rgb, geometry.blur_sigma);
    composite_centered(&mut result, planet);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_defaults() {
        let geom = glow_geometry(512, &AtmosphereConfig::default(), false);
        assert_eq!(geom.padding_px, 64);
        assert!((geom.padding_pct - 12.5).abs() < 1e-4);
        assert!((geom.blur_sigma - 4.5).abs() < 1e-6);
        assert_eq!(geom.margin_px, 64 + 14);
        assert_eq!(geom.canvas_size, 512 + 2 * 78);
    }

    #[test]
    fn test_rings_enlarge_padding_and_blur() {
        let config = AtmosphereConfig::default();
        let plain = glow_geometry(512, &config, false);
        let ringed = glow_geometry(512, &config, true);
        assert!(ringed.padding_px > plain.padding_px);
        assert!((ringed.blur_sigma - 2.0 * plain.blur_sigma).abs() < 1e-6);
        assert!(ringed.canvas_size > plain.canvas_size);
    }

    #[test]
    fn test_glow_color_alpha_cap() {
        assert_eq!(glow_color(Rgba([10, 20, 30, 100]), 1.0).0, [10, 20, 30, 150]);
        assert_eq!(glow_color(Rgba([10, 20, 30, 200]), 1.0)[3], 255);
        assert_eq!(glow_color(Rgba([10, 20, 30, 80]), 0.0)[3], 80);
    }

    #[test]
    fn test_glow_rim_around_planet() {
        let planet = crate::raster::shaded_planet(64, [200, 100, 50], 45.0);
        let config = AtmosphereConfig::default();
        let geom = glow_geometry(64, &config, false);
        let out = build_glow(&planet, Rgba([100, 150, 255, 120]), &geom);
        assert_eq!(out.width(), geom.canvas_size);

        let c = geom.canvas_size / 2;
        // Planet center is untouched; just outside the planet, glow shows.
        assert_eq!(out.get_pixel(c, c), planet.get_pixel(32, 32));
        let rim = out.get_pixel(c + 32 + geom.padding_px / 2, c);
        assert!(rim[3] > 0);
        assert!(rim[2] > rim[0]);
        assert_eq!(out.get_pixel(0, 0)[3], 0);
    }
}
