//! Directional relighting of the cloud sprite.
//!
//! The lit hemisphere gets denser, brighter and crisper clouds; the far
//! side fades toward a murky gray-blue silhouette. All per-pixel math is
//! done in `f32` and clamped before it is written back.

use glam::Vec2;
use image::RgbaImage;

use crate::lighting::{apply_directional_light, calculate_normal_map, HeightField, LightDirection, ShadingWeights};
use crate::raster::{blur_rgb, enhance_contrast, Disc};

/// Opacity gain at the brightest point of the lit limb.
const LIT_OPACITY_BOOST: f32 = 0.4;
/// Fraction of `ambient_light` left as opacity at the antipode.
const DARK_OPACITY_FLOOR: f32 = 0.15;
const NORMAL_STRENGTH: f32 = 2.0;
/// Shading blur as a fraction of the canvas side.
const SHADING_BLUR_FRACTION: f32 = 0.03;
/// Light-facing band edges for the contrast pass.
const LIT_BAND: f32 = 0.3;
const MID_GRAY: f32 = 128.0;
const SHADOW_TINT: [f32; 3] = [52.0, 58.0, 76.0];
const GLOBAL_CONTRAST: f32 = 1.2;

/// Inputs for [`relight_clouds`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelightParams {
    pub light_angle: f32,
    pub ambient: f32,
    pub diffuse: f32,
    pub specular: f32,
}

/// Signed light-facing term for a pixel: `+1` at the lit limb, `-1` at the
/// antipode, `0` at the center and along the terminator diameter.
#[inline]
fn light_facing(disc: &Disc, light: Vec2, x: u32, y: u32) -> f32 {
    (disc.offset(x, y).dot(light) / disc.radius).clamp(-1.0, 1.0)
}

/// Opacity multiplier for a light-facing term `d`.
///
/// Rises to `1 + LIT_OPACITY_BOOST` on the lit limb and falls to
/// `DARK_OPACITY_FLOOR * ambient` at the antipode. Continuous at `d = 0`.
#[inline]
pub fn terminator_opacity(d: f32, ambient: f32) -> f32 {
    if d >= 0.0 {
        1.0 + LIT_OPACITY_BOOST * d * (2.0 - d)
    } else {
        let floor = DARK_OPACITY_FLOOR * ambient;
        floor + (1.0 - floor) * (1.0 + d) * (1.0 + d)
    }
}

fn apply_terminator_opacity(texture: &mut RgbaImage, light: Vec2, ambient: f32) {
    let disc = Disc::for_canvas(texture.width());
    for (x, y, p) in texture.enumerate_pixels_mut() {
        if p[3] == 0 {
            continue;
        }
        let m = terminator_opacity(light_facing(&disc, light, x, y), ambient);
        p[3] = (p[3] as f32 * m).round().clamp(0.0, 255.0) as u8;
    }
}

/// Per-band tone curve for one channel.
#[inline]
fn band_tone(c: f32, d: f32) -> f32 {
    if d > LIT_BAND {
        let k = 1.2 + 0.2 * (d - LIT_BAND) / (1.0 - LIT_BAND);
        MID_GRAY + (c - MID_GRAY) * k
    } else if d < -LIT_BAND {
        let m = 1.0 - 0.6 * (-d - LIT_BAND) / (1.0 - LIT_BAND);
        c * m
    } else {
        let k = 1.0 + 0.2 * (d + LIT_BAND) / (2.0 * LIT_BAND);
        MID_GRAY + (c - MID_GRAY) * k
    }
}

/// Light-aware contrast pass.
///
/// Strongly lit pixels are pushed 20 to 40 percent away from mid-gray,
/// strongly unlit ones are darkened by up to 0.4x, and the band between
/// blends continuously. A gray-blue floor scaled by `ambient` keeps the
/// shadow side off pure black.
pub fn enhance_cloud_contrast(texture: &RgbaImage, light: Vec2, ambient: f32) -> RgbaImage {
    let disc = Disc::for_canvas(texture.width());
    let floor_scale = 0.5 + 0.5 * ambient;
    let mut out = texture.clone();

    for (x, y, p) in out.enumerate_pixels_mut() {
        if p[3] == 0 {
            continue;
        }
        let d = light_facing(&disc, light, x, y);
        for c in 0..3 {
            let toned = band_tone(p[c] as f32, d).max(SHADOW_TINT[c] * floor_scale);
            p[c] = toned.round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}

/// Runs the full relighting sequence on a flat cloud texture.
pub fn relight_clouds(texture: &RgbaImage, params: &RelightParams) -> RgbaImage {
    let light = LightDirection::from_angle(params.light_angle);
    let planar = light.planar();

    let mut lit = texture.clone();
    apply_terminator_opacity(&mut lit, planar, params.ambient);

    let normals = calculate_normal_map(&HeightField::from_alpha(&lit), NORMAL_STRENGTH);
    let shaded = apply_directional_light(
        &lit,
        &normals,
        light.vector(),
        ShadingWeights {
            ambient: params.ambient,
            diffuse: params.diffuse,
            specular: params.specular,
        },
    );

    let softened = blur_rgb(&shaded, texture.width() as f32 * SHADING_BLUR_FRACTION);
    let banded = enhance_cloud_contrast(&softened, planar, params.ambient);
    enhance_contrast(&banded, GLOBAL_CONTRAST)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn params() -> RelightParams {
        RelightParams {
            light_angle: 0.0,
            ambient: 0.75,
            diffuse: 0.7,
            specular: 0.02,
        }
    }

    #[test]
    fn test_terminator_opacity_profile() {
        assert!((terminator_opacity(0.0, 0.75) - 1.0).abs() < 1e-6);
        assert!((terminator_opacity(1.0, 0.75) - 1.4).abs() < 1e-6);
        assert!((terminator_opacity(-1.0, 0.75) - 0.1125).abs() < 1e-6);
        assert!((terminator_opacity(-1e-4, 0.75) - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_band_tone_continuous() {
        for c in [0.0, 64.0, 200.0, 255.0] {
            let eps = 1e-4;
            assert!((band_tone(c, LIT_BAND + eps) - band_tone(c, LIT_BAND - eps)).abs() < 0.05);
            assert!((band_tone(c, -LIT_BAND + eps) - band_tone(c, -LIT_BAND - eps)).abs() < 0.05);
        }
    }

    #[test]
    fn test_lit_side_keeps_more_opacity() {
        // Light from the right.
        let tex = RgbaImage::from_pixel(64, 64, Rgba([255, 255, 255, 150]));
        let out = relight_clouds(&tex, &params());
        let lit = out.get_pixel(56, 32);
        let dark = out.get_pixel(7, 32);
        assert!(lit[3] > 150, "lit alpha {}", lit[3]);
        assert!(dark[3] < 150, "dark alpha {}", dark[3]);
        assert!(lit[0] > dark[0]);
    }

    #[test]
    fn test_shadow_side_never_black() {
        let tex = RgbaImage::from_pixel(64, 64, Rgba([10, 10, 10, 255]));
        let out = enhance_cloud_contrast(&tex, Vec2::X, 0.75);
        let p = out.get_pixel(2, 32);
        assert!(p[0] > 0 && p[2] > p[0], "expected gray-blue floor, got {:?}", p);
    }

    #[test]
    fn test_transparent_stays_transparent() {
        let tex = RgbaImage::new(32, 32);
        let out = relight_clouds(&tex, &params());
        assert!(out.pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn test_overbright_saturates_instead_of_wrapping() {
        let tex = RgbaImage::from_pixel(48, 48, Rgba([255, 255, 255, 255]));
        let out = relight_clouds(
            &tex,
            &RelightParams {
                light_angle: 0.0,
                ambient: 1.0,
                diffuse: 1.0,
                specular: 1.0,
            },
        );
        let lit = out.get_pixel(44, 24);
        assert_eq!(lit[3], 255);
        assert_eq!(lit[0], 255);
    }
}
