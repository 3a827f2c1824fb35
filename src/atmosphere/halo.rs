//! Ring halo drawn just outside the planet edge.
//!
//! The halo is built from three radial layers rendered at twice the output
//! resolution: a sharp glow hugging the planet, a wide diffuse scatter
//! band, and the main ring. Each layer has its own falloff and blur.

use image::{imageops, Rgba, RgbaImage};

use super::config::AtmosphereConfig;
use crate::logging::StepLogger;
use crate::raster::{blur_layer, composite_centered};

/// Internal resolution multiplier.
pub const SUPERSAMPLE: u32 = 2;
/// Gap between the planet edge and the halo, in output pixels.
const HALO_GAP: f32 = 2.0;
/// Share of the halo thickness taken by the main band.
const MAIN_BAND_SHARE: f32 = 0.7;
/// Half-width of the main band outline, in internal pixels.
const MAIN_OUTLINE: f32 = 1.5;
/// Half-width of each diffuse ring, in internal pixels.
const DIFFUSE_RING_WIDTH: f32 = 12.0;
const DIFFUSE_STEPS: usize = 30;
/// Diffuse rings stop at this fraction of the glow band.
const DIFFUSE_REACH: f32 = 0.6;

pub const MIN_BRIGHTNESS: u8 = 80;
pub const INTENSITY_BOOST: f32 = 1.8;
pub const DOMINANT_BOOST: f32 = 1.2;
pub const RECESSIVE_BOOST: f32 = 0.9;
pub const GRAY_RESTORE: f32 = 1.2;

/// Which channel carries a color's character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dominance {
    Red,
    Green,
    Blue,
    /// All three channels equal.
    Balanced,
}

impl Dominance {
    /// Ties between two channels resolve red first, then blue, then green.
    pub fn of([r, g, b]: [u8; 3]) -> Self {
        if r == g && g == b {
            Dominance::Balanced
        } else if r >= g && r >= b {
            Dominance::Red
        } else if b >= r && b >= g {
            Dominance::Blue
        } else {
            Dominance::Green
        }
    }
}

#[inline]
fn scale(c: u8, k: f32) -> u8 {
    (c as f32 * k).min(255.0) as u8
}

/// Brightens a dim atmosphere color so the halo reads as colored.
///
/// Dark colors are lifted until their weakest channel reaches
/// [`MIN_BRIGHTNESS`], then the dominant channel is boosted harder than the
/// others. A result that collapses to gray gets the input's hue back.
pub fn enhance_halo_color(rgb: [u8; 3]) -> [u8; 3] {
    let [mut r, mut g, mut b] = rgb;
    let min = r.min(g).min(b);
    let max = r.max(g).max(b);
    if min < MIN_BRIGHTNESS && max > 0 {
        let lift = MIN_BRIGHTNESS as f32 / min.max(1) as f32;
        r = scale(r, lift);
        g = scale(g, lift);
        b = scale(b, lift);
    }

    let hi = INTENSITY_BOOST * DOMINANT_BOOST;
    let lo = INTENSITY_BOOST * RECESSIVE_BOOST;
    let [r, g, b] = match Dominance::of([r, g, b]) {
        Dominance::Red => [scale(r, hi), scale(g, lo), scale(b, lo)],
        Dominance::Blue => [scale(r, lo), scale(g, lo), scale(b, hi)],
        Dominance::Green => [scale(r, lo), scale(g, hi), scale(b, lo)],
        Dominance::Balanced => [scale(r, INTENSITY_BOOST), scale(g, INTENSITY_BOOST), scale(b, INTENSITY_BOOST)],
    };

    if r == g && g == b && r > 0 && max > 0 {
        let level = r as f32 * GRAY_RESTORE;
        let ratio = |c: u8| c as f32 / max as f32;
        return [
            (level * ratio(rgb[0])).min(255.0) as u8,
            (level * ratio(rgb[1])).min(255.0) as u8,
            (level * ratio(rgb[2])).min(255.0) as u8,
        ];
    }
    [r, g, b]
}

/// Brighter, more saturated variant of the halo color for the diffuse band.
pub fn diffuse_tint(rgb: [u8; 3]) -> [u8; 3] {
    let add = |c: u8, n: u8| c.saturating_add(n);
    let [r, g, b] = rgb;
    match Dominance::of(rgb) {
        Dominance::Red => [255, add(g, 50), add(b, 70)],
        Dominance::Blue => [add(r, 50), add(g, 70), 255],
        Dominance::Green => [add(r, 50), 255, add(b, 70)],
        Dominance::Balanced => [add(r, 70), add(g, 70), add(b, 90)],
    }
}

fn sharp_profile(t: f32) -> f32 {
    if t < 0.3 {
        0.9 - 0.5 * t
    } else {
        0.7 * (1.0 - (t - 0.3) / 0.7).max(0.0).powf(1.5)
    }
}

fn diffuse_profile(t: f32) -> f32 {
    if t < 0.3 {
        0.8 - 0.5 * t
    } else {
        0.65 * (1.0 - (t - 0.3) / 0.7).max(0.0)
    }
}

fn diffuse_ring_width(t: f32) -> f32 {
    if t < 0.2 {
        DIFFUSE_RING_WIDTH * 1.2
    } else if t < 0.4 {
        DIFFUSE_RING_WIDTH * 1.5
    } else {
        DIFFUSE_RING_WIDTH * (1.0 - (t - 0.4) / 0.2)
    }
}

fn diffuse_boost(t: f32) -> f32 {
    if t < 0.2 {
        1.2
    } else if t < 0.4 {
        0.9
    } else {
        0.6
    }
}

/// Radii of the halo bands on the internal canvas.
#[derive(Debug, Clone, Copy)]
struct Bands {
    inner: f32,
    main_outer: f32,
    outer: f32,
}

impl Bands {
    fn new(planet_radius: f32, config: &AtmosphereConfig) -> Self {
        let s = SUPERSAMPLE as f32;
        let inner = (planet_radius + HALO_GAP) * s;
        let total = config.halo_thickness as f32 * s * (1.0 + config.halo_intensity);
        let main_outer = inner + total * MAIN_BAND_SHARE;
        Self {
            inner,
            main_outer,
            outer: inner + total,
        }
    }

    #[inline]
    fn glow_t(&self, r: f32) -> f32 {
        (r - self.main_outer) / (self.outer - self.main_outer).max(f32::EPSILON)
    }
}

/// Fills a square layer with `color`, taking alpha from the radial `profile`.
fn radial_layer<F>(side: u32, rgb: [u8; 3], profile: F) -> RgbaImage
where
    F: Fn(f32) -> f32,
{
    let center = side as f32 * 0.5;
    RgbaImage::from_fn(side, side, |x, y| {
        let dx = x as f32 + 0.5 - center;
        let dy = y as f32 + 0.5 - center;
        let a = profile((dx * dx + dy * dy).sqrt());
        Rgba([rgb[0], rgb[1], rgb[2], a.round().clamp(0.0, 255.0) as u8])
    })
}

/// Renders the halo for a glow canvas of `canvas_size` and composites it
/// onto `base`.
///
/// `planet_radius` is measured in output pixels from the canvas center.
pub fn apply_halo(
    base: &mut RgbaImage,
    color: Rgba<u8>,
    planet_radius: f32,
    config: &AtmosphereConfig,
    logger: &dyn StepLogger,
) {
    let canvas_size = base.width();
    let rgb = enhance_halo_color([color[0], color[1], color[2]]);
    let tint = diffuse_tint(rgb);
    logger.debug(&format!(
        "Atmosphere color: R:{}, G:{}, B:{}, A:{}",
        color[0], color[1], color[2], color[3]
    ));
    logger.debug(&format!("Enhanced halo color: R:{}, G:{}, B:{}", rgb[0], rgb[1], rgb[2]));
    logger.debug(&format!("Diffuse glow color: R:{}, G:{}, B:{}", tint[0], tint[1], tint[2]));

    let thickness = config.halo_thickness as f32;
    let base_alpha = 255.0 * config.halo_intensity;
    let extra = (thickness * 4.0 * config.blur_amount).round() as u32;
    let hi_size = canvas_size * SUPERSAMPLE;
    let side = hi_size + 2 * extra;
    let bands = Bands::new(planet_radius, config);

    let sharp = radial_layer(side, rgb, |r| {
        if r < bands.main_outer || r > bands.outer {
            return 0.0;
        }
        base_alpha * sharp_profile(bands.glow_t(r)) * 1.5
    });

    let glow_span = bands.outer - bands.main_outer;
    let diffuse = radial_layer(side, tint, |r| {
        let mut best = 0.0f32;
        for i in 0..DIFFUSE_STEPS {
            let t = i as f32 / (DIFFUSE_STEPS - 1) as f32;
            if t >= DIFFUSE_REACH {
                break;
            }
            let ring = bands.main_outer + glow_span * t;
            if (r - ring).abs() <= diffuse_ring_width(t) {
                let a = base_alpha * diffuse_profile(t) * config.blur_amount * 3.0 * diffuse_boost(t);
                best = best.max(a.min(255.0));
            }
        }
        best
    });

    let main = radial_layer(side, rgb, |r| {
        if r < bands.inner - MAIN_OUTLINE || r > bands.main_outer + MAIN_OUTLINE {
            return 0.0;
        }
        let t = ((r - bands.inner) / (bands.main_outer - bands.inner)).clamp(0.0, 1.0);
        let edge = if !(0.3..=0.7).contains(&t) { 0.8 } else { 1.0 };
        base_alpha * edge
    });

    let sharp_sigma = (thickness * 0.3).max(1.0);
    // Equivalent of three staged passes at 0.3, 0.5 and 0.2 of the radius.
    let diffuse_sigma = (thickness * config.blur_amount * 5.0).max(12.0) * (0.38f32).sqrt();
    let final_sigma = (thickness * 0.1).max(0.5);
    logger.debug(&format!(
        "Applying halo blurs: sharp {:.1}px, diffuse {:.1}px",
        sharp_sigma, diffuse_sigma
    ));

    let mut hi_res = RgbaImage::from_pixel(side, side, Rgba([rgb[0], rgb[1], rgb[2], 0]));
    imageops::overlay(&mut hi_res, &blur_layer(&sharp, rgb, sharp_sigma), 0, 0);
    imageops::overlay(&mut hi_res, &blur_layer(&diffuse, tint, diffuse_sigma), 0, 0);
    imageops::overlay(&mut hi_res, &main, 0, 0);
    let hi_res = blur_layer(&hi_res, rgb, final_sigma);

    let cropped = imageops::crop_imm(&hi_res, extra, extra, hi_size, hi_size).to_image();
    let halo = imageops::resize(&cropped, canvas_size, canvas_size, imageops::FilterType::Lanczos3);
    composite_centered(base, &halo);
}
