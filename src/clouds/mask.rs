//! Cloud opacity mask from layered noise.
//!
//! Five fields are blended into one cloud-density value per pixel. A second
//! "cluster" field raises the threshold in sparse regions so cover clumps
//! instead of scattering evenly. Coordinates are in canvas units, so the
//! pattern scales with the canvas rather than tiling.

use image::{GrayImage, Luma};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use std::f32::consts::PI;

use crate::noise::{DistanceMetric, NoiseField, NoiseSource};
use crate::raster::{create_circle_mask, multiply_masks};

// Field weights. Sum to 1.0.
const BASE_WEIGHT: f32 = 0.40;
const CELLULAR_WEIGHT: f32 = 0.25;
const DETAIL_WEIGHT: f32 = 0.15;
const EDGE_WEIGHT: f32 = 0.15;
const ORGANIZATION_WEIGHT: f32 = 0.05;

/// Base shape frequency in cycles per canvas, about 0.008 cycles/px at 512 px.
const BASE_FREQUENCY: f32 = 4.0;
const BASE_WARP_STRENGTH: f32 = 0.04;
const BASE_WARP_SCALE: f32 = 3.0;
const CELL_COUNT: usize = 10;
const DETAIL_FREQUENCY: f32 = 12.0;
const EDGE_FREQUENCY: f32 = 6.0;
const ORGANIZATION_FREQUENCY: f32 = 1.5;
const CLUSTER_FREQUENCY: f32 = 2.5;
const CLUSTER_WARP_STRENGTH: f32 = 0.05;
const CLUSTER_WARP_SCALE: f32 = 2.0;

// Offsets that keep each field in its own region of the noise plane.
const DETAIL_OFFSET: f32 = 31.7;
const EDGE_OFFSET: f32 = -57.3;
const ORGANIZATION_OFFSET: f32 = 83.1;
const CLUSTER_OFFSET: f32 = -19.9;

const CLIFF_LOW: f32 = 0.4;
const CLIFF_HIGH: f32 = 0.7;
const JITTER: f32 = 0.01;

const BASE_THRESHOLD: f32 = 0.55;
const COVERAGE_SWING: f32 = 0.15;
const CLUSTER_GAP_LEVEL: f32 = 0.45;
const CLUSTER_GAP_WEIGHT: f32 = 0.6;
const CLUSTER_DENSITY_BOOST: f32 = 0.2;
/// Below this coverage the threshold lifts and the alpha ramp fades to zero.
const COVERAGE_FADE: f32 = 0.25;
/// Threshold lift at zero coverage, shrinking linearly to nothing at `COVERAGE_FADE`.
const LOW_COVERAGE_LIFT: f32 = 0.35;

/// The two fields the threshold step consumes.
#[derive(Debug, Clone)]
pub struct CloudNoise {
    /// Blended cloud density in `[0, 1]`.
    pub combined: NoiseField,
    /// Large-scale clumping field in `[0, 1]`.
    pub cluster: NoiseField,
}

#[inline]
fn unit(v: f32) -> f32 {
    ((v + 1.0) * 0.5).clamp(0.0, 1.0)
}

/// Eases values inside the cliff band with a half-cosine so cloud edges
/// steepen through the middle of the band.
#[inline]
fn cliff_curve(v: f32) -> f32 {
    if v > CLIFF_LOW && v < CLIFF_HIGH {
        let t = (v - CLIFF_LOW) / (CLIFF_HIGH - CLIFF_LOW);
        CLIFF_LOW + (CLIFF_HIGH - CLIFF_LOW) * (0.5 - 0.5 * (PI * t).cos())
    } else {
        v
    }
}

/// Evaluates and blends the cloud noise fields for a `size x size` canvas.
///
/// Draws exactly one jitter sample per pixel from `rng`, in row-major order.
pub fn build_cloud_noise(
    noise: &dyn NoiseSource,
    size: u32,
    detail_level: f32,
    rng: &mut ChaCha8Rng,
) -> CloudNoise {
    let base_octaves = 3 + (detail_level * 1.5) as u32;
    let detail_scale = DETAIL_FREQUENCY * (0.5 + 0.5 * detail_level);
    let cells = noise.worley_points(CELL_COUNT);

    let base = NoiseField::square(size, |u, v| {
        unit(noise.domain_warp(
            u,
            v,
            &|x, y| noise.simplex_warp(x, y, BASE_WARP_STRENGTH, BASE_WARP_SCALE),
            &|x, y| noise.fractal_simplex(x, y, base_octaves, 0.55, 2.0, BASE_FREQUENCY),
        ))
    });
    let cellular = NoiseField::square(size, |u, v| 1.0 - cells.sample(u, v, DistanceMetric::Euclidean));
    let detail = NoiseField::square(size, |u, v| {
        unit(noise.fractal_simplex(u + DETAIL_OFFSET, v + DETAIL_OFFSET, 4, 0.5, 2.2, detail_scale))
    });
    let edge = NoiseField::square(size, |u, v| {
        noise.ridged_simplex(u + EDGE_OFFSET, v + EDGE_OFFSET, 3, 0.5, 2.0, EDGE_FREQUENCY)
    });
    let organization = NoiseField::square(size, |u, v| {
        unit(noise.fractal_simplex(
            u + ORGANIZATION_OFFSET,
            v + ORGANIZATION_OFFSET,
            2,
            0.5,
            2.0,
            ORGANIZATION_FREQUENCY,
        ))
    });
    let cluster = NoiseField::square(size, |u, v| {
        unit(noise.domain_warp(
            u + CLUSTER_OFFSET,
            v + CLUSTER_OFFSET,
            &|x, y| noise.simplex_warp(x, y, CLUSTER_WARP_STRENGTH, CLUSTER_WARP_SCALE),
            &|x, y| noise.fractal_simplex(x, y, 2, 0.6, 1.8, CLUSTER_FREQUENCY),
        ))
    });

    // Jitter is drawn in the same row-major order the fields were sampled.
    let jitter: Vec<f32> = (0..size as usize * size as usize)
        .map(|_| (rng.random::<f32>() - 0.5) * JITTER)
        .collect();

    let combined = NoiseField::from_pixels(size, size, |x, y| {
        let blended = base.get(x, y) * BASE_WEIGHT
            + cellular.get(x, y) * CELLULAR_WEIGHT
            + detail.get(x, y) * DETAIL_WEIGHT
            + edge.get(x, y) * EDGE_WEIGHT
            + organization.get(x, y) * ORGANIZATION_WEIGHT;
        (cliff_curve(blended) + jitter[y as usize * size as usize + x as usize]).clamp(0.0, 1.0)
    });

    CloudNoise { combined, cluster }
}

#[inline]
fn coverage_fade(coverage: f32) -> f32 {
    (coverage / COVERAGE_FADE).clamp(0.0, 1.0)
}

/// Threshold a pixel needs to pass at the given coverage and cluster value.
///
/// Sparse coverage raises the threshold so the cloud area shrinks with it.
#[inline]
pub fn local_threshold(coverage: f32, cluster: f32) -> f32 {
    let gap = (CLUSTER_GAP_LEVEL - cluster).max(0.0) * CLUSTER_GAP_WEIGHT * (1.0 - 0.5 * coverage);
    let lift = (1.0 - coverage_fade(coverage)) * LOW_COVERAGE_LIFT;
    BASE_THRESHOLD - coverage * COVERAGE_SWING + gap + lift
}

/// Alpha for a density `value` against `threshold`.
///
/// Barely passing pixels land around 60 to 90; dense cores approach 255.
#[inline]
fn ramp_alpha(value: f32, threshold: f32) -> f32 {
    if value <= threshold {
        return 0.0;
    }
    let n = (value - threshold) / (1.0 - threshold).max(f32::EPSILON);
    if n < 0.1 {
        60.0 + n / 0.1 * 30.0
    } else if n < 0.4 {
        90.0 + (n - 0.1) / 0.3 * 140.0
    } else {
        230.0 + ((n - 0.4) / 0.6).min(1.0) * 25.0
    }
}

/// Thresholds cloud noise into an 8-bit mask confined to the canvas disc.
///
/// Every step is monotone in `coverage`, so raising coverage never lowers
/// any pixel.
pub fn build_cloud_mask(noise: &CloudNoise, coverage: f32) -> GrayImage {
    let size = noise.combined.width();
    let fade = coverage_fade(coverage);

    let raw = GrayImage::from_fn(size, size, |x, y| {
        let value = noise.combined.get(x, y);
        let cluster = noise.cluster.get(x, y);
        let alpha = ramp_alpha(value, local_threshold(coverage, cluster))
            * (1.0 + CLUSTER_DENSITY_BOOST * cluster)
            * fade;
        Luma([alpha.round().clamp(0.0, 255.0) as u8])
    });

    multiply_masks(&raw, &create_circle_mask(size))
}

/// Fraction of disc pixels with nonzero alpha.
pub fn mask_fill_fraction(mask: &GrayImage) -> f32 {
    let disc = crate::raster::Disc::for_canvas(mask.width());
    let (filled, total) = mask
        .enumerate_pixels()
        .filter(|(x, y, _)| disc.contains(*x, *y))
        .fold((0u64, 0u64), |(f, t), (_, _, p)| (f + (p[0] > 0) as u64, t + 1));
    if total == 0 {
        0.0
    } else {
        filled as f32 / total as f32
    }
}
