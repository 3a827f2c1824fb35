//! Cellular (Worley) noise over seeded feature points.

use glam::Vec2;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Distance function used to measure the gap to the nearest feature point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    #[default]
    Euclidean,
    Manhattan,
    Chebyshev,
}

impl DistanceMetric {
    pub fn distance(self, a: Vec2, b: Vec2) -> f32 {
        let d = (a - b).abs();
        match self {
            DistanceMetric::Euclidean => d.length(),
            DistanceMetric::Manhattan => d.x + d.y,
            DistanceMetric::Chebyshev => d.x.max(d.y),
        }
    }
}

/// Feature points scattered over the unit square.
///
/// Sampling returns the distance to the nearest point divided by the mean
/// cell spacing (`1 / sqrt(n)`), clamped to [0, 1]. Values near 0 sit on a
/// feature point; values near 1 sit between cells.
#[derive(Debug, Clone)]
pub struct WorleyPoints {
    points: Vec<Vec2>,
    spacing: f32,
}

impl WorleyPoints {
    /// Scatters `num_points` feature points using the given seed.
    ///
    /// At least one point is always placed so sampling is well defined.
    pub fn new(num_points: usize, seed: u64) -> Self {
        let n = num_points.max(1);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let points = (0..n)
            .map(|_| Vec2::new(rng.random::<f32>(), rng.random::<f32>()))
            .collect();

        Self {
            points,
            spacing: 1.0 / (n as f32).sqrt(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Normalized distance from `(x, y)` to the nearest feature point.
    ///
    /// Brute-force search; cloud layers use a handful of cells, so a
    /// spatial index would not pay for itself.
    pub fn sample(&self, x: f32, y: f32, metric: DistanceMetric) -> f32 {
        let p = Vec2::new(x, y);
        let nearest = self
            .points
            .iter()
            .map(|&c| metric.distance(p, c))
            .fold(f32::INFINITY, f32::min);

        (nearest / self.spacing).clamp(0.0, 1.0)
    }
}
