//! Seeded 2D noise algorithms backed by FastNoiseLite.

use fastnoise_lite::{FastNoiseLite, FractalType, NoiseType};

use super::worley::{DistanceMetric, WorleyPoints};

/// Added to the seed when scattering cellular feature points so they do
/// not share a stream with the simplex permutation.
const WORLEY_SEED_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

/// Offset applied to the second warp axis so both displacement components
/// sample uncorrelated regions of the same field.
const WARP_AXIS_OFFSET: f32 = 137.31;

/// Source of deterministic 2D scalar fields.
///
/// Implementations must be pure: the same `(x, y)` and parameters always
/// give the same value for a given instance. Coordinates are in canvas
/// units, where the canvas spans `[0, 1]` on both axes and `scale` is the
/// number of base-frequency cycles across it.
pub trait NoiseSource: Send + Sync {
    /// Seed the source was constructed with.
    fn seed(&self) -> u64;

    /// Single-octave simplex noise in `[-1, 1]`.
    fn simplex(&self, x: f32, y: f32) -> f32;

    /// Octave-summed simplex noise in `[-1, 1]`.
    fn fractal_simplex(
        &self,
        x: f32,
        y: f32,
        octaves: u32,
        persistence: f32,
        lacunarity: f32,
        scale: f32,
    ) -> f32;

    /// Ridged multifractal simplex noise in `[0, 1]`.
    fn ridged_simplex(
        &self,
        x: f32,
        y: f32,
        octaves: u32,
        gain: f32,
        lacunarity: f32,
        scale: f32,
    ) -> f32;

    /// Feature points for cellular noise with `num_points` cells.
    fn worley_points(&self, num_points: usize) -> WorleyPoints {
        WorleyPoints::new(num_points, self.seed().wrapping_add(WORLEY_SEED_SALT))
    }

    /// Normalized distance to the nearest of `num_points` feature points, in `[0, 1]`.
    ///
    /// Rebuilds the point set on every call; bulk sampling should hold on
    /// to [`NoiseSource::worley_points`] instead.
    fn worley_noise(&self, x: f32, y: f32, num_points: usize, metric: DistanceMetric) -> f32 {
        self.worley_points(num_points).sample(x, y, metric)
    }

    /// Samples `sample_fn` at the coordinates produced by `warp_fn`.
    fn domain_warp(
        &self,
        x: f32,
        y: f32,
        warp_fn: &dyn Fn(f32, f32) -> (f32, f32),
        sample_fn: &dyn Fn(f32, f32) -> f32,
    ) -> f32 {
        let (wx, wy) = warp_fn(x, y);
        sample_fn(wx, wy)
    }

    /// Displaces `(x, y)` by up to `strength` along each axis using simplex noise at `scale`.
    fn simplex_warp(&self, x: f32, y: f32, strength: f32, scale: f32) -> (f32, f32) {
        let dx = self.simplex(x * scale, y * scale);
        let dy = self.simplex(x * scale + WARP_AXIS_OFFSET, y * scale - WARP_AXIS_OFFSET);
        (x + dx * strength, y + dy * strength)
    }
}

/// Stateless [`NoiseSource`] built on OpenSimplex2.
///
/// A fresh `FastNoiseLite` is configured for every sample, so one instance
/// can be shared across threads without synchronization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FastNoiseGenerator {
    seed: u64,
    noise_seed: i32,
}

impl FastNoiseGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            noise_seed: (seed % i32::MAX as u64) as i32,
        }
    }

    fn configured(&self, frequency: f32, fractal: Option<(FractalType, u32, f32, f32)>) -> FastNoiseLite {
        let mut noise = FastNoiseLite::new();
        noise.set_seed(Some(self.noise_seed));
        noise.set_noise_type(Some(NoiseType::OpenSimplex2));
        noise.set_frequency(Some(frequency));

        if let Some((kind, octaves, gain, lacunarity)) = fractal {
            noise.set_fractal_type(Some(kind));
            noise.set_fractal_octaves(Some(octaves.max(1) as i32));
            noise.set_fractal_gain(Some(gain));
            noise.set_fractal_lacunarity(Some(lacunarity));
        }

        noise
    }
}

impl NoiseSource for FastNoiseGenerator {
    fn seed(&self) -> u64 {
        self.seed
    }

    fn simplex(&self, x: f32, y: f32) -> f32 {
        self.configured(1.0, None).get_noise_2d(x, y)
    }

    fn fractal_simplex(
        &self,
        x: f32,
        y: f32,
        octaves: u32,
        persistence: f32,
        lacunarity: f32,
        scale: f32,
    ) -> f32 {
        self.configured(scale, Some((FractalType::FBm, octaves, persistence, lacunarity)))
            .get_noise_2d(x, y)
            .clamp(-1.0, 1.0)
    }

    fn ridged_simplex(
        &self,
        x: f32,
        y: f32,
        octaves: u32,
        gain: f32,
        lacunarity: f32,
        scale: f32,
    ) -> f32 {
        let v = self
            .configured(scale, Some((FractalType::Ridged, octaves, gain, lacunarity)))
            .get_noise_2d(x, y);
        ((v + 1.0) * 0.5).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> impl Iterator<Item = (f32, f32)> {
        (0..16).flat_map(|j| (0..16).map(move |i| (i as f32 / 15.0, j as f32 / 15.0)))
    }

    #[test]
    fn test_noise_reproducibility() {
        let a = FastNoiseGenerator::new(12345);
        let b = FastNoiseGenerator::new(12345);
        for (x, y) in grid() {
            assert_eq!(a.simplex(x * 7.0, y * 7.0), b.simplex(x * 7.0, y * 7.0));
            assert_eq!(
                a.fractal_simplex(x, y, 4, 0.5, 2.0, 4.0),
                b.fractal_simplex(x, y, 4, 0.5, 2.0, 4.0)
            );
        }
    }

    #[test]
    fn test_different_seeds_produce_different_fields() {
        let a = FastNoiseGenerator::new(1);
        let b = FastNoiseGenerator::new(2);
        let differs = grid().any(|(x, y)| {
            a.fractal_simplex(x, y, 3, 0.5, 2.0, 4.0) != b.fractal_simplex(x, y, 3, 0.5, 2.0, 4.0)
        });
        assert!(differs, "Different seeds should produce different results");
    }

    #[test]
    fn test_ranges() {
        let noise = FastNoiseGenerator::new(77);
        for (x, y) in grid() {
            let s = noise.simplex(x * 9.0, y * 9.0);
            let f = noise.fractal_simplex(x, y, 5, 0.6, 2.1, 6.0);
            let r = noise.ridged_simplex(x, y, 3, 0.5, 2.0, 5.0);
            let w = noise.worley_noise(x, y, 6, DistanceMetric::Manhattan);
            assert!((-1.0..=1.0).contains(&s), "simplex {s}");
            assert!((-1.0..=1.0).contains(&f), "fractal {f}");
            assert!((0.0..=1.0).contains(&r), "ridged {r}");
            assert!((0.0..=1.0).contains(&w), "worley {w}");
        }
    }

    #[test]
    fn test_domain_warp_composes_closures() {
        let noise = FastNoiseGenerator::new(5);
        let v = noise.domain_warp(0.25, 0.5, &|x, y| (x + 1.0, y * 2.0), &|x, y| x + y);
        assert!((v - 2.25).abs() < 1e-6);
    }

    #[test]
    fn test_zero_strength_warp_is_identity() {
        let noise = FastNoiseGenerator::new(5);
        assert_eq!(noise.simplex_warp(0.3, 0.7, 0.0, 3.0), (0.3, 0.7));
    }

    #[test]
    fn test_large_seed_is_folded() {
        let noise = FastNoiseGenerator::new(u64::MAX);
        assert!(noise.noise_seed >= 0);
        assert_eq!(noise.seed(), u64::MAX);
    }
}
