//! Noise generation for cloud and wind fields.
//!
//! All sources are pure functions of seed and coordinate, so layers built
//! from them are bit-for-bit reproducible.

mod field;
mod generator;
mod worley;

pub use field::NoiseField;
pub use generator::{FastNoiseGenerator, NoiseSource};
pub use worley::{DistanceMetric, WorleyPoints};
