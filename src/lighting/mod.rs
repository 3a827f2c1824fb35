//! Normal-map derivation and directional light shading.

mod directional;
mod normal_map;

pub use directional::{apply_directional_light, LightDirection, ShadingWeights};
pub use normal_map::{calculate_normal_map, HeightField, NormalMap};
