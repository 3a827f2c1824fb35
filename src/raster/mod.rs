//! Raster utilities shared by the cloud and atmosphere layers.
//!
//! Everything here works on `image` buffers with 8-bit channels and does
//! its arithmetic in `f32`, clamping before each write.

mod composite;
mod disc;
mod filters;
mod spherify;

pub use composite::{center_offset, composite_centered, ensure_rgba, shaded_planet};
pub use disc::{create_circle_mask, multiply_masks, Disc};
pub use filters::{blur_layer, blur_rgb, enhance_contrast};
pub use spherify::{apply_spherical_distortion, sample_bilinear, spherical_source_radius};
