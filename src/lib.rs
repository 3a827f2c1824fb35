//! Procedural cloud and atmosphere layers for planet renders.
//!
//! Clouds are grown from layered noise, relit against a directional light,
//! drifted by wind and wrapped onto the sphere. The atmosphere adds a soft
//! glow and a colored halo around the disc. Both composite onto an RGBA
//! planet raster, alone or through a [`Pipeline`].

pub mod atmosphere;
pub mod clouds;
pub mod config;
pub mod error;
pub mod export;
pub mod lighting;
pub mod logging;
pub mod noise;
pub mod palette;
pub mod pipeline;
pub mod raster;

pub use atmosphere::{apply_legacy_atmosphere, Atmosphere, AtmosphereConfig, GlowGeometry, PlanetColors};
pub use clouds::{CloudConfig, Clouds};
pub use config::{ConfigError, RenderConfig};
pub use error::GenerationError;
pub use logging::{StepLogger, TracingLogger};
pub use noise::{FastNoiseGenerator, NoiseSource};
pub use palette::{ColorPalette, PlanetType, StaticPalette};
pub use pipeline::{AtmosphereStage, CloudStage, FeatureStage, Pipeline, PipelineError, RenderContext};
