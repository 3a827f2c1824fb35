//! Pipeline module for compositing feature layers onto a planet.
//!
//! Stages run in the order they were added, so callers decide whether
//! clouds sit above or below the atmosphere.

mod stage;

pub use stage::{AtmosphereStage, CloudStage, FeatureStage, Pipeline, PipelineError, RenderContext, StageId};
