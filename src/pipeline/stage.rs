//! Feature stage trait and pipeline orchestration.

use image::{DynamicImage, Rgba, RgbaImage};
use thiserror::Error;

use crate::atmosphere::{Atmosphere, PlanetColors};
use crate::clouds::Clouds;
use crate::error::GenerationError;

/// Unique identifier for feature stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageId {
    Atmosphere,
    Clouds,
}

impl StageId {
    pub fn name(&self) -> &'static str {
        match self {
            StageId::Atmosphere => "atmosphere",
            StageId::Clouds => "clouds",
        }
    }
}

/// Per-planet facts shared by every stage.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub planet_type: String,
    pub has_rings: bool,
    /// Overrides the palette's atmosphere color.
    pub atmosphere_color: Option<Rgba<u8>>,
    /// Used for the atmosphere color when no explicit one is set.
    pub planet_colors: Option<PlanetColors>,
}

impl RenderContext {
    pub fn new(planet_type: impl Into<String>) -> Self {
        Self {
            planet_type: planet_type.into(),
            has_rings: false,
            atmosphere_color: None,
            planet_colors: None,
        }
    }

    pub fn with_planet_colors(mut self, colors: PlanetColors) -> Self {
        self.planet_colors = Some(colors);
        self
    }

    pub fn with_rings(mut self, has_rings: bool) -> Self {
        self.has_rings = has_rings;
        self
    }
}

/// Errors that can occur during pipeline execution.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Stage '{0}' failed: {1}")]
    StageFailed(String, #[source] GenerationError),
    #[error("Stage '{0}' already added")]
    DuplicateStage(String),
}

/// One feature layer composited onto the planet raster.
///
/// Stages own their generator, so they take `&mut self` and may cache
/// intermediate rasters between runs.
pub trait FeatureStage: Send {
    fn id(&self) -> StageId;

    fn name(&self) -> &str;

    /// Returns the planet with this stage's layer composited on.
    fn execute(&mut self, planet: RgbaImage, context: &RenderContext) -> Result<RgbaImage, GenerationError>;
}

/// Runs feature stages in insertion order.
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Box<dyn FeatureStage>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a stage. Each stage kind may appear once.
    pub fn add_stage<S: FeatureStage + 'static>(&mut self, stage: S) -> Result<&mut Self, PipelineError> {
        if self.stages.iter().any(|s| s.id() == stage.id()) {
            return Err(PipelineError::DuplicateStage(stage.id().name().to_string()));
        }
        self.stages.push(Box::new(stage));
        Ok(self)
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    pub fn stage_ids(&self) -> Vec<StageId> {
        self.stages.iter().map(|s| s.id()).collect()
    }

    pub fn run(&mut self, planet: RgbaImage, context: &RenderContext) -> Result<RgbaImage, PipelineError> {
        self.run_with_callbacks(planet, context, |_, _, _| {}, |_, _, _| {})
    }

    /// Executes all stages, reporting `(name, index, total)` around each one.
    ///
    /// The first failing stage stops the run; its error is wrapped with the
    /// stage name.
    pub fn run_with_callbacks<F1, F2>(
        &mut self,
        planet: RgbaImage,
        context: &RenderContext,
        mut on_stage_start: F1,
        mut on_stage_complete: F2,
    ) -> Result<RgbaImage, PipelineError>
    where
        F1: FnMut(&str, usize, usize),
        F2: FnMut(&str, usize, usize),
    {
        let total = self.stages.len();
        let mut image = planet;

        for (i, stage) in self.stages.iter_mut().enumerate() {
            on_stage_start(stage.name(), i, total);
            image = stage
                .execute(image, context)
                .map_err(|e| PipelineError::StageFailed(stage.name().to_string(), e))?;
            on_stage_complete(stage.name(), i, total);
        }

        Ok(image)
    }
}

/// Glow and halo stage. Enlarges the canvas.
pub struct AtmosphereStage {
    pub atmosphere: Atmosphere,
}

impl FeatureStage for AtmosphereStage {
    fn id(&self) -> StageId {
        StageId::Atmosphere
    }

    fn name(&self) -> &str {
        "Atmosphere"
    }

    fn execute(&mut self, planet: RgbaImage, context: &RenderContext) -> Result<RgbaImage, GenerationError> {
        let color = context
            .atmosphere_color
            .or_else(|| context.planet_colors.map(|c| c.atmosphere_color()));
        self.atmosphere.apply_to_planet(
            &DynamicImage::ImageRgba8(planet),
            &context.planet_type,
            context.has_rings,
            color,
        )
    }
}

/// Cloud layer stage. The sprite keeps its configured size and is centered.
pub struct CloudStage {
    pub clouds: Clouds,
}

impl FeatureStage for CloudStage {
    fn id(&self) -> StageId {
        StageId::Clouds
    }

    fn name(&self) -> &str {
        "Clouds"
    }

    fn execute(&mut self, planet: RgbaImage, _context: &RenderContext) -> Result<RgbaImage, GenerationError> {
        self.clouds.apply_to_planet(&DynamicImage::ImageRgba8(planet))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clouds::CloudConfig;
    use crate::raster::shaded_planet;

    fn clouds(size: u32) -> CloudStage {
        CloudStage {
            clouds: Clouds::from_config(CloudConfig {
                seed: 11,
                size,
                coverage: 0.7,
                wind_effect: Some(0.3),
                ..Default::default()
            })
            .with_planet_type("ocean"),
        }
    }

    fn atmosphere() -> AtmosphereStage {
        AtmosphereStage {
            atmosphere: Atmosphere::new(11, 0.5, 0.5),
        }
    }

    #[test]
    fn test_pipeline_runs_in_order() {
        let mut pipeline = Pipeline::new();
        pipeline.add_stage(atmosphere()).unwrap();
        pipeline.add_stage(clouds(64)).unwrap();
        assert_eq!(pipeline.stage_ids(), vec![StageId::Atmosphere, StageId::Clouds]);

        let mut started = Vec::new();
        let mut finished = Vec::new();
        let out = pipeline
            .run_with_callbacks(
                shaded_planet(64, [40, 90, 160], 45.0),
                &RenderContext::new("ocean"),
                |name, i, total| started.push((name.to_string(), i, total)),
                |name, _, _| finished.push(name.to_string()),
            )
            .unwrap();

        assert!(out.width() > 64);
        assert_eq!(started[0], ("Atmosphere".to_string(), 0, 2));
        assert_eq!(finished, vec!["Atmosphere", "Clouds"]);
    }

    #[test]
    fn test_order_matters() {
        let planet = shaded_planet(64, [40, 90, 160], 45.0);
        let ctx = RenderContext::new("ocean");

        let mut a = Pipeline::new();
        a.add_stage(atmosphere()).unwrap();
        a.add_stage(clouds(64)).unwrap();
        let mut b = Pipeline::new();
        b.add_stage(clouds(64)).unwrap();
        b.add_stage(atmosphere()).unwrap();

        let out_a = a.run(planet.clone(), &ctx).unwrap();
        let out_b = b.run(planet, &ctx).unwrap();
        assert_eq!(out_a.dimensions(), out_b.dimensions());
        assert_ne!(out_a, out_b);
    }

    #[test]
    fn test_duplicate_stage_rejected() {
        let mut pipeline = Pipeline::new();
        pipeline.add_stage(clouds(32)).unwrap();
        assert!(matches!(pipeline.add_stage(clouds(32)), Err(PipelineError::DuplicateStage(_))));
        assert_eq!(pipeline.stage_count(), 1);
    }

    #[test]
    fn test_failure_names_stage() {
        let mut pipeline = Pipeline::new();
        pipeline.add_stage(atmosphere()).unwrap();
        let err = pipeline
            .run(shaded_planet(32, [1, 2, 3], 0.0), &RenderContext::new("nowhere"))
            .unwrap_err();
        match err {
            PipelineError::StageFailed(name, GenerationError::Palette(_)) => assert_eq!(name, "Atmosphere"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_planet_colors_reach_atmosphere() {
        let mut pipeline = Pipeline::new();
        pipeline.add_stage(atmosphere()).unwrap();
        let colors = PlanetColors::new([100, 50, 0], [200, 150, 250]);
        let ctx = RenderContext::new("nowhere").with_planet_colors(colors);
        assert!(pipeline.run(shaded_planet(32, [1, 2, 3], 0.0), &ctx).is_ok());
    }

    #[test]
    fn test_empty_pipeline_is_identity() {
        let planet = shaded_planet(32, [1, 2, 3], 0.0);
        let out = Pipeline::new().run(planet.clone(), &RenderContext::new("rocky")).unwrap();
        assert_eq!(out, planet);
    }
}
