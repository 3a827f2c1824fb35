//! Cloud layer generation and compositing.
//!
//! A [`Clouds`] instance owns one layer: it builds the mask from noise,
//! paints and relights the sprite, drifts it with wind, wraps it onto the
//! sphere and finally composites it onto a planet raster.

mod config;
mod mask;
mod relight;
mod texture;
mod wind;

pub use config::{CloudConfig, DEFAULT_CANVAS_SIZE, DEFAULT_LIGHT_ANGLE, MAX_DETAIL_LEVEL};
pub use mask::{build_cloud_mask, build_cloud_noise, local_threshold, mask_fill_fraction, CloudNoise};
pub use relight::{enhance_cloud_contrast, relight_clouds, terminator_opacity, RelightParams};
pub use texture::compose_cloud_texture;
pub use wind::{apply_wind, wind_direction};

use std::sync::Arc;

use image::{DynamicImage, GrayImage, RgbaImage};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub(crate) use config::{clamp_param, wrap_angle};
use crate::error::{check_canvas, GenerationError};
use crate::export::DebugDump;
use crate::logging::{timed_step, StepLogger, TracingLogger};
use crate::noise::{FastNoiseGenerator, NoiseSource};
use crate::palette::{ColorPalette, StaticPalette};
use crate::raster::{apply_spherical_distortion, composite_centered, ensure_rgba};

/// Planet type assumed until [`Clouds::with_planet_type`] is called.
pub const DEFAULT_PLANET_TYPE: &str = "Desert";

/// Fixed curvature applied to every cloud sprite.
pub const SPHERICAL_DISTORTION: f32 = 0.15;

/// Everything one generation pass produces.
struct CloudLayers {
    noise: CloudNoise,
    mask: GrayImage,
    texture: RgbaImage,
}

/// One cloud layer for one planet.
pub struct Clouds {
    config: CloudConfig,
    wind_effect: f32,
    planet_type: String,
    rng: ChaCha8Rng,
    noise: Box<dyn NoiseSource>,
    palette: Box<dyn ColorPalette>,
    logger: Arc<dyn StepLogger>,
    debug_dump: Option<DebugDump>,
    cloud_mask: Option<GrayImage>,
    cloud_texture: Option<RgbaImage>,
}

impl Clouds {
    /// Creates a layer with default lighting and detail.
    pub fn new(seed: u64, coverage: f32, size: u32) -> Self {
        Self::from_config(CloudConfig {
            seed,
            coverage,
            size,
            ..Default::default()
        })
    }

    /// Creates a layer from `config`, clamping it first.
    ///
    /// When the config has no wind effect, one is drawn from the layer's
    /// seeded generator.
    pub fn from_config(config: CloudConfig) -> Self {
        let config = config.clamped();
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let wind_effect = match config.wind_effect {
            Some(w) => w,
            None => rng.random::<f32>(),
        };

        Self {
            noise: Box::new(FastNoiseGenerator::new(config.seed)),
            palette: Box::new(StaticPalette::new(config.seed)),
            config,
            wind_effect,
            planet_type: DEFAULT_PLANET_TYPE.to_string(),
            rng,
            logger: Arc::new(TracingLogger),
            debug_dump: None,
            cloud_mask: None,
            cloud_texture: None,
        }
    }

    pub fn with_noise(mut self, noise: Box<dyn NoiseSource>) -> Self {
        self.noise = noise;
        self.invalidate();
        self
    }

    pub fn with_palette(mut self, palette: Box<dyn ColorPalette>) -> Self {
        self.palette = palette;
        self.invalidate();
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn StepLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Planet type used for the cloud color and debug paths.
    pub fn with_planet_type(mut self, planet_type: impl Into<String>) -> Self {
        self.planet_type = planet_type.into();
        self.invalidate();
        self
    }

    pub fn with_debug_dump(mut self, dump: DebugDump) -> Self {
        self.debug_dump = Some(dump);
        self
    }

    fn invalidate(&mut self) {
        self.cloud_mask = None;
        self.cloud_texture = None;
    }

    pub fn seed(&self) -> u64 {
        self.config.seed
    }

    pub fn size(&self) -> u32 {
        self.config.size
    }

    pub fn enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn coverage(&self) -> f32 {
        self.config.coverage
    }

    pub fn detail_level(&self) -> f32 {
        self.config.detail_level
    }

    pub fn wind_effect(&self) -> f32 {
        self.wind_effect
    }

    pub fn light_angle(&self) -> f32 {
        self.config.light_angle
    }

    pub fn ambient_light(&self) -> f32 {
        self.config.ambient_light
    }

    pub fn diffuse_light(&self) -> f32 {
        self.config.diffuse_light
    }

    pub fn specular_light(&self) -> f32 {
        self.config.specular_light
    }

    /// The effective configuration, with the resolved wind effect.
    pub fn config(&self) -> CloudConfig {
        CloudConfig {
            wind_effect: Some(self.wind_effect),
            ..self.config.clone()
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.config.enabled = enabled;
    }

    pub fn set_coverage(&mut self, coverage: f32) {
        self.config.coverage = clamp_param(coverage, 0.0, 1.0);
        self.invalidate();
    }

    pub fn set_wind_effect(&mut self, wind_effect: f32) {
        self.wind_effect = clamp_param(wind_effect, 0.0, 1.0);
        self.invalidate();
    }

    pub fn set_detail_level(&mut self, detail_level: f32) {
        self.config.detail_level = clamp_param(detail_level, 0.0, MAX_DETAIL_LEVEL);
        self.invalidate();
    }

    pub fn set_light_angle(&mut self, angle: f32) {
        self.config.light_angle = wrap_angle(angle);
        self.invalidate();
    }

    /// Replaces (or clears) the debug dump target.
    pub fn set_debug_dump(&mut self, dump: Option<DebugDump>) {
        self.debug_dump = dump;
    }

    pub fn set_lighting(&mut self, ambient: f32, diffuse: f32, specular: f32) {
        self.config.ambient_light = clamp_param(ambient, 0.0, 1.0);
        self.config.diffuse_light = clamp_param(diffuse, 0.0, 1.0);
        self.config.specular_light = clamp_param(specular, 0.0, 1.0);
        self.invalidate();
    }

    /// Last generated mask, if any.
    pub fn cloud_mask(&self) -> Option<&GrayImage> {
        self.cloud_mask.as_ref()
    }

    /// Last generated texture, if any.
    pub fn cloud_texture(&self) -> Option<&RgbaImage> {
        self.cloud_texture.as_ref()
    }

    fn relight_params(&self) -> RelightParams {
        RelightParams {
            light_angle: self.config.light_angle,
            ambient: self.config.ambient_light,
            diffuse: self.config.diffuse_light,
            specular: self.config.specular_light,
        }
    }

    fn build_noise(&self) -> Result<CloudNoise, GenerationError> {
        check_canvas(self.config.size)?;
        // Each pass replays the layer's generator from the same state.
        let mut rng = self.rng.clone();
        Ok(build_cloud_noise(
            self.noise.as_ref(),
            self.config.size,
            self.config.detail_level,
            &mut rng,
        ))
    }

    fn render(&self) -> Result<CloudLayers, GenerationError> {
        let noise = self.build_noise()?;
        let mask = build_cloud_mask(&noise, self.config.coverage);

        let color = self.palette.get_cloud_color(&self.planet_type);
        let flat = compose_cloud_texture(&mask, color);
        let lit = relight_clouds(&flat, &self.relight_params());

        let drifted = apply_wind(&lit, self.noise.as_ref(), self.wind_effect, self.config.light_angle);
        self.logger.debug(&format!(
            "Applying spherical distortion to cloud texture (strength: {:.2})",
            SPHERICAL_DISTORTION
        ));
        let texture = apply_spherical_distortion(&drifted, SPHERICAL_DISTORTION);

        Ok(CloudLayers { noise, mask, texture })
    }

    fn dump(&self, layers: &CloudLayers) -> Result<(), GenerationError> {
        let Some(dump) = &self.debug_dump else {
            return Ok(());
        };
        dump.write_clouds(self.config.seed, &layers.mask, &layers.texture)?;
        dump.write_field(self.config.seed, "cloud_noise", &layers.noise.combined)?;
        self.logger.debug(&format!(
            "Saved cloud textures for {} planet with seed {:08}",
            self.planet_type.to_ascii_lowercase(),
            self.config.seed
        ));
        Ok(())
    }

    fn describe(&self, mask: &GrayImage) -> String {
        format!(
            "Coverage: {:.2}, Density: {:.2}, Detail: {:.2}, Lighting: ambient={:.2}, diffuse={:.2}, \
             Spherical distortion: {:.0}%",
            self.config.coverage,
            mask_fill_fraction(mask),
            self.config.detail_level,
            self.config.ambient_light,
            self.config.diffuse_light,
            SPHERICAL_DISTORTION * 100.0
        )
    }

    /// Builds only the opacity mask, caching it.
    pub fn generate_cloud_mask(&mut self) -> Result<&GrayImage, GenerationError> {
        let noise = self.build_noise()?;
        let mask = build_cloud_mask(&noise, self.config.coverage);
        Ok(self.cloud_mask.insert(mask))
    }

    /// Runs the full cloud pipeline and caches the result.
    ///
    /// Failures are logged with the elapsed time and returned unchanged.
    pub fn generate_cloud_texture(&mut self) -> Result<&RgbaImage, GenerationError> {
        let logger = Arc::clone(&self.logger);
        let layers = timed_step(
            logger.as_ref(),
            "generate_cloud_texture",
            || {
                let layers = self.render()?;
                self.dump(&layers)?;
                Ok::<_, GenerationError>(layers)
            },
            |layers| self.describe(&layers.mask),
        )?;

        self.cloud_mask = Some(layers.mask);
        Ok(self.cloud_texture.insert(layers.texture))
    }

    /// Composites the cloud layer centered on `planet`.
    ///
    /// Disabled layers return the planet converted to RGBA. The texture is
    /// generated on first use and reused afterwards.
    pub fn apply_to_planet(&mut self, planet: &DynamicImage) -> Result<RgbaImage, GenerationError> {
        let mut result = ensure_rgba(planet);
        if !self.config.enabled {
            return Ok(result);
        }

        if self.cloud_texture.is_none() {
            self.generate_cloud_texture()?;
        }
        if let Some(texture) = &self.cloud_texture {
            composite_centered(&mut result, texture);
        }
        Ok(result)
    }
}
