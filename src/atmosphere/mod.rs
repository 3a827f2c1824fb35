//! Atmospheric glow and halo around a planet disc.

mod config;
mod glow;
mod halo;
mod legacy;

pub use config::{AtmosphereConfig, MAX_HALO_THICKNESS, MIN_HALO_THICKNESS};
pub use glow::{build_glow, glow_color, glow_geometry, GlowGeometry};
pub use halo::{apply_halo, diffuse_tint, enhance_halo_color, Dominance, SUPERSAMPLE};
pub use legacy::{apply_legacy_atmosphere, legacy_config};

use std::sync::Arc;

use image::{DynamicImage, Rgb, Rgba, RgbaImage};

use crate::clouds::clamp_param;
use crate::error::{check_canvas, GenerationError};
use crate::logging::{timed_step, StepLogger, TracingLogger};
use crate::palette::{ColorPalette, StaticPalette};
use crate::raster::ensure_rgba;

/// Alpha of a tint derived from [`PlanetColors`].
pub const PLANET_TINT_ALPHA: u8 = 75;

/// Surface colours of an already rendered planet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanetColors {
    pub base: Rgb<u8>,
    pub highlight: Rgb<u8>,
}

impl PlanetColors {
    pub fn new(base: [u8; 3], highlight: [u8; 3]) -> Self {
        Self {
            base: Rgb(base),
            highlight: Rgb(highlight),
        }
    }

    /// 30% base and 70% highlight, truncated, at [`PLANET_TINT_ALPHA`].
    pub fn atmosphere_color(&self) -> Rgba<u8> {
        let mix = |c: usize| ((self.base[c] as u32 * 3 + self.highlight[c] as u32 * 7) / 10) as u8;
        Rgba([mix(0), mix(1), mix(2), PLANET_TINT_ALPHA])
    }
}

/// Glow and halo generator for one planet.
pub struct Atmosphere {
    config: AtmosphereConfig,
    planet_colors: Option<PlanetColors>,
    palette: Box<dyn ColorPalette>,
    logger: Arc<dyn StepLogger>,
    last_color: Option<Rgba<u8>>,
    last_geometry: Option<GlowGeometry>,
}

struct Rendered {
    image: RgbaImage,
    color: Rgba<u8>,
    geometry: GlowGeometry,
}

impl Atmosphere {
    pub fn new(seed: u64, glow_intensity: f32, halo_intensity: f32) -> Self {
        Self::from_config(AtmosphereConfig {
            seed,
            glow_intensity,
            halo_intensity,
            ..Default::default()
        })
    }

    pub fn from_config(config: AtmosphereConfig) -> Self {
        let config = config.clamped();
        Self {
            palette: Box::new(StaticPalette::new(config.seed)),
            config,
            planet_colors: None,
            logger: Arc::new(TracingLogger),
            last_color: None,
            last_geometry: None,
        }
    }

    pub fn with_palette(mut self, palette: Box<dyn ColorPalette>) -> Self {
        self.palette = palette;
        self
    }

    /// Derives the atmosphere colour from the planet instead of the palette.
    pub fn with_planet_colors(mut self, colors: PlanetColors) -> Self {
        self.planet_colors = Some(colors);
        self
    }

    pub fn set_planet_colors(&mut self, colors: Option<PlanetColors>) {
        self.planet_colors = colors;
    }

    pub fn with_logger(mut self, logger: Arc<dyn StepLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn config(&self) -> &AtmosphereConfig {
        &self.config
    }

    pub fn enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.config.enabled = enabled;
        self.last_color = None;
    }

    pub fn set_glow_intensity(&mut self, v: f32) {
        self.config.glow_intensity = clamp_param(v, 0.0, 1.0);
    }

    pub fn set_halo_intensity(&mut self, v: f32) {
        self.config.halo_intensity = clamp_param(v, 0.0, 1.0);
    }

    pub fn set_halo_thickness(&mut self, px: u32) {
        self.config.halo_thickness = px.clamp(MIN_HALO_THICKNESS, MAX_HALO_THICKNESS);
    }

    pub fn set_blur_amount(&mut self, v: f32) {
        self.config.blur_amount = clamp_param(v, 0.0, 1.0);
    }

    /// Atmosphere color resolved by the last successful call.
    pub fn last_color(&self) -> Option<Rgba<u8>> {
        self.last_color
    }

    /// Glow sizes used by the last successful call.
    pub fn last_geometry(&self) -> Option<GlowGeometry> {
        self.last_geometry
    }

    fn render(
        &self,
        planet: &DynamicImage,
        planet_type: &str,
        has_rings: bool,
        color: Option<Rgba<u8>>,
    ) -> Result<Rendered, GenerationError> {
        let color = match (color, self.planet_colors) {
            (Some(c), _) => c,
            (None, Some(colors)) => colors.atmosphere_color(),
            (None, None) => self.palette.get_atmosphere_color(planet_type)?,
        };
        check_canvas(planet.width().min(planet.height()))?;

        let planet = ensure_rgba(planet);
        let size = planet.width();
        let geometry = glow_geometry(size, &self.config, has_rings);
        let tinted = glow_color(color, self.config.glow_intensity);
        let mut image = build_glow(&planet, tinted, &geometry);

        if self.config.halo_intensity > 0.0 {
            apply_halo(&mut image, tinted, size as f32 * 0.5, &self.config, self.logger.as_ref());
        }

        Ok(Rendered { image, color, geometry })
    }

    /// Wraps `planet` in glow and halo on an enlarged canvas.
    ///
    /// An explicit color wins, then the planet colors, then the palette. When the
    /// layer is disabled or both intensities are zero the planet is only
    /// converted to RGBA. Errors are logged and returned unchanged.
    pub fn apply_to_planet(
        &mut self,
        planet: &DynamicImage,
        planet_type: &str,
        has_rings: bool,
        color: Option<Rgba<u8>>,
    ) -> Result<RgbaImage, GenerationError> {
        if self.config.is_noop() {
            return Ok(ensure_rgba(planet));
        }

        let logger = Arc::clone(&self.logger);
        let config = self.config.clone();
        let rendered = timed_step(
            logger.as_ref(),
            "apply_atmosphere",
            || self.render(planet, planet_type, has_rings, color),
            |r| {
                format!(
                    "Padding: {:.1}%, Glow: {:.2}, Halo: {:.2}, Thickness: {}px, Blur: {:.1}px",
                    r.geometry.padding_pct,
                    config.glow_intensity,
                    config.halo_intensity,
                    config.halo_thickness,
                    r.geometry.blur_sigma
                )
            },
        )?;

        self.last_color = Some(rendered.color);
        self.last_geometry = Some(rendered.geometry);
        Ok(rendered.image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::MemoryLogger;
    use crate::raster::shaded_planet;

    fn planet(size: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(shaded_planet(size, [180, 120, 80], 45.0))
    }

    /// Distance from the canvas center to the outermost pixel on the
    /// center row whose alpha exceeds `threshold`.
    fn reach(image: &RgbaImage, threshold: u8) -> f32 {
        let c = image.width() / 2;
        let half = image.width() as f32 * 0.5;
        (0..image.width())
            .filter(|&x| image.get_pixel(x, c)[3] > threshold)
            .map(|x| (x as f32 + 0.5 - half).abs())
            .fold(0.0, f32::max)
    }

    #[test]
    fn test_zero_intensities_return_planet() {
        let rgb = DynamicImage::ImageRgb8(image::RgbImage::from_pixel(64, 64, image::Rgb([10, 20, 30])));
        let mut atmosphere = Atmosphere::new(1, 0.0, 0.0);
        let out = atmosphere.apply_to_planet(&rgb, "desert", false, None).unwrap();
        assert_eq!(out, rgb.to_rgba8());
        assert!(atmosphere.last_geometry().is_none());
    }

    #[test]
    fn test_rings_push_glow_further_out() {
        let p = planet(128);
        let plain = Atmosphere::new(5, 0.5, 0.5).apply_to_planet(&p, "ocean", false, None).unwrap();
        let ringed = Atmosphere::new(5, 0.5, 0.5).apply_to_planet(&p, "ocean", true, None).unwrap();
        let r_plain = reach(&plain, 2);
        let r_ringed = reach(&ringed, 2);
        assert!(r_plain > 64.0);
        assert!(r_ringed > r_plain + 1.0, "plain {} ringed {}", r_plain, r_ringed);
    }

    #[test]
    fn test_output_is_enlarged_and_centered() {
        let p = planet(64);
        let mut atmosphere = Atmosphere::new(2, 0.8, 0.6);
        let out = atmosphere.apply_to_planet(&p, "ice", false, None).unwrap();
        let geom = atmosphere.last_geometry().unwrap();
        assert_eq!(out.dimensions(), (geom.canvas_size, geom.canvas_size));
        assert_eq!(geom.canvas_size, 64 + 2 * geom.margin_px);
        let m = geom.margin_px;
        assert_eq!(out.get_pixel(m + 32, m + 32), p.to_rgba8().get_pixel(32, 32));
        assert_eq!(out.get_pixel(0, 0)[3], 0);
    }

    #[test]
    fn test_explicit_color_resolution_is_idempotent() {
        let p = planet(64);
        let color = Rgba([120, 200, 255, 60]);
        let mut atmosphere = Atmosphere::new(3, 0.5, 0.5);
        let first = atmosphere.apply_to_planet(&p, "anything", false, Some(color)).unwrap();
        let g1 = atmosphere.last_geometry();
        let second = atmosphere.apply_to_planet(&p, "anything", false, Some(color)).unwrap();
        assert_eq!(g1, atmosphere.last_geometry());
        assert_eq!(first, second);
        assert_eq!(atmosphere.last_color(), Some(color));
    }

    #[test]
    fn test_palette_color_cached() {
        let p = planet(64);
        let mut atmosphere = Atmosphere::new(9, 0.5, 0.0);
        atmosphere.apply_to_planet(&p, "Jovian", false, None).unwrap();
        let expected = StaticPalette::new(9).get_atmosphere_color("jovian").unwrap();
        assert_eq!(atmosphere.last_color(), Some(expected));
    }

    #[test]
    fn test_unknown_type_is_logged_and_propagated() {
        let logger = Arc::new(MemoryLogger::new());
        let mut atmosphere = Atmosphere::new(1, 0.5, 0.5).with_logger(logger.clone());
        let result = atmosphere.apply_to_planet(&planet(64), "cheese", false, None);
        assert!(matches!(result, Err(GenerationError::Palette(_))));
        let steps = logger.steps();
        assert_eq!(steps[0].operation, "apply_atmosphere");
        assert!(steps[0].detail.starts_with("Error: "));
        assert!(atmosphere.last_color().is_none());
    }

    #[test]
    fn test_step_detail_format() {
        let logger = Arc::new(MemoryLogger::new());
        let mut atmosphere = Atmosphere::new(1, 0.5, 0.5).with_logger(logger.clone());
        atmosphere.apply_to_planet(&planet(64), "rocky", false, None).unwrap();
        assert_eq!(
            logger.steps()[0].detail,
            "Padding: 12.5%, Glow: 0.50, Halo: 0.50, Thickness: 3px, Blur: 4.5px"
        );
    }

    #[test]
    fn test_planet_colors_blend() {
        let colors = PlanetColors::new([100, 50, 0], [200, 150, 250]);
        assert_eq!(colors.atmosphere_color(), Rgba([170, 120, 175, 75]));
        assert_eq!(PlanetColors::new([1, 1, 1], [2, 2, 2]).atmosphere_color(), Rgba([1, 1, 1, 75]));

        // No palette lookup happens, so an unknown type is fine.
        let mut atmosphere = Atmosphere::new(4, 0.5, 0.5).with_planet_colors(colors);
        atmosphere.apply_to_planet(&planet(64), "cheese", false, None).unwrap();
        assert_eq!(atmosphere.last_color(), Some(Rgba([170, 120, 175, 75])));

        let explicit = Rgba([10, 20, 30, 40]);
        atmosphere.apply_to_planet(&planet(64), "cheese", false, Some(explicit)).unwrap();
        assert_eq!(atmosphere.last_color(), Some(explicit));

        atmosphere.set_planet_colors(None);
        assert!(atmosphere.apply_to_planet(&planet(64), "cheese", false, None).is_err());
    }

    #[test]
    fn test_zero_halo_leaves_glow_untouched() {
        let p = planet(64);
        let color = Rgba([90, 160, 240, 90]);
        let logger = Arc::new(MemoryLogger::new());
        let mut atmosphere = Atmosphere::new(9, 0.5, 0.0).with_logger(logger.clone());
        let out = atmosphere.apply_to_planet(&p, "ocean", false, Some(color)).unwrap();

        let config = atmosphere.config().clone();
        let geometry = glow_geometry(64, &config, false);
        let expected = build_glow(&p.to_rgba8(), glow_color(color, config.glow_intensity), &geometry);
        assert_eq!(out, expected);
        // Glow is present just outside the planet edge.
        assert!(out.get_pixel(geometry.margin_px - 3, geometry.canvas_size / 2)[3] > 0);
        assert!(logger.messages().iter().all(|m| !m.contains("halo")));
    }

    #[test]
    fn test_setters_clamp() {
        let mut atmosphere = Atmosphere::new(1, 2.0, -1.0);
        assert_eq!(atmosphere.config().glow_intensity, 1.0);
        assert_eq!(atmosphere.config().halo_intensity, 0.0);
        atmosphere.set_halo_thickness(0);
        atmosphere.set_blur_amount(5.0);
        atmosphere.set_glow_intensity(-3.0);
        atmosphere.set_halo_intensity(0.4);
        assert_eq!(atmosphere.config().halo_thickness, 1);
        assert_eq!(atmosphere.config().blur_amount, 1.0);
        assert_eq!(atmosphere.config().glow_intensity, 0.0);
        assert_eq!(atmosphere.config().halo_intensity, 0.4);
    }

    #[test]
    fn test_disabled_passthrough() {
        let p = planet(32);
        let mut atmosphere = Atmosphere::new(1, 0.9, 0.9);
        atmosphere.set_enabled(false);
        assert_eq!(atmosphere.apply_to_planet(&p, "cheese", true, None).unwrap(), p.to_rgba8());
    }
}
