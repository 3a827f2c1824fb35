//! Render configuration loaded from JSON.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::atmosphere::{Atmosphere, AtmosphereConfig};
use crate::clouds::{CloudConfig, Clouds, DEFAULT_CANVAS_SIZE};
use crate::export::DebugDump;
use crate::pipeline::{AtmosphereStage, CloudStage, Pipeline, PipelineError, RenderContext};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Everything needed to decorate one planet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub planet_type: String,
    /// Shared by both layers; nested seeds are overwritten by this one.
    pub seed: u64,
    /// Planet raster side in pixels. The cloud sprite uses the same size.
    pub size: u32,
    pub has_rings: bool,
    pub clouds: CloudConfig,
    pub atmosphere: AtmosphereConfig,
    /// Where intermediate cloud rasters are written, if anywhere.
    pub debug_dir: Option<PathBuf>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            planet_type: "Desert".to_string(),
            seed: 42,
            size: DEFAULT_CANVAS_SIZE,
            has_rings: false,
            clouds: CloudConfig::default(),
            atmosphere: AtmosphereConfig::default(),
            debug_dir: None,
        }
    }
}

impl RenderConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: RenderConfig = serde_json::from_str(json)?;
        Ok(config.normalized())
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Clamps every layer and propagates the shared seed and size.
    pub fn normalized(&self) -> Self {
        let mut clouds = self.clouds.clamped();
        clouds.seed = self.seed;
        clouds.size = self.size;
        let mut atmosphere = self.atmosphere.clamped();
        atmosphere.seed = self.seed;

        Self {
            clouds,
            atmosphere,
            ..self.clone()
        }
    }

    /// Same settings for another seed.
    pub fn with_seed(&self, seed: u64) -> Self {
        Self {
            seed,
            ..self.clone()
        }
        .normalized()
    }

    pub fn context(&self) -> RenderContext {
        RenderContext::new(self.planet_type.clone()).with_rings(self.has_rings)
    }

    /// Atmosphere first, then clouds, skipping disabled layers.
    pub fn build_pipeline(&self) -> Result<Pipeline, PipelineError> {
        let config = self.normalized();
        let mut pipeline = Pipeline::new();

        if config.atmosphere.enabled {
            pipeline.add_stage(AtmosphereStage {
                atmosphere: Atmosphere::from_config(config.atmosphere.clone()),
            })?;
        }
        if config.clouds.enabled {
            let mut clouds = Clouds::from_config(config.clouds.clone()).with_planet_type(config.planet_type.clone());
            if let Some(dir) = &config.debug_dir {
                clouds = clouds.with_debug_dump(DebugDump::new(dir, config.planet_type.clone()));
            }
            pipeline.add_stage(CloudStage { clouds })?;
        }
        Ok(pipeline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::StageId;
    use tempfile::tempdir;

    #[test]
    fn test_from_json_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("render.json");
        fs::write(
            &path,
            r#"{
                "planet_type": "Ocean",
                "seed": 17,
                "size": 256,
                "clouds": {"coverage": 1.7, "seed": 3},
                "atmosphere": {"halo_thickness": 99}
            }"#,
        )
        .unwrap();

        let config = RenderConfig::from_json_file(&path).unwrap();
        assert_eq!(config.planet_type, "Ocean");
        assert_eq!(config.clouds.coverage, 1.0);
        assert_eq!(config.clouds.seed, 17);
        assert_eq!(config.clouds.size, 256);
        assert_eq!(config.atmosphere.halo_thickness, 10);
        assert_eq!(config.atmosphere.seed, 17);
        assert!(!config.has_rings);
    }

    #[test]
    fn test_errors() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            RenderConfig::from_json_file(&dir.path().join("missing.json")),
            Err(ConfigError::Io(_))
        ));
        assert!(matches!(RenderConfig::from_json_str("{ nope"), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_build_pipeline_respects_enabled() {
        let mut config = RenderConfig::default();
        assert_eq!(
            config.build_pipeline().unwrap().stage_ids(),
            vec![StageId::Atmosphere, StageId::Clouds]
        );

        config.clouds.enabled = false;
        assert_eq!(config.build_pipeline().unwrap().stage_ids(), vec![StageId::Atmosphere]);

        config.atmosphere.enabled = false;
        assert_eq!(config.build_pipeline().unwrap().stage_count(), 0);
    }

    #[test]
    fn test_with_seed_propagates() {
        let config = RenderConfig::default().with_seed(99);
        assert_eq!(config.seed, 99);
        assert_eq!(config.clouds.seed, 99);
        assert_eq!(config.atmosphere.seed, 99);
    }
}
