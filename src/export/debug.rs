//! Debug dumps of intermediate cloud layers.

use std::path::{Path, PathBuf};

use image::{GrayImage, RgbaImage};
use serde::{Deserialize, Serialize};

use super::png::{export_field_png, export_mask_png, export_rgba_png, ExportError, PngOptions};
use crate::noise::NoiseField;

/// Writes intermediate rasters under `<root>/<planet_type>/<seed:08>/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugDump {
    pub root: PathBuf,
    pub planet_type: String,
}

impl DebugDump {
    pub fn new(root: impl Into<PathBuf>, planet_type: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            planet_type: planet_type.into(),
        }
    }

    /// Directory holding the dumps for `seed`.
    pub fn seed_dir(&self, seed: u64) -> PathBuf {
        self.root
            .join(self.planet_type.to_ascii_lowercase())
            .join(format!("{:08}", seed))
    }

    /// Path of a named texture for `seed`, e.g. `cloud_mask`.
    pub fn texture_path(&self, seed: u64, name: &str) -> PathBuf {
        self.seed_dir(seed).join(format!("{}.png", name))
    }

    fn prepare(&self, seed: u64) -> Result<PathBuf, ExportError> {
        let dir = self.seed_dir(seed);
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Writes `cloud_mask.png` and `cloud_texture.png`, returning their paths.
    pub fn write_clouds(
        &self,
        seed: u64,
        mask: &GrayImage,
        texture: &RgbaImage,
    ) -> Result<(PathBuf, PathBuf), ExportError> {
        self.prepare(seed)?;
        let options = PngOptions::default();
        let mask_path = self.texture_path(seed, "cloud_mask");
        let texture_path = self.texture_path(seed, "cloud_texture");
        export_mask_png(mask, &mask_path, &options)?;
        export_rgba_png(texture, &texture_path, &options)?;
        Ok((mask_path, texture_path))
    }

    /// Writes a `[0, 1]` scalar field as `<name>.png` (16-bit).
    pub fn write_field(&self, seed: u64, name: &str, field: &NoiseField) -> Result<PathBuf, ExportError> {
        self.prepare(seed)?;
        let path = self.texture_path(seed, name);
        export_field_png(field, &path, 0.0, 1.0, &PngOptions::default())?;
        Ok(path)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgba};
    use tempfile::tempdir;

    #[test]
    fn test_layout_keyed_by_seed() {
        let dump = DebugDump::new("/tmp/out", "Desert");
        assert_eq!(
            dump.texture_path(42, "cloud_mask"),
            PathBuf::from("/tmp/out/desert/00000042/cloud_mask.png")
        );
    }

    #[test]
    fn test_write_clouds() {
        let dir = tempdir().unwrap();
        let dump = DebugDump::new(dir.path(), "ocean");
        let mask = GrayImage::from_pixel(8, 8, Luma([128]));
        let texture = RgbaImage::from_pixel(8, 8, Rgba([255, 255, 255, 128]));

        let (mask_path, texture_path) = dump.write_clouds(12345, &mask, &texture).unwrap();
        assert!(mask_path.ends_with("ocean/00012345/cloud_mask.png"));
        assert!(mask_path.exists());
        assert!(texture_path.exists());
    }

    #[test]
    fn test_write_field() {
        let dir = tempdir().unwrap();
        let dump = DebugDump::new(dir.path(), "ice");
        let field = NoiseField::square(8, |u, _| u);
        let path = dump.write_field(3, "cloud_noise", &field).unwrap();
        assert!(path.exists());
        assert_eq!(dump.root(), dir.path());
    }

    #[test]
    fn test_root_is_a_file_fails() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"x").unwrap();
        let dump = DebugDump::new(&blocker, "rocky");
        let err = dump.write_clouds(1, &GrayImage::new(2, 2), &RgbaImage::new(2, 2));
        assert!(matches!(err, Err(ExportError::Io(_))));
    }
}
