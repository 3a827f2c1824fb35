//! Lossless PNG writers for masks, fields and RGBA layers.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{GrayImage, ImageBuffer, ImageEncoder, Luma, RgbaImage};
use thiserror::Error;

use crate::noise::NoiseField;

/// Errors that can occur while writing PNG files.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Invalid value range: min ({0}) >= max ({1})")]
    InvalidRange(f32, f32),
}

/// Encoder settings shared by every writer.
#[derive(Debug, Clone, Copy)]
pub struct PngOptions {
    pub compression: CompressionType,
    pub filter: FilterType,
}

impl Default for PngOptions {
    fn default() -> Self {
        Self {
            compression: CompressionType::Default,
            filter: FilterType::Adaptive,
        }
    }
}

fn encoder_for(path: &Path, options: &PngOptions) -> Result<PngEncoder<BufWriter<File>>, ExportError> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    Ok(PngEncoder::new_with_quality(writer, options.compression, options.filter))
}

/// Writes an 8-bit single-channel mask.
pub fn export_mask_png(mask: &GrayImage, path: &Path, options: &PngOptions) -> Result<(), ExportError> {
    encoder_for(path, options)?.write_image(
        mask.as_raw(),
        mask.width(),
        mask.height(),
        image::ExtendedColorType::L8,
    )?;
    Ok(())
}

/// Writes an 8-bit RGBA raster.
pub fn export_rgba_png(image: &RgbaImage, path: &Path, options: &PngOptions) -> Result<(), ExportError> {
    encoder_for(path, options)?.write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        image::ExtendedColorType::Rgba8,
    )?;
    Ok(())
}

/// Writes a scalar field as 16-bit grayscale, mapping `[min, max]` onto the full range.
pub fn export_field_png(
    field: &NoiseField,
    path: &Path,
    min_value: f32,
    max_value: f32,
    options: &PngOptions,
) -> Result<(), ExportError> {
    if min_value >= max_value {
        return Err(ExportError::InvalidRange(min_value, max_value));
    }

    let range = max_value - min_value;
    let img: ImageBuffer<Luma<u16>, Vec<u16>> =
        ImageBuffer::from_fn(field.width(), field.height(), |x, y| {
            let normalized = ((field.get(x, y) - min_value) / range).clamp(0.0, 1.0);
            Luma([(normalized * 65535.0) as u16])
        });

    let byte_slice: &[u8] = bytemuck::cast_slice(img.as_raw());
    encoder_for(path, options)?.write_image(
        byte_slice,
        field.width(),
        field.height(),
        image::ExtendedColorType::L16,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use tempfile::tempdir;

    #[test]
    fn test_mask_round_trips_through_decoder() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mask.png");
        let mask = GrayImage::from_fn(8, 8, |x, _| Luma([(x * 30) as u8]));
        export_mask_png(&mask, &path, &PngOptions::default()).unwrap();

        let decoded = image::open(&path).unwrap().to_luma8();
        assert_eq!(decoded, mask);
    }

    #[test]
    fn test_rgba_export_creates_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("layer.png");
        let img = RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 4]));
        export_rgba_png(&img, &path, &PngOptions::default()).unwrap();
        assert!(path.exists());
        assert_eq!(image::open(&path).unwrap().to_rgba8(), img);
    }

    #[test]
    fn test_field_export_rejects_empty_range() {
        let dir = tempdir().unwrap();
        let field = NoiseField::square(4, |u, v| u + v);
        let err = export_field_png(&field, &dir.path().join("f.png"), 1.0, 1.0, &PngOptions::default());
        assert!(matches!(err, Err(ExportError::InvalidRange(_, _))));
    }

    #[test]
    fn test_missing_directory_is_io_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("mask.png");
        let err = export_mask_png(&GrayImage::new(2, 2), &path, &PngOptions::default());
        assert!(matches!(err, Err(ExportError::Io(_))));
    }
}
