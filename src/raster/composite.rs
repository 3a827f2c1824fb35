//! Alpha compositing helpers and a shaded placeholder planet.

use glam::Vec3;
use image::{imageops, DynamicImage, Rgba, RgbaImage};

use super::disc::Disc;
use crate::lighting::LightDirection;

/// Converts any decoded image into 8-bit RGBA.
pub fn ensure_rgba(image: &DynamicImage) -> RgbaImage {
    match image {
        DynamicImage::ImageRgba8(rgba) => rgba.clone(),
        other => other.to_rgba8(),
    }
}

/// Offset that centers an `inner`-sized square on an `outer`-sized one.
///
/// Negative when the inner raster is larger; compositing then clips.
#[inline]
pub fn center_offset(outer: u32, inner: u32) -> i64 {
    (outer as i64 - inner as i64) / 2
}

/// Source-over composites `overlay` centered on `base`.
pub fn composite_centered(base: &mut RgbaImage, overlay: &RgbaImage) {
    let dx = center_offset(base.width(), overlay.width());
    let dy = center_offset(base.height(), overlay.height());
    imageops::overlay(base, overlay, dx, dy);
}

/// Lambert-shaded disc of `color`, used when no base planet raster is supplied.
pub fn shaded_planet(size: u32, color: [u8; 3], light_angle: f32) -> RgbaImage {
    let disc = Disc::for_canvas(size);
    let light = LightDirection::from_angle(light_angle).vector();

    RgbaImage::from_fn(size, size, |x, y| {
        let offset = disc.offset(x, y);
        let dist = offset.length();
        let coverage = (disc.radius - dist + 0.5).clamp(0.0, 1.0);
        if coverage <= 0.0 {
            return Rgba([0, 0, 0, 0]);
        }

        let n2 = offset / disc.radius;
        let z = (1.0 - n2.length_squared()).max(0.0).sqrt();
        let normal = Vec3::new(n2.x, n2.y, z);
        let shade = 0.25 + 0.75 * normal.dot(light).max(0.0);

        let channel = |c: u8| (c as f32 * shade).round().clamp(0.0, 255.0) as u8;
        Rgba([
            channel(color[0]),
            channel(color[1]),
            channel(color[2]),
            (coverage * 255.0).round() as u8,
        ])
    })
}
