//! Spherical-projection remap for flat disc textures.

use image::{Rgba, RgbaImage};
use std::f32::consts::FRAC_2_PI;

use super::disc::Disc;

/// Bilinearly samples `image` at continuous pixel-center coordinates.
///
/// Color channels are alpha-weighted. Sample positions outside the raster
/// clamp to the nearest edge pixel.
pub fn sample_bilinear(image: &RgbaImage, fx: f32, fy: f32) -> Rgba<u8> {
    let max_x = image.width() as f32 - 1.0;
    let max_y = image.height() as f32 - 1.0;
    let px = (fx - 0.5).clamp(0.0, max_x);
    let py = (fy - 0.5).clamp(0.0, max_y);

    let x0 = px.floor() as u32;
    let y0 = py.floor() as u32;
    let x1 = (x0 + 1).min(image.width() - 1);
    let y1 = (y0 + 1).min(image.height() - 1);
    let tx = px - x0 as f32;
    let ty = py - y0 as f32;

    let corners = [
        (image.get_pixel(x0, y0).0, (1.0 - tx) * (1.0 - ty)),
        (image.get_pixel(x1, y0).0, tx * (1.0 - ty)),
        (image.get_pixel(x0, y1).0, (1.0 - tx) * ty),
        (image.get_pixel(x1, y1).0, tx * ty),
    ];

    // Color is weighted by alpha so transparent neighbors do not darken edges.
    let alpha: f32 = corners.iter().map(|(p, w)| p[3] as f32 * w).sum();
    if alpha <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }
    let mut out = [0u8; 4];
    for c in 0..3 {
        let v: f32 = corners.iter().map(|(p, w)| p[c] as f32 * p[3] as f32 * w).sum();
        out[c] = (v / alpha).round().clamp(0.0, 255.0) as u8;
    }
    out[3] = alpha.round().clamp(0.0, 255.0) as u8;
    Rgba(out)
}

/// Source radius for a destination radius `r` in `[0, 1]`.
///
/// Blends the identity with the orthographic-sphere mapping `asin(r) * 2 / pi`.
/// Both terms fix `r = 0` and `r = 1`, so the disc edge stays put while the
/// center is magnified and the limb compressed.
#[inline]
pub fn spherical_source_radius(r: f32, strength: f32) -> f32 {
    let r = r.clamp(0.0, 1.0);
    (1.0 - strength) * r + strength * r.asin() * FRAC_2_PI
}

/// Remaps a square texture as if wrapped onto the front face of a sphere.
///
/// `strength` in `[0, 1]` blends between no distortion and full
/// orthographic projection. Pixels outside the inscribed disc become
/// fully transparent.
pub fn apply_spherical_distortion(image: &RgbaImage, strength: f32) -> RgbaImage {
    let strength = strength.clamp(0.0, 1.0);
    let size = image.width().min(image.height());
    let disc = Disc::for_canvas(size);

    RgbaImage::from_fn(image.width(), image.height(), |x, y| {
        if x >= size || y >= size {
            return Rgba([0, 0, 0, 0]);
        }

        let offset = disc.normalized(x, y);
        let r = offset.length();
        if r > 1.0 {
            return Rgba([0, 0, 0, 0]);
        }

        let src = if r > 0.0 {
            disc.center + offset * (spherical_source_radius(r, strength) / r) * disc.radius
        } else {
            disc.center
        };
        sample_bilinear(image, src.x, src.y)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_radius_fixes_endpoints() {
        for s in [0.0, 0.15, 1.0] {
            assert!(spherical_source_radius(0.0, s).abs() < 1e-6);
            assert!((spherical_source_radius(1.0, s) - 1.0).abs() < 1e-6);
        }
        // Interior samples move inward (center magnified).
        assert!(spherical_source_radius(0.5, 0.15) < 0.5);
    }

    #[test]
    fn test_zero_strength_keeps_disc_content() {
        let img = RgbaImage::from_fn(32, 32, |x, y| Rgba([x as u8 * 8, y as u8 * 8, 100, 255]));
        let out = apply_spherical_distortion(&img, 0.0);
        assert_eq!(out.get_pixel(16, 16), img.get_pixel(16, 16));
        assert_eq!(out.get_pixel(10, 20), img.get_pixel(10, 20));
    }

    #[test]
    fn test_outside_disc_is_transparent() {
        let img = RgbaImage::from_pixel(40, 40, Rgba([255, 255, 255, 255]));
        let out = apply_spherical_distortion(&img, 0.15);
        let disc = Disc::for_canvas(40);
        for (x, y, p) in out.enumerate_pixels() {
            if !disc.contains(x, y) {
                assert_eq!(p[3], 0);
            } else {
                assert_eq!(p[3], 255);
            }
        }
    }

    #[test]
    fn test_bilinear_midpoint() {
        let mut img = RgbaImage::new(2, 1);
        img.put_pixel(0, 0, Rgba([0, 0, 0, 0]));
        img.put_pixel(1, 0, Rgba([200, 100, 50, 255]));
        let mid = sample_bilinear(&img, 1.0, 0.5);
        // Transparent neighbor thins alpha without darkening color.
        assert_eq!(mid.0, [200, 100, 50, 128]);
        assert_eq!(sample_bilinear(&img, 0.5, 0.5).0, [0, 0, 0, 0]);
    }
}
