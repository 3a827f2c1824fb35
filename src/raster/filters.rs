//! Blur and contrast filters operating on 8-bit rasters.

use image::{imageops, Rgb, RgbImage, Rgba, RgbaImage};

/// Smallest sigma handed to the Gaussian kernel.
const MIN_SIGMA: f32 = 0.1;

/// Gaussian-blurs the RGB channels of `image`, leaving alpha untouched.
pub fn blur_rgb(image: &RgbaImage, sigma: f32) -> RgbaImage {
    if sigma < MIN_SIGMA {
        return image.clone();
    }

    let rgb = RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let p = image.get_pixel(x, y);
        Rgb([p[0], p[1], p[2]])
    });
    let blurred = imageops::blur(&rgb, sigma);

    RgbaImage::from_fn(image.width(), image.height(), |x, y| {
        let c = blurred.get_pixel(x, y);
        Rgba([c[0], c[1], c[2], image.get_pixel(x, y)[3]])
    })
}

/// Gaussian-blurs every channel of a single-color layer.
///
/// The RGB of fully transparent pixels is first set to `color` so the
/// blur spreads only coverage and never pulls black into the edges.
pub fn blur_layer(layer: &RgbaImage, color: [u8; 3], sigma: f32) -> RgbaImage {
    let mut filled = layer.clone();
    for p in filled.pixels_mut() {
        if p[3] == 0 {
            *p = Rgba([color[0], color[1], color[2], 0]);
        }
    }
    if sigma < MIN_SIGMA {
        return filled;
    }
    imageops::blur(&filled, sigma)
}

#[inline]
fn luminance(p: &Rgba<u8>) -> f32 {
    0.299 * p[0] as f32 + 0.587 * p[1] as f32 + 0.114 * p[2] as f32
}

/// Scales RGB distances from the mean luminance of visible pixels by `factor`.
///
/// Pixels with zero alpha neither contribute to the mean nor change.
/// Returns the image unchanged when nothing is visible.
pub fn enhance_contrast(image: &RgbaImage, factor: f32) -> RgbaImage {
    let (sum, count) = image
        .pixels()
        .filter(|p| p[3] > 0)
        .fold((0.0f64, 0u64), |(s, n), p| (s + luminance(p) as f64, n + 1));
    if count == 0 {
        return image.clone();
    }
    let mean = (sum / count as f64) as f32;

    let mut out = image.clone();
    for p in out.pixels_mut() {
        if p[3] == 0 {
            continue;
        }
        for c in 0..3 {
            p[c] = (mean + (p[c] as f32 - mean) * factor).round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}
