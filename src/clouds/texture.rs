//! Flat cloud sprite from a mask.

use image::{GrayImage, Rgba, RgbaImage};

use crate::raster::Disc;

/// Paints `color` over the inscribed disc and takes alpha from `mask`.
///
/// The color's own alpha scales the mask, so a translucent palette entry
/// gives a translucent layer. Pixels outside the disc are transparent black.
pub fn compose_cloud_texture(mask: &GrayImage, color: Rgba<u8>) -> RgbaImage {
    let size = mask.width();
    let disc = Disc::for_canvas(size);
    let [r, g, b, a] = color.0;

    RgbaImage::from_fn(size, mask.height(), |x, y| {
        if !disc.contains(x, y) {
            return Rgba([0, 0, 0, 0]);
        }
        let m = mask.get_pixel(x, y)[0] as u32;
        Rgba([r, g, b, ((m * a as u32 + 127) / 255) as u8])
    })
}
