//! Disc geometry for square planet canvases.

use glam::Vec2;
use image::{GrayImage, Luma};

/// The inscribed disc of a square canvas.
///
/// Coordinates are measured from pixel centers, so pixel `(x, y)` sits at
/// `(x + 0.5, y + 0.5)`. The radius leaves a half-pixel margin on each side,
/// giving the disc a diameter of `size - 1` pixel centers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Disc {
    pub center: Vec2,
    pub radius: f32,
}

impl Disc {
    pub fn for_canvas(size: u32) -> Self {
        let half = size as f32 * 0.5;
        Self {
            center: Vec2::splat(half),
            radius: (half - 0.5).max(0.5),
        }
    }

    /// Offset of the pixel center from the disc center, in pixels.
    #[inline]
    pub fn offset(&self, x: u32, y: u32) -> Vec2 {
        Vec2::new(x as f32 + 0.5, y as f32 + 0.5) - self.center
    }

    /// Offset scaled so the disc edge sits at length 1.
    #[inline]
    pub fn normalized(&self, x: u32, y: u32) -> Vec2 {
        self.offset(x, y) / self.radius
    }

    #[inline]
    pub fn contains(&self, x: u32, y: u32) -> bool {
        self.offset(x, y).length_squared() <= self.radius * self.radius
    }
}

/// Full opacity inside the inscribed circle of a `size x size` canvas, zero outside.
pub fn create_circle_mask(size: u32) -> GrayImage {
    let disc = Disc::for_canvas(size);
    GrayImage::from_fn(size, size, |x, y| {
        if disc.contains(x, y) {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

/// Multiplies two masks channel-wise (`a * b / 255`).
pub fn multiply_masks(a: &GrayImage, b: &GrayImage) -> GrayImage {
    GrayImage::from_fn(a.width(), a.height(), |x, y| {
        let av = a.get_pixel(x, y)[0] as u32;
        let bv = if x < b.width() && y < b.height() {
            b.get_pixel(x, y)[0] as u32
        } else {
            0
        };
        Luma([((av * bv + 127) / 255) as u8])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_mask_corners_and_center() {
        let mask = create_circle_mask(64);
        assert_eq!(mask.get_pixel(0, 0)[0], 0);
        assert_eq!(mask.get_pixel(63, 0)[0], 0);
        assert_eq!(mask.get_pixel(0, 63)[0], 0);
        assert_eq!(mask.get_pixel(63, 63)[0], 0);
        assert_eq!(mask.get_pixel(32, 32)[0], 255);
        assert_eq!(mask.get_pixel(1, 32)[0], 255);
    }

    #[test]
    fn test_circle_mask_stays_inside_radius() {
        let size = 50;
        let mask = create_circle_mask(size);
        let half = size as f32 / 2.0;
        for (x, y, p) in mask.enumerate_pixels() {
            let d = Vec2::new(x as f32 + 0.5 - half, y as f32 + 0.5 - half).length();
            if d > half {
                assert_eq!(p[0], 0);
            }
        }
    }

    #[test]
    fn test_multiply_masks() {
        let a = GrayImage::from_pixel(2, 2, Luma([255]));
        let b = GrayImage::from_pixel(2, 2, Luma([128]));
        let c = multiply_masks(&a, &b);
        assert_eq!(c.get_pixel(1, 1)[0], 128);

        let zero = GrayImage::new(2, 2);
        assert_eq!(multiply_masks(&a, &zero).get_pixel(0, 0)[0], 0);
    }
}
