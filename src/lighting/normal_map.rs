//! Normal maps from height fields (Sobel).

use glam::Vec3;
use image::RgbaImage;

/// Row-major scalar height field, typically in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightField {
    pub width: u32,
    pub height: u32,
    pub values: Vec<f32>,
}

impl HeightField {
    /// Treats the alpha channel of `image` as height, scaled to `[0, 1]`.
    pub fn from_alpha(image: &RgbaImage) -> Self {
        let values = image.pixels().map(|p| p[3] as f32 / 255.0).collect();
        Self {
            width: image.width(),
            height: image.height(),
            values,
        }
    }

    fn at_clamped(&self, x: i32, y: i32) -> f32 {
        let xi = x.clamp(0, self.width as i32 - 1) as u32;
        let yi = y.clamp(0, self.height as i32 - 1) as u32;
        self.values[(yi * self.width + xi) as usize]
    }
}

/// Per-pixel unit normals with Z pointing out of the image.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalMap {
    pub width: u32,
    pub height: u32,
    pub normals: Vec<Vec3>,
}

impl NormalMap {
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Vec3 {
        self.normals[(y * self.width + x) as usize]
    }
}

fn normal_from_sobel(field: &HeightField, x: i32, y: i32, strength: f32) -> Vec3 {
    let tl = field.at_clamped(x - 1, y - 1);
    let tc = field.at_clamped(x, y - 1);
    let tr = field.at_clamped(x + 1, y - 1);
    let ml = field.at_clamped(x - 1, y);
    let mr = field.at_clamped(x + 1, y);
    let bl = field.at_clamped(x - 1, y + 1);
    let bc = field.at_clamped(x, y + 1);
    let br = field.at_clamped(x + 1, y + 1);

    let gx = (tr + 2.0 * mr + br) - (tl + 2.0 * ml + bl);
    let gy = (bl + 2.0 * bc + br) - (tl + 2.0 * tc + tr);

    Vec3::new(-gx * strength, -gy * strength, 1.0).normalize_or_zero()
}

/// Derives unit normals from the gradient of `field`.
///
/// `strength` scales the gradients; flat regions map to `(0, 0, 1)`.
/// Edges sample with clamped coordinates.
pub fn calculate_normal_map(field: &HeightField, strength: f32) -> NormalMap {
    let mut normals = Vec::with_capacity(field.values.len());
    for y in 0..field.height as i32 {
        for x in 0..field.width as i32 {
            normals.push(normal_from_sobel(field, x, y, strength));
        }
    }

    NormalMap {
        width: field.width,
        height: field.height,
        normals,
    }
}
