//! Directional light shading for RGBA rasters.

use glam::{Vec2, Vec3};
use image::{Rgba, RgbaImage};

use super::normal_map::NormalMap;

/// Z component of the light vector before normalization. Puts the light
/// 45 degrees above the image plane.
const LIGHT_ELEVATION: f32 = 1.0;

/// Phong exponent for the specular term.
const SHININESS: i32 = 10;

/// Light direction derived from an angle in degrees.
///
/// Image Y grows downward, so the planar component is `(cos a, -sin a)`:
/// 0 degrees lights from the right, 90 from the top.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightDirection {
    pub angle_deg: f32,
}

impl LightDirection {
    pub fn from_angle(angle_deg: f32) -> Self {
        Self { angle_deg }
    }

    /// Unit vector in the image plane pointing toward the light.
    pub fn planar(&self) -> Vec2 {
        let a = self.angle_deg.to_radians();
        Vec2::new(a.cos(), -a.sin())
    }

    /// Normalized 3D vector toward the light.
    pub fn vector(&self) -> Vec3 {
        self.planar().extend(LIGHT_ELEVATION).normalize()
    }
}

/// Shading weights for [`apply_directional_light`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadingWeights {
    pub ambient: f32,
    pub diffuse: f32,
    pub specular: f32,
}

/// Shades `image` with an ambient + Lambert diffuse + Phong specular model.
///
/// Each RGB channel becomes `c * (ambient + diffuse * max(n.l, 0)) + 255 * specular * spec`,
/// clamped to `[0, 255]`. Fully transparent pixels and the alpha channel are left as-is.
pub fn apply_directional_light(
    image: &RgbaImage,
    normals: &NormalMap,
    light: Vec3,
    weights: ShadingWeights,
) -> RgbaImage {
    let view = Vec3::Z;
    let mut out = image.clone();

    for (x, y, pixel) in out.enumerate_pixels_mut() {
        if pixel[3] == 0 {
            continue;
        }

        let n = normals.get(x, y);
        let n_dot_l = n.dot(light);
        let lambert = n_dot_l.max(0.0);

        let spec = if n_dot_l > 0.0 {
            let reflect = 2.0 * n_dot_l * n - light;
            reflect.dot(view).max(0.0).powi(SHININESS)
        } else {
            0.0
        };

        let factor = weights.ambient + weights.diffuse * lambert;
        let highlight = 255.0 * weights.specular * spec;
        let [r, g, b, a] = pixel.0;
        *pixel = Rgba([
            shade_channel(r, factor, highlight),
            shade_channel(g, factor, highlight),
            shade_channel(b, factor, highlight),
            a,
        ]);
    }

    out
}

#[inline]
fn shade_channel(c: u8, factor: f32, highlight: f32) -> u8 {
    (c as f32 * factor + highlight).round().clamp(0.0, 255.0) as u8
}
