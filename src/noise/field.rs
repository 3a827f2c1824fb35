//! Materialized noise grids.

/// A scalar field evaluated once over a `width x height` pixel grid.
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseField {
    width: u32,
    height: u32,
    values: Vec<f32>,
}

impl NoiseField {
    /// Evaluates `f` at every pixel center in canvas units (`[0, 1]` per axis).
    pub fn sample<F>(width: u32, height: u32, f: F) -> Self
    where
        F: Fn(f32, f32) -> f32,
    {
        let inv_w = 1.0 / width.max(1) as f32;
        let inv_h = 1.0 / height.max(1) as f32;
        let mut values = Vec::with_capacity(width as usize * height as usize);

        for y in 0..height {
            let v = (y as f32 + 0.5) * inv_h;
            for x in 0..width {
                let u = (x as f32 + 0.5) * inv_w;
                values.push(f(u, v));
            }
        }

        Self { width, height, values }
    }

    /// Builds a field from per-pixel indices.
    pub fn from_pixels<F>(width: u32, height: u32, f: F) -> Self
    where
        F: Fn(u32, u32) -> f32,
    {
        let mut values = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                values.push(f(x, y));
            }
        }
        Self { width, height, values }
    }

    /// Square field helper.
    pub fn square<F>(size: u32, f: F) -> Self
    where
        F: Fn(f32, f32) -> f32,
    {
        Self::sample(size, size, f)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.values[y as usize * self.width as usize + x as usize]
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }
}
