//! Regular-grid height field surface.
//!
//! Heights are stored row-major (`z * width + x`) at vertices spaced `cell_size`
//! apart, starting at `origin`. Heights are interpolated bilinearly and normals are
//! derived from central differences of the interpolated surface.
use glam::{Vec2, Vec3};

use crate::error::{Error, Result};
use crate::surface::SurfaceSampler;

#[derive(Clone, Debug)]
pub struct Heightfield {
    /// World-space `(x, z)` of the first vertex.
    pub origin: Vec2,
    /// Vertex spacing in world units.
    pub cell_size: f32,
    /// Vertex count along X.
    pub width: usize,
    /// Vertex count along Z.
    pub depth: usize,
    heights: Vec<f32>,
}

impl Heightfield {
    /// Create a height field from row-major vertex heights.
    pub fn try_new(
        origin: Vec2,
        cell_size: f32,
        width: usize,
        depth: usize,
        heights: Vec<f32>,
    ) -> Result<Self> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(Error::InvalidConfig("cell_size must be > 0".into()));
        }
        if width < 2 || depth < 2 {
            return Err(Error::InvalidConfig(
                "height field needs at least 2x2 vertices".into(),
            ));
        }
        if heights.len() != width * depth {
            return Err(Error::InvalidConfig(format!(
                "expected {} heights, got {}",
                width * depth,
                heights.len()
            )));
        }
        Ok(Self {
            origin,
            cell_size,
            width,
            depth,
            heights,
        })
    }

    /// Build a height field by evaluating `f(x, z)` at every vertex.
    pub fn from_fn(
        origin: Vec2,
        cell_size: f32,
        width: usize,
        depth: usize,
        mut f: impl FnMut(f32, f32) -> f32,
    ) -> Result<Self> {
        let mut heights = Vec::with_capacity(width * depth);
        for iz in 0..depth {
            for ix in 0..width {
                let x = origin.x + ix as f32 * cell_size;
                let z = origin.y + iz as f32 * cell_size;
                heights.push(f(x, z));
            }
        }
        Self::try_new(origin, cell_size, width, depth, heights)
    }

    /// World-space `(min, max)` corners covered by the vertices.
    pub fn bounds(&self) -> (Vec2, Vec2) {
        let extent = Vec2::new(
            (self.width - 1) as f32 * self.cell_size,
            (self.depth - 1) as f32 * self.cell_size,
        );
        (self.origin, self.origin + extent)
    }

    #[inline]
    fn vertex(&self, ix: usize, iz: usize) -> f32 {
        self.heights[iz * self.width + ix]
    }

    fn local(&self, x: f32, z: f32) -> Option<(f32, f32)> {
        let fx = (x - self.origin.x) / self.cell_size;
        let fz = (z - self.origin.y) / self.cell_size;
        let max_x = (self.width - 1) as f32;
        let max_z = (self.depth - 1) as f32;
        if !fx.is_finite() || !fz.is_finite() || fx < 0.0 || fz < 0.0 || fx > max_x || fz > max_z
        {
            return None;
        }
        Some((fx, fz))
    }

    fn bilinear(&self, fx: f32, fz: f32) -> f32 {
        let ix = (fx.floor() as usize).min(self.width - 2);
        let iz = (fz.floor() as usize).min(self.depth - 2);
        let tx = fx - ix as f32;
        let tz = fz - iz as f32;

        let h00 = self.vertex(ix, iz);
        let h10 = self.vertex(ix + 1, iz);
        let h01 = self.vertex(ix, iz + 1);
        let h11 = self.vertex(ix + 1, iz + 1);

        let top = h00 + (h10 - h00) * tx;
        let bottom = h01 + (h11 - h01) * tx;
        top + (bottom - top) * tz
    }
}

impl SurfaceSampler for Heightfield {
    fn height_at(&self, x: f32, z: f32) -> Result<f32> {
        let (fx, fz) = self.local(x, z).ok_or(Error::OutOfBounds { x, z })?;
        Ok(self.bilinear(fx, fz))
    }

    fn normal_at(&self, x: f32, z: f32) -> Result<Vec3> {
        let (fx, fz) = self.local(x, z).ok_or(Error::OutOfBounds { x, z })?;
        let max_x = (self.width - 1) as f32;
        let max_z = (self.depth - 1) as f32;

        // Central differences, one-sided at the edges.
        let x0 = (fx - 1.0).max(0.0);
        let x1 = (fx + 1.0).min(max_x);
        let z0 = (fz - 1.0).max(0.0);
        let z1 = (fz + 1.0).min(max_z);

        let dh_dx = (self.bilinear(x1, fz) - self.bilinear(x0, fz)) / ((x1 - x0) * self.cell_size);
        let dh_dz = (self.bilinear(fx, z1) - self.bilinear(fx, z0)) / ((z1 - z0) * self.cell_size);

        Ok(Vec3::new(-dh_dx, 1.0, -dh_dz).normalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> Heightfield {
        // h = 0.5 * x
        Heightfield::from_fn(Vec2::new(-4.0, -4.0), 1.0, 9, 9, |x, _| 0.5 * x).unwrap()
    }

    #[test]
    fn try_new_validates_dimensions() {
        assert!(Heightfield::try_new(Vec2::ZERO, 1.0, 1, 4, vec![0.0; 4]).is_err());
        assert!(Heightfield::try_new(Vec2::ZERO, 0.0, 2, 2, vec![0.0; 4]).is_err());
        assert!(Heightfield::try_new(Vec2::ZERO, 1.0, 2, 2, vec![0.0; 3]).is_err());
        assert!(Heightfield::try_new(Vec2::ZERO, 1.0, 2, 2, vec![0.0; 4]).is_ok());
    }

    #[test]
    fn bounds_cover_all_vertices() {
        let (min, max) = ramp().bounds();
        assert_eq!(min, Vec2::new(-4.0, -4.0));
        assert_eq!(max, Vec2::new(4.0, 4.0));
    }

    #[test]
    fn height_is_interpolated_bilinearly() {
        let field = Heightfield::try_new(Vec2::ZERO, 2.0, 2, 2, vec![0.0, 2.0, 4.0, 6.0]).unwrap();
        assert!((field.height_at(1.0, 0.0).unwrap() - 1.0).abs() < 1e-6);
        assert!((field.height_at(0.0, 1.0).unwrap() - 2.0).abs() < 1e-6);
        assert!((field.height_at(1.0, 1.0).unwrap() - 3.0).abs() < 1e-6);
        assert!((field.height_at(2.0, 2.0).unwrap() - 6.0).abs() < 1e-6);
    }

    #[test]
    fn normal_follows_slope() {
        let field = ramp();
        let n = field.normal_at(0.3, 1.7).unwrap();
        let expected = Vec3::new(-0.5, 1.0, 0.0).normalize();
        assert!((n - expected).length() < 1e-5);

        // One-sided difference at the border still sees the same slope.
        let edge = field.normal_at(4.0, -4.0).unwrap();
        assert!((edge - expected).length() < 1e-5);
    }

    #[test]
    fn queries_outside_extent_fail() {
        let field = ramp();
        assert!(matches!(
            field.height_at(4.5, 0.0),
            Err(Error::OutOfBounds { .. })
        ));
        assert!(matches!(
            field.normal_at(0.0, -10.0),
            Err(Error::OutOfBounds { .. })
        ));
        assert!(field.height_at(f32::NAN, 0.0).is_err());
    }
}
