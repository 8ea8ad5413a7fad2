//! Terrain surface queries used to lift candidate positions onto the terrain.
//!
//! The placement pipeline never owns terrain data. It asks a [`SurfaceSampler`]
//! for height and normal at world `(x, z)` coordinates and skips any candidate
//! the sampler reports as [`Error::OutOfBounds`].
use glam::{Vec2, Vec3};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub mod heightfield;

pub use heightfield::Heightfield;

/// Height and normal of the terrain at one world position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSample {
    pub height: f32,
    /// Unit-length surface normal.
    pub normal: Vec3,
}

/// Read-only terrain query interface.
///
/// Implementations must be side-effect free and must report coordinates outside
/// the sampleable terrain as [`Error::OutOfBounds`].
pub trait SurfaceSampler: Send + Sync {
    fn height_at(&self, x: f32, z: f32) -> Result<f32>;

    fn normal_at(&self, x: f32, z: f32) -> Result<Vec3>;

    fn sample(&self, x: f32, z: f32) -> Result<SurfaceSample> {
        Ok(SurfaceSample {
            height: self.height_at(x, z)?,
            normal: self.normal_at(x, z)?,
        })
    }
}

/// A bounded horizontal plane at constant height.
#[derive(Debug, Clone)]
pub struct FlatSurface {
    pub height: f32,
    pub min: Vec2,
    pub max: Vec2,
}

impl FlatSurface {
    pub fn new(height: f32, min: Vec2, max: Vec2) -> Self {
        Self { height, min, max }
    }

    /// A plane centered on the origin with the given `(x, z)` extent.
    pub fn centered(height: f32, extent: Vec2) -> Self {
        let half = extent * 0.5;
        Self::new(height, -half, half)
    }

    #[inline]
    fn contains(&self, x: f32, z: f32) -> bool {
        x >= self.min.x && x <= self.max.x && z >= self.min.y && z <= self.max.y
    }
}

impl SurfaceSampler for FlatSurface {
    fn height_at(&self, x: f32, z: f32) -> Result<f32> {
        if !self.contains(x, z) {
            return Err(Error::OutOfBounds { x, z });
        }
        Ok(self.height)
    }

    fn normal_at(&self, x: f32, z: f32) -> Result<Vec3> {
        if !self.contains(x, z) {
            return Err(Error::OutOfBounds { x, z });
        }
        Ok(Vec3::Y)
    }
}

/// Validity constraints applied to a candidate after it was lifted onto the surface.
pub trait CandidateFilter: Send + Sync {
    fn accepts(&self, position: Vec3, normal: Vec3) -> bool;
}

/// Built-in slope and height limits.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SurfaceConstraints {
    /// Maximum angle between the surface normal and world up, in degrees.
    pub max_slope_degrees: Option<f32>,
    /// Inclusive `(min, max)` terrain height range.
    pub height_range: Option<(f32, f32)>,
}

impl SurfaceConstraints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_slope_degrees(mut self, degrees: f32) -> Self {
        self.max_slope_degrees = Some(degrees);
        self
    }

    pub fn with_height_range(mut self, min: f32, max: f32) -> Self {
        self.height_range = Some((min, max));
        self
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(deg) = self.max_slope_degrees {
            if !(0.0..=90.0).contains(&deg) {
                return Err(Error::InvalidConfig(
                    "max_slope_degrees must be within [0, 90]".into(),
                ));
            }
        }
        if let Some((min, max)) = self.height_range {
            if !min.is_finite() || !max.is_finite() || min > max {
                return Err(Error::InvalidConfig(
                    "height_range must be finite with min <= max".into(),
                ));
            }
        }
        Ok(())
    }
}

impl CandidateFilter for SurfaceConstraints {
    fn accepts(&self, position: Vec3, normal: Vec3) -> bool {
        if let Some(deg) = self.max_slope_degrees {
            let cos_limit = deg.to_radians().cos();
            if normal.normalize_or_zero().dot(Vec3::Y) < cos_limit - 1e-6 {
                return false;
            }
        }
        if let Some((min, max)) = self.height_range {
            if position.y < min || position.y > max {
                return false;
            }
        }
        true
    }
}
