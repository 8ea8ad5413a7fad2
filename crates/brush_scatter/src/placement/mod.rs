//! Placement pipeline: candidate sampling, spacing, asset selection, and strokes.
//!
//! One brush tick flows through [`sampler::ScatterSampler`] (candidates inside the
//! footprint, lifted onto the surface and thinned by [`grid::PlacementDensityGrid`]),
//! picks an asset per accepted candidate with [`selection::AssetSelector`], and hands
//! the resulting [`PlacedInstance`]s to the active [`stroke::PlacementStroke`].
use glam::{Mat4, Quat, Vec2, Vec3};
use rand::RngCore;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub mod events;
pub mod grid;
pub mod history;
pub mod pool;
pub mod sampler;
pub mod selection;
pub mod stroke;

/// Opaque identifier of a model asset owned by the host's asset manager.
pub type AssetId = String;

/// A model instance placed on the terrain.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedInstance {
    /// Asset to instantiate.
    pub asset: AssetId,
    /// World position on the terrain surface.
    pub position: Vec3,
    /// Rotation around the vertical axis in radians.
    pub rotation_y: f32,
    /// Uniform scale factor.
    pub scale: f32,
    /// Unit surface normal at `position`.
    pub surface_normal: Vec3,
    /// Whether the instance's up axis follows `surface_normal`.
    pub align_to_surface: bool,
}

impl PlacedInstance {
    /// Position projected onto the `(x, z)` plane.
    #[inline]
    pub fn xz(&self) -> Vec2 {
        Vec2::new(self.position.x, self.position.z)
    }

    /// Orientation of the instance: yaw, optionally tilted onto the surface normal.
    pub fn rotation(&self) -> Quat {
        let yaw = Quat::from_rotation_y(self.rotation_y);
        if !self.align_to_surface {
            return yaw;
        }
        let normal = self.surface_normal.normalize_or_zero();
        if normal == Vec3::ZERO {
            return yaw;
        }
        Quat::from_rotation_arc(Vec3::Y, normal) * yaw
    }

    /// Local-to-world transform.
    pub fn transform(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::splat(self.scale),
            self.rotation(),
            self.position,
        )
    }
}

/// Inclusive range the uniform scale of an instance is drawn from.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleJitter {
    pub min: f32,
    pub max: f32,
}

impl Default for ScaleJitter {
    fn default() -> Self {
        Self {
            min: 0.85,
            max: 1.15,
        }
    }
}

impl ScaleJitter {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// No jitter: every instance gets scale `1.0`.
    pub fn none() -> Self {
        Self::new(1.0, 1.0)
    }

    pub fn sample(&self, rng: &mut dyn RngCore) -> f32 {
        self.min + rand01(rng) * (self.max - self.min)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() || self.min <= 0.0 {
            return Err(Error::InvalidConfig(
                "scale jitter bounds must be finite and > 0".into(),
            ));
        }
        if self.min > self.max {
            return Err(Error::InvalidConfig(
                "scale jitter min must not exceed max".into(),
            ));
        }
        Ok(())
    }
}

/// Generate a random float in the range [0, 1).
#[inline]
pub(crate) fn rand01(rng: &mut dyn RngCore) -> f32 {
    let v = (rng.next_u32() >> 8) as f32;
    v / (1u32 << 24) as f32
}

#[cfg(test)]
pub(crate) mod test_support {
    use rand::RngCore;

    /// RNG that always returns the same word.
    pub struct FixedRng {
        pub value: u32,
    }

    impl RngCore for FixedRng {
        fn next_u32(&mut self) -> u32 {
            self.value
        }

        fn next_u64(&mut self) -> u64 {
            self.value as u64
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            let bytes = self.value.to_le_bytes();
            for (i, b) in dest.iter_mut().enumerate() {
                *b = bytes[i % 4];
            }
        }
    }

    pub fn pairwise_min_distance(points: &[glam::Vec2]) -> f32 {
        let mut min = f32::MAX;
        for i in 0..points.len() {
            for j in (i + 1)..points.len() {
                min = min.min(points[i].distance(points[j]));
            }
        }
        min
    }
}
