//! Brush footprint and density controls consumed by placement ticks.
//!
//! The brush framework hands the core a [`BrushFootprint`] per tick: a center on the
//! `(x, z)` plane, a radius, and a [`BrushShape`] that decides whether a point lies
//! inside. Candidates are drawn in the footprint's bounding square and filtered with
//! [`BrushFootprint::contains`], which is the only place the brush shape is enforced.
use std::fmt;
use std::sync::Arc;

use glam::Vec2;
use mint::Vector2;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod density;

pub use density::{Density, SpacingRange};

/// Host-supplied distance test: `(offset from center, radius) -> inside`.
///
/// Compared by identity, so two masks are equal only if they share the closure.
#[derive(Clone)]
pub struct ShapeMask(Arc<dyn Fn(Vec2, f32) -> bool + Send + Sync>);

impl ShapeMask {
    pub fn new(test: impl Fn(Vec2, f32) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(test))
    }

    #[inline]
    pub fn test(&self, offset: Vec2, radius: f32) -> bool {
        (self.0)(offset, radius)
    }
}

impl fmt::Debug for ShapeMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ShapeMask(..)")
    }
}

impl PartialEq for ShapeMask {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Distance comparison used by a brush.
///
/// The built-in shapes accept the center and are monotonically less permissive as
/// the distance from the center grows. A [`BrushShape::Custom`] mask is only ever
/// asked about points inside the bounding square.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub enum BrushShape {
    /// Euclidean distance, a round brush.
    #[default]
    Circle,
    /// Chebyshev distance, an axis-aligned square brush.
    Square,
    /// Manhattan distance, a square brush rotated by 45 degrees.
    Diamond,
    /// Falloff or masked shape provided by the brush framework.
    #[cfg_attr(feature = "serde", serde(skip))]
    Custom(ShapeMask),
}

impl BrushShape {
    pub fn custom(test: impl Fn(Vec2, f32) -> bool + Send + Sync + 'static) -> Self {
        BrushShape::Custom(ShapeMask::new(test))
    }

    /// Whether `offset` from the brush center lies within `radius`.
    #[inline]
    pub fn within(&self, offset: Vec2, radius: f32) -> bool {
        match self {
            BrushShape::Circle => offset.length_squared() <= radius * radius,
            BrushShape::Square => offset.x.abs().max(offset.y.abs()) <= radius,
            BrushShape::Diamond => offset.x.abs() + offset.y.abs() <= radius,
            BrushShape::Custom(mask) => {
                offset.x.abs().max(offset.y.abs()) <= radius && mask.test(offset, radius)
            }
        }
    }

    /// Area covered by the shape at the given radius.
    ///
    /// A custom mask reports its bounding square.
    pub fn area(&self, radius: f32) -> f32 {
        match self {
            BrushShape::Circle => std::f32::consts::PI * radius * radius,
            BrushShape::Square | BrushShape::Custom(_) => 4.0 * radius * radius,
            BrushShape::Diamond => 2.0 * radius * radius,
        }
    }
}

/// Region affected by a single brush tick.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct BrushFootprint {
    /// Brush center on the `(x, z)` plane.
    pub center: Vec2,
    /// Brush radius in world units.
    pub radius: f32,
    pub shape: BrushShape,
}

impl BrushFootprint {
    /// Create a round footprint.
    pub fn new(center: impl Into<Vector2<f32>>, radius: f32) -> Self {
        Self::with_shape(center, radius, BrushShape::Circle)
    }

    pub fn with_shape(center: impl Into<Vector2<f32>>, radius: f32, shape: BrushShape) -> Self {
        Self {
            center: Vec2::from(center.into()),
            radius,
            shape,
        }
    }

    /// A footprint with a non-positive or non-finite radius covers nothing.
    #[inline]
    pub fn is_empty(&self) -> bool {
        !self.radius.is_finite() || self.radius <= 0.0
    }

    /// Distance test: whether `point` lies inside the footprint.
    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        !self.is_empty() && self.shape.within(point - self.center, self.radius)
    }

    pub fn area(&self) -> f32 {
        if self.is_empty() {
            return 0.0;
        }
        self.shape.area(self.radius)
    }

    /// Lower corner of the bounding square.
    pub fn bounding_min(&self) -> Vec2 {
        self.center - Vec2::splat(self.radius)
    }

    /// Upper corner of the bounding square.
    pub fn bounding_max(&self) -> Vec2 {
        self.center + Vec2::splat(self.radius)
    }
}
