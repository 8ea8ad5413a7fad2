//! Density knob and its mapping to a minimum spacing between placed instances.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Normalized density in `[0, 1]`. Higher density means tighter spacing.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct Density(f32);

impl Density {
    pub const MIN: Density = Density(0.0);
    pub const MAX: Density = Density(1.0);

    /// Create a density, clamping to `[0, 1]`. NaN maps to `0`.
    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            return Self::MIN;
        }
        Self(value.clamp(0.0, 1.0))
    }

    #[inline]
    pub fn value(self) -> f32 {
        self.0
    }
}

impl From<f32> for Density {
    fn from(value: f32) -> Self {
        Density::new(value)
    }
}

/// Range of minimum spacings reachable through the density knob.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpacingRange {
    /// Spacing at maximum density.
    pub min: f32,
    /// Spacing at minimum density.
    pub max: f32,
}

impl Default for SpacingRange {
    fn default() -> Self {
        Self { min: 0.5, max: 8.0 }
    }
}

impl SpacingRange {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Minimum spacing for `density`, interpolated linearly from `max` down to `min`.
    pub fn spacing_for(&self, density: Density) -> f32 {
        self.max + (self.min - self.max) * density.value()
    }

    pub fn validate(&self) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(Error::InvalidConfig("spacing range must be finite".into()));
        }
        if self.min <= 0.0 {
            return Err(Error::InvalidConfig("minimum spacing must be > 0".into()));
        }
        if self.min > self.max {
            return Err(Error::InvalidConfig(
                "minimum spacing must not exceed maximum spacing".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn density_is_clamped() {
        assert_eq!(Density::new(-1.0), Density::MIN);
        assert_eq!(Density::new(3.0), Density::MAX);
        assert_eq!(Density::new(f32::NAN), Density::MIN);
        assert_eq!(Density::from(0.25).value(), 0.25);
    }

    #[test]
    fn higher_density_means_smaller_spacing() {
        let range = SpacingRange::new(1.0, 5.0);
        assert_eq!(range.spacing_for(Density::MIN), 5.0);
        assert_eq!(range.spacing_for(Density::MAX), 1.0);

        let mut last = f32::INFINITY;
        for i in 0..=10 {
            let s = range.spacing_for(Density::new(i as f32 / 10.0));
            assert!(s <= last);
            last = s;
        }
    }

    #[test]
    fn validate_checks_ordering_and_sign() {
        assert!(SpacingRange::default().validate().is_ok());
        assert!(SpacingRange::new(0.0, 1.0).validate().is_err());
        assert!(SpacingRange::new(2.0, 1.0).validate().is_err());
        assert!(SpacingRange::new(1.0, f32::INFINITY).validate().is_err());
        assert!(SpacingRange::new(2.0, 2.0).validate().is_ok());
    }
}
