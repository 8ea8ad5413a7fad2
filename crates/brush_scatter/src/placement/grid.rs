//! Spatial acceptance grid enforcing a minimum `(x, z)` spacing within one stroke.
//!
//! Accepted points are bucketed by `floor(coord / min_spacing)`. Because a bucket is
//! exactly `min_spacing` wide, any point closer than `min_spacing` to a candidate
//! lives in the candidate's bucket or one of its eight neighbors, so a check touches
//! at most nine buckets no matter how long the stroke has been running.
//!
//! Bucket indices are computed in `f64` and stored as `i64`, so every finite `f32`
//! coordinate maps to a bucket without wrapping. Indices past `i64` saturate, and the
//! saturated bucket still runs the exact distance test.
use std::collections::HashMap;

use glam::Vec2;

/// Bucket coordinates in the acceptance grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellKey(
    /// Bucket index along X.
    pub i64,
    /// Bucket index along Z.
    pub i64,
);

#[derive(Debug, Clone, Default)]
pub struct PlacementDensityGrid {
    min_spacing: f32,
    min_spacing_squared: f32,
    cells: HashMap<CellKey, Vec<Vec2>>,
    len: usize,
}

impl PlacementDensityGrid {
    /// Create an empty grid for `min_spacing`.
    pub fn new(min_spacing: f32) -> Self {
        let mut grid = Self::default();
        grid.reset(min_spacing);
        grid
    }

    /// Forget all accepted points and start over with `min_spacing`.
    ///
    /// A non-positive or non-finite spacing disables the distance check.
    pub fn reset(&mut self, min_spacing: f32) {
        self.cells.clear();
        self.len = 0;
        self.set_spacing(min_spacing);
    }

    /// Change the spacing while keeping accepted points, re-bucketing them.
    pub fn respace(&mut self, min_spacing: f32) {
        let spacing = Self::sanitize(min_spacing);
        if spacing == self.min_spacing {
            return;
        }
        let points: Vec<Vec2> = self.points().collect();
        self.reset(spacing);
        for p in points {
            self.insert(p);
        }
    }

    /// Record `point` without checking spacing.
    pub fn insert(&mut self, point: Vec2) {
        let key = self.cell_of(point);
        self.cells.entry(key).or_default().push(point);
        self.len += 1;
    }

    /// Forget one previously recorded `point`. Returns whether it was present.
    pub fn remove(&mut self, point: Vec2) -> bool {
        let key = self.cell_of(point);
        let Some(bucket) = self.cells.get_mut(&key) else {
            return false;
        };
        let Some(index) = bucket.iter().position(|q| *q == point) else {
            return false;
        };
        bucket.swap_remove(index);
        if bucket.is_empty() {
            self.cells.remove(&key);
        }
        self.len -= 1;
        true
    }

    /// Record `point` iff no accepted point lies closer than the minimum spacing.
    pub fn try_accept(&mut self, point: Vec2) -> bool {
        if !self.is_free(point) {
            return false;
        }
        self.insert(point);
        true
    }

    /// Whether `point` would be accepted, without recording it.
    pub fn is_free(&self, point: Vec2) -> bool {
        if self.min_spacing == 0.0 || self.len == 0 {
            return true;
        }

        let CellKey(cx, cz) = self.cell_of(point);
        for dz in -1..=1 {
            for dx in -1..=1 {
                let key = CellKey(cx.saturating_add(dx), cz.saturating_add(dz));
                let Some(bucket) = self.cells.get(&key) else {
                    continue;
                };
                if bucket
                    .iter()
                    .any(|q| q.distance_squared(point) < self.min_spacing_squared)
                {
                    return false;
                }
            }
        }
        true
    }

    /// Bucket that `point` falls into.
    #[inline]
    pub fn cell_of(&self, point: Vec2) -> CellKey {
        let size = f64::from(self.cell_size());
        CellKey(
            (f64::from(point.x) / size).floor() as i64,
            (f64::from(point.y) / size).floor() as i64,
        )
    }

    #[inline]
    pub fn min_spacing(&self) -> f32 {
        self.min_spacing
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterate over every accepted point, in no particular order.
    pub fn points(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.cells.values().flat_map(|bucket| bucket.iter().copied())
    }

    fn set_spacing(&mut self, min_spacing: f32) {
        self.min_spacing = Self::sanitize(min_spacing);
        self.min_spacing_squared = self.min_spacing * self.min_spacing;
    }

    #[inline]
    fn cell_size(&self) -> f32 {
        if self.min_spacing > 0.0 {
            self.min_spacing
        } else {
            1.0
        }
    }

    fn sanitize(min_spacing: f32) -> f32 {
        if min_spacing.is_finite() && min_spacing > 0.0 {
            min_spacing
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::placement::rand01;
    use crate::placement::test_support::pairwise_min_distance;

    #[test]
    fn rejects_points_closer_than_spacing() {
        let mut grid = PlacementDensityGrid::new(2.0);
        assert!(grid.try_accept(Vec2::ZERO));
        assert!(!grid.try_accept(Vec2::new(1.9, 0.0)));
        assert!(!grid.try_accept(Vec2::new(-1.0, -1.0)));
        assert!(grid.try_accept(Vec2::new(2.0, 0.0)));
        assert_eq!(grid.len(), 2);
    }

    #[test]
    fn neighbors_across_bucket_edges_are_found() {
        let mut grid = PlacementDensityGrid::new(1.0);
        assert!(grid.try_accept(Vec2::new(0.99, 0.99)));
        assert_eq!(grid.cell_of(Vec2::new(0.99, 0.99)), CellKey(0, 0));
        assert_eq!(grid.cell_of(Vec2::new(1.01, 1.01)), CellKey(1, 1));
        assert!(!grid.try_accept(Vec2::new(1.01, 1.01)));
        assert!(!grid.try_accept(Vec2::new(-0.001, 0.99)));
        assert_eq!(grid.cell_of(Vec2::new(-0.001, 0.99)), CellKey(-1, 0));
    }

    #[test]
    fn reset_forgets_points() {
        let mut grid = PlacementDensityGrid::new(5.0);
        grid.try_accept(Vec2::new(3.0, 3.0));
        grid.reset(5.0);
        assert!(grid.is_empty());
        assert!(grid.try_accept(Vec2::new(3.0, 3.0)));
    }

    #[test]
    fn zero_spacing_accepts_coincident_points() {
        let mut grid = PlacementDensityGrid::new(0.0);
        assert!(grid.try_accept(Vec2::ONE));
        assert!(grid.try_accept(Vec2::ONE));
        assert_eq!(grid.len(), 2);
        assert_eq!(grid.min_spacing(), 0.0);
    }

    #[test]
    fn respace_keeps_points_and_applies_new_spacing() {
        let mut grid = PlacementDensityGrid::new(1.0);
        assert!(grid.try_accept(Vec2::ZERO));
        assert!(grid.try_accept(Vec2::new(1.5, 0.0)));
        grid.respace(3.0);
        assert_eq!(grid.len(), 2);
        assert!(!grid.try_accept(Vec2::new(4.0, 0.0)));
        assert!(grid.try_accept(Vec2::new(4.5, 0.0)));
    }

    #[test]
    fn random_inserts_match_brute_force() {
        let mut rng = StdRng::seed_from_u64(99);
        let spacing = 0.75;
        let mut grid = PlacementDensityGrid::new(spacing);
        let mut accepted: Vec<Vec2> = Vec::new();

        for _ in 0..2000 {
            let p = Vec2::new(rand01(&mut rng) * 20.0 - 10.0, rand01(&mut rng) * 20.0 - 10.0);
            let brute = accepted.iter().all(|q| q.distance(p) >= spacing);
            assert_eq!(grid.try_accept(p), brute);
            if brute {
                accepted.push(p);
            }
        }

        assert_eq!(grid.len(), accepted.len());
        assert!(pairwise_min_distance(&accepted) >= spacing);
    }

    #[test]
    fn far_coordinates_keep_spacing() {
        let mut grid = PlacementDensityGrid::new(0.01);
        let far = Vec2::new(3.0e7, 0.0);
        assert!(grid.try_accept(far));
        assert!(!grid.try_accept(far));
        assert!(!grid.try_accept(Vec2::new(3.0e7, 0.005)));
        assert!(grid.try_accept(Vec2::new(3.0e7, 0.02)));
        assert!(grid.cell_of(far).0 > i64::from(i32::MAX));
    }

    #[test]
    fn saturated_buckets_still_test_distance() {
        let mut grid = PlacementDensityGrid::new(1.0e-10);
        let edge = Vec2::new(f32::MAX, f32::MIN);
        assert_eq!(grid.cell_of(edge), CellKey(i64::MAX, i64::MIN));
        assert!(grid.try_accept(edge));
        assert!(!grid.try_accept(edge));
        assert!(grid.try_accept(Vec2::new(f32::MAX, 0.0)));
        assert_eq!(grid.len(), 2);
    }

    #[test]
    fn remove_frees_the_neighborhood() {
        let mut grid = PlacementDensityGrid::new(2.0);
        grid.insert(Vec2::ZERO);
        assert!(!grid.is_free(Vec2::new(1.0, 0.0)));
        assert!(grid.remove(Vec2::ZERO));
        assert!(!grid.remove(Vec2::ZERO));
        assert!(grid.is_empty());
        assert!(grid.try_accept(Vec2::new(1.0, 0.0)));
    }
}
