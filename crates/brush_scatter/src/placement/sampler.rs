//! Candidate generation and filtering for one brush tick.
//!
//! Per tick, [`ScatterSampler`] draws a bounded number of uniform candidates in the
//! footprint's bounding square and runs each through, in order:
//! 1. the brush distance test ([`BrushFootprint::contains`]),
//! 2. the surface query (off-terrain candidates are skipped),
//! 3. slope/height constraints and any extra [`CandidateFilter`]s,
//! 4. the stroke's [`PlacementDensityGrid`], unless the tick is additive.
//!
//! Survivors get an asset, a random yaw and a jittered scale.
use std::f32::consts::TAU;

use glam::{Vec2, Vec3};
use rand::RngCore;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::brush::BrushFootprint;
use crate::error::{Error, Result};
use crate::placement::events::{BrushEvent, BrushEventKind, EventSink};
use crate::placement::grid::PlacementDensityGrid;
use crate::placement::selection::AssetSelector;
use crate::placement::{rand01, PlacedInstance, ScaleJitter};
use crate::surface::{CandidateFilter, SurfaceConstraints, SurfaceSampler};

/// Sampling parameters shared by every tick of a tool.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterConfig {
    /// Candidates drawn per `min_spacing²` of footprint area.
    pub attempts_per_cell: f32,
    /// Upper bound on candidates per tick.
    pub max_attempts_per_tick: usize,
    pub scale_jitter: ScaleJitter,
    /// Tilt instances onto the surface normal.
    pub align_to_surface: bool,
    pub constraints: SurfaceConstraints,
}

impl Default for ScatterConfig {
    fn default() -> Self {
        Self {
            attempts_per_cell: 1.5,
            max_attempts_per_tick: 256,
            scale_jitter: ScaleJitter::default(),
            align_to_surface: false,
            constraints: SurfaceConstraints::default(),
        }
    }
}

impl ScatterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attempts_per_cell(mut self, attempts_per_cell: f32) -> Self {
        self.attempts_per_cell = attempts_per_cell;
        self
    }

    pub fn with_max_attempts_per_tick(mut self, max_attempts: usize) -> Self {
        self.max_attempts_per_tick = max_attempts;
        self
    }

    pub fn with_scale_jitter(mut self, scale_jitter: ScaleJitter) -> Self {
        self.scale_jitter = scale_jitter;
        self
    }

    pub fn with_align_to_surface(mut self, align: bool) -> Self {
        self.align_to_surface = align;
        self
    }

    pub fn with_constraints(mut self, constraints: SurfaceConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.attempts_per_cell.is_finite() || self.attempts_per_cell <= 0.0 {
            return Err(Error::InvalidConfig("attempts_per_cell must be > 0".into()));
        }
        if self.max_attempts_per_tick == 0 {
            return Err(Error::InvalidConfig(
                "max_attempts_per_tick must be > 0".into(),
            ));
        }
        self.scale_jitter.validate()?;
        self.constraints.validate()
    }
}

/// Why a candidate was discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectReason {
    /// Failed the brush distance test.
    OutsideShape,
    /// The surface reported the position as outside the terrain.
    OffTerrain,
    /// Failed a slope, height, or custom filter.
    InvalidSurface,
    /// Closer than the minimum spacing to an accepted point.
    TooClose,
}

/// Per-reason rejection counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RejectionCounts {
    pub outside_shape: usize,
    pub off_terrain: usize,
    pub invalid_surface: usize,
    pub too_close: usize,
}

impl RejectionCounts {
    pub fn record(&mut self, reason: RejectReason) {
        match reason {
            RejectReason::OutsideShape => self.outside_shape += 1,
            RejectReason::OffTerrain => self.off_terrain += 1,
            RejectReason::InvalidSurface => self.invalid_surface += 1,
            RejectReason::TooClose => self.too_close += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.outside_shape + self.off_terrain + self.invalid_surface + self.too_close
    }
}

/// Summary of a processed tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    pub stroke_id: u64,
    /// Candidates drawn.
    pub attempts: usize,
    /// Instances the scene accepted.
    pub placed: usize,
    /// Accepted candidates the scene failed to instantiate.
    pub skipped: usize,
    pub rejections: RejectionCounts,
}

impl TickOutcome {
    pub fn new(stroke_id: u64) -> Self {
        Self {
            stroke_id,
            ..Default::default()
        }
    }
}

/// Instances produced by one tick, before they reach the scene.
#[derive(Debug, Clone, Default)]
pub struct TickSample {
    pub instances: Vec<PlacedInstance>,
    pub attempts: usize,
    pub rejections: RejectionCounts,
}

/// Inputs of a single tick.
#[derive(Debug, Clone, Copy)]
pub struct TickParams<'a> {
    pub stroke_id: u64,
    pub footprint: &'a BrushFootprint,
    pub selector: AssetSelector<'a>,
    /// Skip the spacing check and accept every valid candidate.
    pub additive: bool,
}

pub struct ScatterSampler<'a> {
    config: &'a ScatterConfig,
    surface: &'a dyn SurfaceSampler,
    filters: &'a [Box<dyn CandidateFilter>],
}

impl<'a> ScatterSampler<'a> {
    pub fn new(config: &'a ScatterConfig, surface: &'a dyn SurfaceSampler) -> Self {
        Self {
            config,
            surface,
            filters: &[],
        }
    }

    /// Additional validity filters applied after the built-in constraints.
    pub fn with_filters(mut self, filters: &'a [Box<dyn CandidateFilter>]) -> Self {
        self.filters = filters;
        self
    }

    /// Candidates to draw for `footprint` at `min_spacing`.
    ///
    /// Grows with the footprint area and shrinks with the spacing, capped at
    /// [`ScatterConfig::max_attempts_per_tick`].
    pub fn attempt_count(&self, footprint: &BrushFootprint, min_spacing: f32) -> usize {
        let cap = self.config.max_attempts_per_tick;
        if footprint.is_empty() {
            return 0;
        }
        if !min_spacing.is_finite() || min_spacing <= 0.0 {
            return cap;
        }
        let cells = footprint.area() / (min_spacing * min_spacing);
        let wanted = (cells * self.config.attempts_per_cell).ceil();
        if !wanted.is_finite() || wanted >= cap as f32 {
            return cap;
        }
        (wanted as usize).clamp(1, cap)
    }

    /// Run one tick against the stroke's grid and random sequence.
    pub fn sample(
        &self,
        params: &TickParams<'_>,
        grid: &mut PlacementDensityGrid,
        rng: &mut dyn RngCore,
        sink: &mut dyn EventSink,
    ) -> TickSample {
        let footprint = params.footprint;
        let attempts = self.attempt_count(footprint, grid.min_spacing());
        let mut out = TickSample {
            instances: Vec::new(),
            attempts,
            rejections: RejectionCounts::default(),
        };
        if attempts == 0 {
            return out;
        }

        let origin = footprint.bounding_min();
        let extent = footprint.radius * 2.0;
        let mut reject =
            |rejections: &mut RejectionCounts, position: Vec2, reason: RejectReason| {
                rejections.record(reason);
                if sink.wants(BrushEventKind::CandidateRejected) {
                    sink.send(BrushEvent::CandidateRejected {
                        stroke_id: params.stroke_id,
                        position,
                        reason,
                    });
                }
            };

        for _ in 0..attempts {
            let candidate = origin + Vec2::new(rand01(rng), rand01(rng)) * extent;

            if !footprint.contains(candidate) {
                reject(&mut out.rejections, candidate, RejectReason::OutsideShape);
                continue;
            }

            let surface = match self.surface.sample(candidate.x, candidate.y) {
                Ok(s) => s,
                Err(e) => {
                    if !e.is_recoverable() {
                        warn!(
                            "Surface query at ({}, {}) failed: {}.",
                            candidate.x, candidate.y, e
                        );
                    }
                    reject(&mut out.rejections, candidate, RejectReason::OffTerrain);
                    continue;
                }
            };

            let position = Vec3::new(candidate.x, surface.height, candidate.y);
            if !self.config.constraints.accepts(position, surface.normal)
                || !self
                    .filters
                    .iter()
                    .all(|f| f.accepts(position, surface.normal))
            {
                reject(&mut out.rejections, candidate, RejectReason::InvalidSurface);
                continue;
            }

            if !params.additive && !grid.is_free(candidate) {
                reject(&mut out.rejections, candidate, RejectReason::TooClose);
                continue;
            }

            let Ok(asset) = params.selector.next(rng) else {
                break;
            };
            if !params.additive {
                grid.insert(candidate);
            }
            let rotation_y = rand01(rng) * TAU;
            let scale = self.config.scale_jitter.sample(rng);

            out.instances.push(PlacedInstance {
                asset: asset.id.clone(),
                position,
                rotation_y,
                scale,
                surface_normal: surface.normal,
                align_to_surface: self.config.align_to_surface,
            });
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::brush::BrushShape;
    use crate::placement::events::VecSink;
    use crate::placement::pool::AssetPool;
    use crate::placement::test_support::pairwise_min_distance;
    use crate::surface::{FlatSurface, Heightfield};

    fn flat() -> FlatSurface {
        FlatSurface::centered(0.0, Vec2::new(100.0, 100.0))
    }

    fn pool() -> AssetPool {
        AssetPool::from_ids(["oak", "pine", "rock"])
    }

    fn run(
        sampler: &ScatterSampler<'_>,
        footprint: &BrushFootprint,
        pool: &AssetPool,
        additive: bool,
        grid: &mut PlacementDensityGrid,
        rng: &mut StdRng,
    ) -> TickSample {
        let params = TickParams {
            stroke_id: 1,
            footprint,
            selector: AssetSelector::uniform(pool),
            additive,
        };
        sampler.sample(&params, grid, rng, &mut ())
    }

    #[test]
    fn attempt_count_scales_and_caps() {
        let config = ScatterConfig::default();
        let surface = flat();
        let sampler = ScatterSampler::new(&config, &surface);

        let fp = BrushFootprint::new(Vec2::ZERO, 5.0);
        // ceil(1.5 * 25π / 4)
        assert_eq!(sampler.attempt_count(&fp, 2.0), 30);
        assert!(sampler.attempt_count(&fp, 1.0) > sampler.attempt_count(&fp, 2.0));

        let huge = BrushFootprint::new(Vec2::ZERO, 500.0);
        assert_eq!(sampler.attempt_count(&huge, 0.5), 256);
        assert_eq!(sampler.attempt_count(&fp, 0.0), 256);

        let tiny = BrushFootprint::new(Vec2::ZERO, 0.01);
        assert_eq!(sampler.attempt_count(&tiny, 2.0), 1);

        assert_eq!(
            sampler.attempt_count(&BrushFootprint::new(Vec2::ZERO, 0.0), 1.0),
            0
        );
        assert_eq!(
            sampler.attempt_count(&BrushFootprint::new(Vec2::ZERO, -3.0), 1.0),
            0
        );
    }

    #[test]
    fn accepted_candidates_respect_shape_terrain_and_spacing() {
        let config = ScatterConfig::default();
        let surface = flat();
        let sampler = ScatterSampler::new(&config, &surface);
        let pool = pool();

        let half_disc = BrushShape::custom(|offset, radius| {
            offset.x >= 0.0 && offset.length_squared() <= radius * radius
        });
        for shape in [
            BrushShape::Circle,
            BrushShape::Square,
            BrushShape::Diamond,
            half_disc,
        ] {
            let fp = BrushFootprint::with_shape(Vec2::new(10.0, -5.0), 8.0, shape.clone());
            let mut grid = PlacementDensityGrid::new(1.5);
            let mut rng = StdRng::seed_from_u64(17);
            let tick = run(&sampler, &fp, &pool, false, &mut grid, &mut rng);

            assert!(!tick.instances.is_empty());
            assert_eq!(
                tick.instances.len() + tick.rejections.total(),
                tick.attempts
            );
            for inst in &tick.instances {
                assert!(fp.contains(inst.xz()), "{shape:?} placed outside");
                assert!(surface.height_at(inst.position.x, inst.position.z).is_ok());
                assert!(pool.contains(&inst.asset));
                assert!((0.0..TAU).contains(&inst.rotation_y));
                assert!(inst.scale >= 0.85 && inst.scale <= 1.15);
            }
            let pts: Vec<Vec2> = tick.instances.iter().map(|i| i.xz()).collect();
            assert!(pairwise_min_distance(&pts) >= 1.5 - 1e-4);
        }
    }

    #[test]
    fn additive_places_on_top_of_each_other() {
        let config = ScatterConfig::default();
        let surface = flat();
        let sampler = ScatterSampler::new(&config, &surface);
        let pool = pool();
        let fp = BrushFootprint::with_shape(Vec2::new(1.0, 1.0), 0.01, BrushShape::Square);

        let mut rng = StdRng::seed_from_u64(2);
        let mut grid = PlacementDensityGrid::new(2.0);
        let mut additive = Vec::new();
        for _ in 0..5 {
            additive.extend(run(&sampler, &fp, &pool, true, &mut grid, &mut rng).instances);
        }
        assert_eq!(additive.len(), 5);
        assert!(grid.is_empty());
        let pts: Vec<Vec2> = additive.iter().map(|i| i.xz()).collect();
        assert!(pairwise_min_distance(&pts) < 0.05);

        let mut spaced = Vec::new();
        for _ in 0..5 {
            spaced.extend(run(&sampler, &fp, &pool, false, &mut grid, &mut rng).instances);
        }
        assert_eq!(spaced.len(), 1);
    }

    #[test]
    fn off_terrain_footprint_places_nothing() {
        let config = ScatterConfig::default();
        let surface = flat();
        let sampler = ScatterSampler::new(&config, &surface);
        let pool = pool();
        let fp = BrushFootprint::new(Vec2::new(1000.0, 1000.0), 5.0);

        let mut grid = PlacementDensityGrid::new(2.0);
        let mut rng = StdRng::seed_from_u64(8);
        let mut sink = VecSink::new();
        let params = TickParams {
            stroke_id: 4,
            footprint: &fp,
            selector: AssetSelector::uniform(&pool),
            additive: false,
        };
        let tick = sampler.sample(&params, &mut grid, &mut rng, &mut sink);

        assert!(tick.instances.is_empty());
        assert!(tick.rejections.off_terrain > 0);
        assert_eq!(tick.rejections.too_close, 0);
        assert_eq!(sink.count(BrushEventKind::CandidateRejected), tick.attempts);
        assert!(grid.is_empty());
    }

    #[test]
    fn empty_pool_records_no_points() {
        let config = ScatterConfig::default();
        let surface = flat();
        let sampler = ScatterSampler::new(&config, &surface);
        let empty = AssetPool::new();
        let fp = BrushFootprint::new(Vec2::ZERO, 5.0);

        let mut grid = PlacementDensityGrid::new(2.0);
        let mut rng = StdRng::seed_from_u64(12);
        let tick = run(&sampler, &fp, &empty, false, &mut grid, &mut rng);

        assert!(tick.instances.is_empty());
        assert!(grid.is_empty());
    }

    #[test]
    fn steep_terrain_is_rejected_by_slope_limit() {
        // 45 degree ramp.
        let surface =
            Heightfield::from_fn(Vec2::new(-20.0, -20.0), 1.0, 41, 41, |x, _| x).unwrap();
        let config = ScatterConfig::default()
            .with_constraints(SurfaceConstraints::new().with_max_slope_degrees(30.0));
        let sampler = ScatterSampler::new(&config, &surface);
        let pool = pool();
        let fp = BrushFootprint::new(Vec2::ZERO, 6.0);

        let mut grid = PlacementDensityGrid::new(1.0);
        let mut rng = StdRng::seed_from_u64(1);
        let tick = run(&sampler, &fp, &pool, false, &mut grid, &mut rng);
        assert!(tick.instances.is_empty());
        assert!(tick.rejections.invalid_surface > 0);
    }

    #[test]
    fn instances_sit_on_the_surface_and_carry_its_normal() {
        let surface =
            Heightfield::from_fn(Vec2::new(-20.0, -20.0), 1.0, 41, 41, |x, _| 0.5 * x).unwrap();
        let config = ScatterConfig::default().with_align_to_surface(true);
        let sampler = ScatterSampler::new(&config, &surface);
        let pool = pool();
        let fp = BrushFootprint::new(Vec2::ZERO, 6.0);

        let mut grid = PlacementDensityGrid::new(1.0);
        let mut rng = StdRng::seed_from_u64(9);
        let tick = run(&sampler, &fp, &pool, false, &mut grid, &mut rng);
        assert!(!tick.instances.is_empty());
        let expected = Vec3::new(-0.5, 1.0, 0.0).normalize();
        for inst in &tick.instances {
            assert!((inst.position.y - 0.5 * inst.position.x).abs() < 1e-4);
            assert!((inst.surface_normal - expected).length() < 1e-4);
            assert!(inst.align_to_surface);
        }
    }

    struct EastOnly;

    impl CandidateFilter for EastOnly {
        fn accepts(&self, position: Vec3, _normal: Vec3) -> bool {
            position.x >= 0.0
        }
    }

    #[test]
    fn custom_filters_are_applied() {
        let config = ScatterConfig::default();
        let surface = flat();
        let filters: Vec<Box<dyn CandidateFilter>> = vec![Box::new(EastOnly)];
        let sampler = ScatterSampler::new(&config, &surface).with_filters(&filters);
        let pool = pool();
        let fp = BrushFootprint::new(Vec2::ZERO, 10.0);

        let mut grid = PlacementDensityGrid::new(1.0);
        let mut rng = StdRng::seed_from_u64(21);
        let tick = run(&sampler, &fp, &pool, false, &mut grid, &mut rng);
        assert!(!tick.instances.is_empty());
        assert!(tick.instances.iter().all(|i| i.position.x >= 0.0));
        assert!(tick.rejections.invalid_surface > 0);
    }

    #[test]
    fn same_seed_reproduces_tick() {
        let config = ScatterConfig::default();
        let surface = flat();
        let sampler = ScatterSampler::new(&config, &surface);
        let pool = pool();
        let fp = BrushFootprint::new(Vec2::new(3.0, 3.0), 6.0);

        let mut a = StdRng::seed_from_u64(77);
        let mut b = StdRng::seed_from_u64(77);
        let ta = run(
            &sampler,
            &fp,
            &pool,
            false,
            &mut PlacementDensityGrid::new(1.0),
            &mut a,
        );
        let tb = run(
            &sampler,
            &fp,
            &pool,
            false,
            &mut PlacementDensityGrid::new(1.0),
            &mut b,
        );
        assert_eq!(ta.instances, tb.instances);
    }

    #[test]
    fn config_validation() {
        assert!(ScatterConfig::default().validate().is_ok());
        assert!(ScatterConfig::default()
            .with_attempts_per_cell(0.0)
            .validate()
            .is_err());
        assert!(ScatterConfig::default()
            .with_max_attempts_per_tick(0)
            .validate()
            .is_err());
        assert!(ScatterConfig::default()
            .with_scale_jitter(ScaleJitter::new(2.0, 1.0))
            .validate()
            .is_err());
    }
}
