//! Stroke lifecycle: begin, append per tick, then commit or abort.
//!
//! A [`PlacementStroke`] owns everything that lives for exactly one press-drag-release
//! gesture: the [`PlacementDensityGrid`] that enforces spacing across ticks, the
//! stroke's random sequence, and the scene handles of every instance it created.
//! Grid points whose instance the scene refuses are released again, so the grid only
//! holds points of instances the stroke owns.
//!
//! ```text
//! Idle --begin--> Active --commit--> Committed
//!                   |
//!                   +-----abort----> Aborted
//! ```
//! Calling an operation outside its source state yields [`Error::InvalidState`].
use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::placement::events::{BrushEvent, BrushEventKind, EventSink};
use crate::placement::grid::PlacementDensityGrid;
use crate::placement::history::{Scene, SceneHandle, StrokeEntry, UndoHistory};
use crate::placement::sampler::{ScatterSampler, TickParams, TickSample};
use crate::placement::PlacedInstance;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokeState {
    Idle,
    Active,
    Committed,
    Aborted,
}

#[derive(Debug)]
pub struct PlacementStroke {
    id: u64,
    state: StrokeState,
    grid: PlacementDensityGrid,
    rng: StdRng,
    placements: Vec<(SceneHandle, PlacedInstance)>,
    // Grid points recorded by the latest spaced tick and not yet appended.
    pending: Vec<Vec2>,
}

impl PlacementStroke {
    /// Create an idle stroke whose random sequence derives from `base_seed` and `id`.
    pub fn new(id: u64, base_seed: u64) -> Self {
        Self {
            id,
            state: StrokeState::Idle,
            grid: PlacementDensityGrid::default(),
            rng: StdRng::seed_from_u64(seed_for_stroke(base_seed, id)),
            placements: Vec::new(),
            pending: Vec::new(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn state(&self) -> StrokeState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == StrokeState::Active
    }

    /// Number of instances currently owned by the stroke.
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    pub fn instances(&self) -> impl Iterator<Item = &PlacedInstance> + '_ {
        self.placements.iter().map(|(_, i)| i)
    }

    pub fn handles(&self) -> impl Iterator<Item = SceneHandle> + '_ {
        self.placements.iter().map(|(h, _)| *h)
    }

    pub fn grid(&self) -> &PlacementDensityGrid {
        &self.grid
    }

    fn expect_state(&self, expected: StrokeState, operation: &'static str) -> Result<()> {
        if self.state != expected {
            return Err(Error::InvalidState {
                operation,
                state: self.state,
            });
        }
        Ok(())
    }

    /// Reset the grid for `min_spacing` and start accepting ticks.
    pub fn begin(&mut self, min_spacing: f32) -> Result<()> {
        self.expect_state(StrokeState::Idle, "begin")?;
        self.grid.reset(min_spacing);
        self.state = StrokeState::Active;
        debug!(
            "Stroke {} started with min spacing {:.3}.",
            self.id, min_spacing
        );
        Ok(())
    }

    /// Change the spacing of an active stroke, keeping already accepted points.
    pub fn set_min_spacing(&mut self, min_spacing: f32) -> Result<()> {
        self.expect_state(StrokeState::Active, "respace")?;
        if self.grid.min_spacing() != min_spacing {
            debug!(
                "Stroke {}: min spacing {:.3} -> {:.3}.",
                self.id,
                self.grid.min_spacing(),
                min_spacing
            );
            self.grid.respace(min_spacing);
        }
        Ok(())
    }

    /// Sample one tick against this stroke's grid and random sequence.
    pub fn sample_tick(
        &mut self,
        sampler: &ScatterSampler<'_>,
        params: &TickParams<'_>,
        sink: &mut dyn EventSink,
    ) -> Result<TickSample> {
        self.expect_state(StrokeState::Active, "sample")?;
        self.pending.clear();
        let sample = sampler.sample(params, &mut self.grid, &mut self.rng, sink);
        if !params.additive {
            self.pending.extend(sample.instances.iter().map(PlacedInstance::xz));
        }
        Ok(sample)
    }

    /// Instantiate `instances` in `scene` and take ownership of the handles.
    ///
    /// Instances the scene fails to create are skipped with a warning and their grid
    /// points from the latest tick are released. Returns the number of instances that
    /// reached the scene.
    pub fn append(
        &mut self,
        instances: Vec<PlacedInstance>,
        scene: &mut dyn Scene,
        sink: &mut dyn EventSink,
    ) -> Result<usize> {
        self.expect_state(StrokeState::Active, "append")?;
        let mut placed = 0;
        for instance in instances {
            match scene.instantiate(&instance) {
                Ok(handle) => {
                    if sink.wants(BrushEventKind::InstancePlaced) {
                        sink.send(BrushEvent::InstancePlaced {
                            stroke_id: self.id,
                            handle,
                            instance: instance.clone(),
                        });
                    }
                    self.placements.push((handle, instance));
                    placed += 1;
                }
                Err(e) => {
                    warn!(
                        "Stroke {}: failed to instantiate '{}': {}.",
                        self.id, instance.asset, e
                    );
                    self.release(instance.xz());
                    if sink.wants(BrushEventKind::Warning) {
                        sink.send(BrushEvent::Warning {
                            context: format!("stroke {}", self.id),
                            message: format!("failed to instantiate '{}': {}", instance.asset, e),
                        });
                    }
                }
            }
        }
        self.pending.clear();
        Ok(placed)
    }

    fn release(&mut self, point: Vec2) {
        if let Some(index) = self.pending.iter().position(|p| *p == point) {
            self.pending.swap_remove(index);
            self.grid.remove(point);
        }
    }

    /// Hand all placements to `history` as a single entry.
    ///
    /// An empty stroke commits without recording anything. Returns the number of
    /// instances in the entry.
    pub fn commit(&mut self, history: &mut dyn UndoHistory) -> Result<usize> {
        self.expect_state(StrokeState::Active, "commit")?;
        let count = self.placements.len();
        if count > 0 {
            let placements = std::mem::take(&mut self.placements);
            history.record(StrokeEntry::new(self.id, placements));
        }
        self.grid = PlacementDensityGrid::default();
        self.pending.clear();
        self.state = StrokeState::Committed;
        info!("Stroke {} committed | instances: {}.", self.id, count);
        Ok(count)
    }

    /// Remove every instance this stroke created and discard its grid.
    ///
    /// Objects that existed before the stroke are never touched. Returns the number
    /// of removed objects.
    pub fn abort(&mut self, scene: &mut dyn Scene) -> Result<usize> {
        self.expect_state(StrokeState::Active, "abort")?;
        let mut removed = 0;
        for (handle, instance) in self.placements.drain(..).rev() {
            match scene.remove(handle) {
                Ok(()) => removed += 1,
                Err(e) => warn!(
                    "Stroke {}: failed to remove '{}' ({:?}): {}.",
                    self.id, instance.asset, handle, e
                ),
            }
        }
        self.grid = PlacementDensityGrid::default();
        self.pending.clear();
        self.state = StrokeState::Aborted;
        info!("Stroke {} aborted | removed: {}.", self.id, removed);
        Ok(removed)
    }
}

/// Derive the seed of stroke `stroke_id` from a tool's base seed.
///
/// Strokes with different ids draw independent sequences; the same pair always
/// reproduces the same sequence.
pub fn seed_for_stroke(base_seed: u64, stroke_id: u64) -> u64 {
    mix_u64(base_seed ^ stroke_id.wrapping_mul(0x9E3779B97F4A7C15))
}

#[inline]
fn mix_u64(mut x: u64) -> u64 {
    x ^= x >> 30;
    x = x.wrapping_mul(0xBF58476D1CE4E5B9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94D049BB133111EB);
    x ^ (x >> 31)
}
