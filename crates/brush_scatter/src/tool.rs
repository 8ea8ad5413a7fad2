//! The model-placement brush tool and its host-facing entry points.
//!
//! The host forwards three brush callbacks to [`ModelPlacementBrushTool`]:
//! - [`ModelPlacementBrushTool::on_brush_tick`] for every tick while the brush is down,
//! - [`ModelPlacementBrushTool::on_brush_release`] when the stroke ends normally,
//! - [`ModelPlacementBrushTool::on_brush_cancel`] when the stroke is cancelled
//!   (escape, tool switch).
//!
//! Collaborators are passed per call through a [`BrushContext`]; the tool owns
//! only its configuration, asset pool, filters and the active stroke.
use std::mem;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::brush::{BrushFootprint, Density, SpacingRange};
use crate::error::{Error, Result};
use crate::placement::events::{BrushEvent, BrushEventKind, EventSink};
use crate::placement::history::{Scene, UndoHistory};
use crate::placement::pool::AssetPool;
use crate::placement::sampler::{ScatterConfig, ScatterSampler, TickOutcome, TickParams};
use crate::placement::selection::{AssetSelector, SelectionPolicy};
use crate::placement::stroke::PlacementStroke;
use crate::surface::{CandidateFilter, SurfaceSampler};

/// Configuration of a [`ModelPlacementBrushTool`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementConfig {
    /// Density used by [`BrushAction::act`].
    pub density: Density,
    /// Maps density to the minimum spacing between instances of one stroke.
    pub spacing: SpacingRange,
    /// Additive mode used by [`BrushAction::act`].
    pub additive: bool,
    pub selection: SelectionPolicy,
    pub scatter: ScatterConfig,
    /// Base seed all stroke seeds derive from.
    pub seed: u64,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            density: Density::new(0.5),
            spacing: SpacingRange::default(),
            additive: false,
            selection: SelectionPolicy::Uniform,
            scatter: ScatterConfig::default(),
            seed: 0,
        }
    }
}

impl PlacementConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_density(mut self, density: impl Into<Density>) -> Self {
        self.density = density.into();
        self
    }

    pub fn with_spacing(mut self, spacing: SpacingRange) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn with_additive(mut self, additive: bool) -> Self {
        self.additive = additive;
        self
    }

    pub fn with_selection(mut self, selection: SelectionPolicy) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_scatter(mut self, scatter: ScatterConfig) -> Self {
        self.scatter = scatter;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Minimum spacing for the configured density.
    pub fn min_spacing(&self) -> f32 {
        self.spacing.spacing_for(self.density)
    }

    pub fn validate(&self) -> Result<()> {
        self.spacing.validate()?;
        self.scatter.validate()
    }
}

/// Collaborators handed to the tool for the duration of one callback.
pub struct BrushContext<'a> {
    pub surface: &'a dyn SurfaceSampler,
    pub scene: &'a mut dyn Scene,
    pub history: &'a mut dyn UndoHistory,
    pub events: Option<&'a mut dyn EventSink>,
}

impl<'a> BrushContext<'a> {
    pub fn new(
        surface: &'a dyn SurfaceSampler,
        scene: &'a mut dyn Scene,
        history: &'a mut dyn UndoHistory,
    ) -> Self {
        Self {
            surface,
            scene,
            history,
            events: None,
        }
    }

    pub fn with_events(mut self, events: &'a mut dyn EventSink) -> Self {
        self.events = Some(events);
        self
    }

    fn emit(&mut self, event: BrushEvent) {
        if let Some(sink) = self.events.as_mut() {
            if sink.wants(event.kind()) {
                sink.send(event);
            }
        }
    }
}

/// Brush tool that scatters model instances under the brush footprint.
pub struct ModelPlacementBrushTool {
    config: PlacementConfig,
    asset_pool: AssetPool,
    filters: Vec<Box<dyn CandidateFilter>>,
    stroke: Option<PlacementStroke>,
    next_stroke_id: u64,
}

impl ModelPlacementBrushTool {
    pub fn try_new(config: PlacementConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new_unchecked(config))
    }

    pub fn new(config: PlacementConfig) -> Self {
        debug_assert!(
            config.validate().is_ok(),
            "invalid PlacementConfig: {:?}",
            config.validate().err()
        );
        Self::new_unchecked(config)
    }

    fn new_unchecked(config: PlacementConfig) -> Self {
        Self {
            config,
            asset_pool: AssetPool::new(),
            filters: Vec::new(),
            stroke: None,
            next_stroke_id: 1,
        }
    }

    pub fn with_asset_pool(mut self, pool: AssetPool) -> Self {
        self.asset_pool = pool;
        self
    }

    /// Add a validity filter applied to every candidate after the built-in constraints.
    pub fn with_filter(mut self, filter: impl CandidateFilter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn config(&self) -> &PlacementConfig {
        &self.config
    }

    pub fn asset_pool(&self) -> &AssetPool {
        &self.asset_pool
    }

    /// Replace the pool used by [`BrushAction::act`]. Takes effect on the next tick.
    pub fn set_asset_pool(&mut self, pool: AssetPool) {
        debug!("Asset pool set | assets: {}.", pool.len());
        self.asset_pool = pool;
    }

    pub fn set_density(&mut self, density: impl Into<Density>) {
        self.config.density = density.into();
    }

    pub fn set_additive(&mut self, additive: bool) {
        self.config.additive = additive;
    }

    pub fn is_stroke_active(&self) -> bool {
        self.stroke.as_ref().is_some_and(PlacementStroke::is_active)
    }

    pub fn active_stroke(&self) -> Option<&PlacementStroke> {
        self.stroke.as_ref()
    }

    /// Process one brush tick.
    ///
    /// Starts a stroke if none is active. An empty pool or an empty footprint still
    /// starts the stroke but places nothing.
    pub fn on_brush_tick(
        &mut self,
        footprint: &BrushFootprint,
        density: Density,
        pool: &AssetPool,
        additive: bool,
        ctx: &mut BrushContext<'_>,
    ) -> TickOutcome {
        let request = TickRequest {
            footprint,
            density,
            pool,
            additive,
        };
        let BrushContext {
            surface,
            scene,
            events,
            ..
        } = ctx;
        match events {
            Some(sink) => self.tick(&request, *surface, &mut **scene, &mut **sink),
            None => self.tick(&request, *surface, &mut **scene, &mut ()),
        }
    }

    /// Commit the active stroke to the undo history.
    ///
    /// Returns the number of committed instances, or `None` without an active stroke.
    pub fn on_brush_release(&mut self, ctx: &mut BrushContext<'_>) -> Option<usize> {
        let mut stroke = self.stroke.take()?;
        let count = match stroke.commit(&mut *ctx.history) {
            Ok(count) => count,
            Err(e) => {
                lifecycle_error(stroke.id(), &e);
                return None;
            }
        };
        ctx.emit(BrushEvent::StrokeCommitted {
            stroke_id: stroke.id(),
            instance_count: count,
        });
        Some(count)
    }

    /// Abort the active stroke, removing every instance it created.
    ///
    /// Returns the number of removed instances, or `None` without an active stroke.
    pub fn on_brush_cancel(&mut self, ctx: &mut BrushContext<'_>) -> Option<usize> {
        let mut stroke = self.stroke.take()?;
        let removed = match stroke.abort(&mut *ctx.scene) {
            Ok(removed) => removed,
            Err(e) => {
                lifecycle_error(stroke.id(), &e);
                return None;
            }
        };
        ctx.emit(BrushEvent::StrokeAborted {
            stroke_id: stroke.id(),
            removed,
        });
        Some(removed)
    }

    fn tick(
        &mut self,
        request: &TickRequest<'_>,
        surface: &dyn SurfaceSampler,
        scene: &mut dyn Scene,
        sink: &mut dyn EventSink,
    ) -> TickOutcome {
        let min_spacing = self.config.spacing.spacing_for(request.density);

        if self.stroke.is_none() {
            let stroke = self.begin_stroke(min_spacing, sink);
            self.stroke = stroke;
        }
        let Some(stroke) = self.stroke.as_mut() else {
            return TickOutcome::default();
        };
        let mut outcome = TickOutcome::new(stroke.id());

        if let Err(e) = stroke.set_min_spacing(min_spacing) {
            lifecycle_error(stroke.id(), &e);
            return outcome;
        }

        if request.pool.is_empty() {
            debug!("Stroke {}: {}; tick skipped.", stroke.id(), Error::EmptyAssetPool);
            finish_tick(sink, outcome);
            return outcome;
        }

        let sampler =
            ScatterSampler::new(&self.config.scatter, surface).with_filters(&self.filters);
        let params = TickParams {
            stroke_id: stroke.id(),
            footprint: request.footprint,
            selector: AssetSelector::new(request.pool, self.config.selection),
            additive: request.additive,
        };

        let sample = match stroke.sample_tick(&sampler, &params, sink) {
            Ok(sample) => sample,
            Err(e) => {
                lifecycle_error(stroke.id(), &e);
                return outcome;
            }
        };
        outcome.attempts = sample.attempts;
        outcome.rejections = sample.rejections;

        let accepted = sample.instances.len();
        match stroke.append(sample.instances, scene, sink) {
            Ok(placed) => {
                outcome.placed = placed;
                outcome.skipped = accepted - placed;
            }
            Err(e) => lifecycle_error(stroke.id(), &e),
        }

        debug!(
            "Stroke {} tick at ({:.2}, {:.2}) | attempts: {}, placed: {}, rejected: {}.",
            outcome.stroke_id,
            request.footprint.center.x,
            request.footprint.center.y,
            outcome.attempts,
            outcome.placed,
            outcome.rejections.total()
        );
        finish_tick(sink, outcome);
        outcome
    }

    fn begin_stroke(
        &mut self,
        min_spacing: f32,
        sink: &mut dyn EventSink,
    ) -> Option<PlacementStroke> {
        let id = self.next_stroke_id;
        self.next_stroke_id += 1;

        let mut stroke = PlacementStroke::new(id, self.config.seed);
        if let Err(e) = stroke.begin(min_spacing) {
            lifecycle_error(id, &e);
            return None;
        }
        if sink.wants(BrushEventKind::StrokeStarted) {
            sink.send(BrushEvent::StrokeStarted {
                stroke_id: id,
                min_spacing,
            });
        }
        Some(stroke)
    }
}

struct TickRequest<'a> {
    footprint: &'a BrushFootprint,
    density: Density,
    pool: &'a AssetPool,
    additive: bool,
}

/// Stroke misuse is a bug: fatal in debug builds, logged and ignored in release.
fn lifecycle_error(stroke_id: u64, err: &Error) {
    debug_assert!(
        !matches!(err, Error::InvalidState { .. }),
        "stroke {stroke_id}: {err}"
    );
    warn!("Stroke {}: {}.", stroke_id, err);
}

fn finish_tick(sink: &mut dyn EventSink, outcome: TickOutcome) {
    if sink.wants(BrushEventKind::TickFinished) {
        sink.send(BrushEvent::TickFinished {
            stroke_id: outcome.stroke_id,
            outcome,
        });
    }
}

/// Kinds of terrain brush a host can switch between.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum BrushMode {
    ModelPlacement,
}

/// Uniform brush interface a host dispatches pointer input to.
pub trait BrushAction {
    fn mode(&self) -> BrushMode;

    /// One tick over `footprint`, using the brush's own settings.
    fn act(&mut self, footprint: &BrushFootprint, ctx: &mut BrushContext<'_>);

    fn release(&mut self, ctx: &mut BrushContext<'_>);

    fn cancel(&mut self, ctx: &mut BrushContext<'_>);
}

impl BrushAction for ModelPlacementBrushTool {
    fn mode(&self) -> BrushMode {
        BrushMode::ModelPlacement
    }

    fn act(&mut self, footprint: &BrushFootprint, ctx: &mut BrushContext<'_>) {
        let pool = mem::take(&mut self.asset_pool);
        let (density, additive) = (self.config.density, self.config.additive);
        self.on_brush_tick(footprint, density, &pool, additive, ctx);
        self.asset_pool = pool;
    }

    fn release(&mut self, ctx: &mut BrushContext<'_>) {
        self.on_brush_release(ctx);
    }

    fn cancel(&mut self, ctx: &mut BrushContext<'_>) {
        self.on_brush_cancel(ctx);
    }
}

/// All terrain brushes known to the editor.
#[non_exhaustive]
pub enum TerrainBrush {
    ModelPlacement(ModelPlacementBrushTool),
}

impl TerrainBrush {
    pub fn as_model_placement(&self) -> Option<&ModelPlacementBrushTool> {
        match self {
            TerrainBrush::ModelPlacement(tool) => Some(tool),
        }
    }

    pub fn as_model_placement_mut(&mut self) -> Option<&mut ModelPlacementBrushTool> {
        match self {
            TerrainBrush::ModelPlacement(tool) => Some(tool),
        }
    }

    fn action(&mut self) -> &mut dyn BrushAction {
        match self {
            TerrainBrush::ModelPlacement(tool) => tool,
        }
    }
}

impl From<ModelPlacementBrushTool> for TerrainBrush {
    fn from(tool: ModelPlacementBrushTool) -> Self {
        TerrainBrush::ModelPlacement(tool)
    }
}

impl BrushAction for TerrainBrush {
    fn mode(&self) -> BrushMode {
        match self {
            TerrainBrush::ModelPlacement(tool) => tool.mode(),
        }
    }

    fn act(&mut self, footprint: &BrushFootprint, ctx: &mut BrushContext<'_>) {
        self.action().act(footprint, ctx);
    }

    fn release(&mut self, ctx: &mut BrushContext<'_>) {
        self.action().release(ctx);
    }

    fn cancel(&mut self, ctx: &mut BrushContext<'_>) {
        self.action().cancel(ctx);
    }
}
