#![forbid(unsafe_code)]
//! brush_scatter: Brush-driven model placement for terrain editors.
//!
//! Modules:
//! - brush: footprint, brush shapes, density and its spacing mapping
//! - surface: terrain queries (flat plane, height field) and candidate constraints
//! - placement: candidate sampling, spacing grid, asset selection, strokes, undo history, events
//! - tool: the model-placement brush tool and brush dispatch
//!
//! For examples, see the `brush_scatter_examples` crate.
pub mod brush;
pub mod error;
pub mod placement;
pub mod surface;
pub mod tool;

/// Convenient re-exports for common types. Import with `use brush_scatter::prelude::*;`.
pub mod prelude {
    pub use crate::brush::{BrushFootprint, BrushShape, Density, ShapeMask, SpacingRange};
    pub use crate::error::{Error, Result};
    pub use crate::placement::events::{
        BrushEvent, BrushEventKind, EventSink, FnSink, MultiSink, VecSink,
    };
    pub use crate::placement::grid::PlacementDensityGrid;
    pub use crate::placement::history::{
        MemoryScene, PlacementHistory, Scene, SceneHandle, StrokeEntry, UndoHistory,
    };
    pub use crate::placement::pool::{filter_by_name, AssetPool, AssetRef, AssetSelection};
    pub use crate::placement::sampler::{
        RejectReason, RejectionCounts, ScatterConfig, TickOutcome,
    };
    pub use crate::placement::selection::{AssetSelector, SelectionPolicy};
    pub use crate::placement::stroke::{seed_for_stroke, PlacementStroke, StrokeState};
    pub use crate::placement::{AssetId, PlacedInstance, ScaleJitter};
    pub use crate::surface::{
        CandidateFilter, FlatSurface, Heightfield, SurfaceConstraints, SurfaceSample,
        SurfaceSampler,
    };
    pub use crate::tool::{
        BrushAction, BrushContext, BrushMode, ModelPlacementBrushTool, PlacementConfig,
        TerrainBrush,
    };
}
