//! Event types and sinks for observing brush strokes.
//!
//! This module defines [`BrushEvent`] and a set of sinks and adapters to emit,
//! collect, or forward events while a [`crate::tool::ModelPlacementBrushTool`]
//! processes ticks, releases, and cancels.
use glam::Vec2;

use crate::placement::history::SceneHandle;
use crate::placement::sampler::{RejectReason, TickOutcome};
use crate::placement::PlacedInstance;

/// Describes events emitted during a stroke.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum BrushEvent {
    /// Emitted when a new stroke becomes active.
    StrokeStarted {
        /// Identifier of the stroke.
        stroke_id: u64,
        /// Minimum spacing the stroke's grid was reset with.
        min_spacing: f32,
    },

    /// Emitted for each candidate discarded during a tick.
    CandidateRejected {
        stroke_id: u64,
        /// Candidate position on the `(x, z)` plane.
        position: Vec2,
        reason: RejectReason,
    },

    /// Emitted after the scene instantiated a placement.
    InstancePlaced {
        stroke_id: u64,
        handle: SceneHandle,
        instance: PlacedInstance,
    },

    /// Emitted when a tick finished.
    TickFinished {
        stroke_id: u64,
        outcome: TickOutcome,
    },

    /// Emitted when a stroke was committed to the undo history.
    StrokeCommitted {
        stroke_id: u64,
        /// Number of instances in the recorded entry.
        instance_count: usize,
    },

    /// Emitted when a stroke was aborted and its instances removed.
    StrokeAborted {
        stroke_id: u64,
        /// Number of scene objects removed.
        removed: usize,
    },

    /// Non-fatal warning generated during a stroke.
    Warning {
        /// Context string (e.g. stroke id, asset id).
        context: String,
        /// Human-readable message.
        message: String,
    },
}

/// Discriminant of [`BrushEvent`], used to pre-filter events a sink wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BrushEventKind {
    StrokeStarted,
    CandidateRejected,
    InstancePlaced,
    TickFinished,
    StrokeCommitted,
    StrokeAborted,
    Warning,
}

impl BrushEvent {
    pub fn kind(&self) -> BrushEventKind {
        match self {
            BrushEvent::StrokeStarted { .. } => BrushEventKind::StrokeStarted,
            BrushEvent::CandidateRejected { .. } => BrushEventKind::CandidateRejected,
            BrushEvent::InstancePlaced { .. } => BrushEventKind::InstancePlaced,
            BrushEvent::TickFinished { .. } => BrushEventKind::TickFinished,
            BrushEvent::StrokeCommitted { .. } => BrushEventKind::StrokeCommitted,
            BrushEvent::StrokeAborted { .. } => BrushEventKind::StrokeAborted,
            BrushEvent::Warning { .. } => BrushEventKind::Warning,
        }
    }
}

/// A generic event sink that accepts [`BrushEvent`]s.
pub trait EventSink {
    fn send(&mut self, event: BrushEvent);

    /// Lets emitters skip building events nobody listens to.
    fn wants(&self, _kind: BrushEventKind) -> bool {
        true
    }

    fn send_many<I>(&mut self, events: I)
    where
        Self: Sized,
        I: IntoIterator<Item = BrushEvent>,
    {
        for e in events {
            self.send(e);
        }
    }
}

/// A no-op event sink.
impl EventSink for () {
    #[inline]
    fn send(&mut self, _event: BrushEvent) {}

    #[inline]
    fn wants(&self, _kind: BrushEventKind) -> bool {
        false
    }
}

/// An event sink that forwards to a user-provided closure.
pub struct FnSink<F>
where
    F: FnMut(BrushEvent),
{
    f: F,
}

impl<F> FnSink<F>
where
    F: FnMut(BrushEvent),
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> EventSink for FnSink<F>
where
    F: FnMut(BrushEvent),
{
    #[inline]
    fn send(&mut self, event: BrushEvent) {
        (self.f)(event);
    }
}

/// An event sink that collects events in a `Vec`, optionally restricted to some kinds.
#[derive(Default)]
pub struct VecSink {
    events: Vec<BrushEvent>,
    only: Option<Vec<BrushEventKind>>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect only events of the given kinds.
    pub fn only(kinds: impl IntoIterator<Item = BrushEventKind>) -> Self {
        Self {
            events: Vec::new(),
            only: Some(kinds.into_iter().collect()),
        }
    }

    pub fn into_inner(self) -> Vec<BrushEvent> {
        self.events
    }

    pub fn as_slice(&self) -> &[BrushEvent] {
        &self.events
    }

    pub fn count(&self, kind: BrushEventKind) -> usize {
        self.events.iter().filter(|e| e.kind() == kind).count()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventSink for VecSink {
    #[inline]
    fn send(&mut self, event: BrushEvent) {
        if self.wants(event.kind()) {
            self.events.push(event);
        }
    }

    fn wants(&self, kind: BrushEventKind) -> bool {
        self.only.as_ref().is_none_or(|kinds| kinds.contains(&kind))
    }
}

/// Fan-out sink that forwards each event to all contained sinks.
pub struct MultiSink<S: EventSink> {
    pub(crate) sinks: Vec<S>,
}

impl<S: EventSink> MultiSink<S> {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn with_sinks(sinks: Vec<S>) -> Self {
        Self { sinks }
    }

    pub fn push(&mut self, sink: S) {
        self.sinks.push(sink);
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn into_sinks(self) -> Vec<S> {
        self.sinks
    }
}

impl<S: EventSink> Default for MultiSink<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: EventSink> EventSink for MultiSink<S> {
    fn send(&mut self, event: BrushEvent) {
        let kind = event.kind();
        let targets: Vec<usize> = (0..self.sinks.len())
            .filter(|&i| self.sinks[i].wants(kind))
            .collect();
        let Some((&last, rest)) = targets.split_last() else {
            return;
        };
        for &i in rest {
            self.sinks[i].send(event.clone());
        }
        self.sinks[last].send(event);
    }

    fn wants(&self, kind: BrushEventKind) -> bool {
        self.sinks.iter().any(|s| s.wants(kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn warning(ctx: &str) -> BrushEvent {
        BrushEvent::Warning {
            context: ctx.into(),
            message: "msg".into(),
        }
    }

    fn committed() -> BrushEvent {
        BrushEvent::StrokeCommitted {
            stroke_id: 1,
            instance_count: 3,
        }
    }

    #[test]
    fn vec_sink_collects_events() {
        let mut sink = VecSink::new();
        assert!(sink.is_empty());
        sink.send(warning("a"));
        sink.send(committed());
        assert_eq!(sink.len(), 2);
        assert_eq!(sink.count(BrushEventKind::Warning), 1);
        sink.clear();
        assert!(sink.is_empty());
    }

    #[test]
    fn vec_sink_filters_by_kind() {
        let mut sink = VecSink::only([BrushEventKind::StrokeCommitted]);
        assert!(!sink.wants(BrushEventKind::Warning));
        sink.send(warning("a"));
        sink.send(committed());
        assert_eq!(sink.len(), 1);
        assert!(matches!(
            sink.as_slice()[0],
            BrushEvent::StrokeCommitted { .. }
        ));
    }

    #[test]
    fn unit_sink_wants_nothing() {
        let sink = ();
        assert!(!sink.wants(BrushEventKind::InstancePlaced));
    }

    #[test]
    fn multi_sink_fans_out_to_interested_sinks() {
        let all = VecSink::new();
        let commits = VecSink::only([BrushEventKind::StrokeCommitted]);
        let mut multi = MultiSink::with_sinks(vec![all, commits]);
        multi.send(warning("ctx"));
        multi.send(committed());
        assert_eq!(multi.len(), 2);
        let sinks = multi.into_sinks();
        assert_eq!(sinks[0].len(), 2);
        assert_eq!(sinks[1].len(), 1);
    }

    #[test]
    fn fn_sink_invokes_callback() {
        let mut count = 0;
        let mut sink = FnSink::new(|_event| {
            count += 1;
        });
        sink.send(warning("ctx"));
        sink.send_many([committed(), committed()]);
        assert_eq!(count, 3);
    }
}
