//! Scene and undo-history collaborators.
//!
//! The placement core never owns scene objects. It asks a [`Scene`] to instantiate
//! each [`PlacedInstance`] and remembers the returned [`SceneHandle`]s. A committed
//! stroke becomes one [`StrokeEntry`] handed to an [`UndoHistory`]; undoing the entry
//! removes every instance of the stroke, redoing it instantiates them again at their
//! original transforms.
//!
//! [`MemoryScene`] and [`PlacementHistory`] are in-memory implementations for hosts
//! without their own scene graph and for tests.
use std::collections::BTreeMap;

use tracing::warn;

use crate::error::{Error, Result};
use crate::placement::PlacedInstance;

/// Opaque handle to an object created by a [`Scene`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SceneHandle(pub u64);

/// Scene collaborator that materializes placements.
pub trait Scene {
    fn instantiate(&mut self, instance: &PlacedInstance) -> Result<SceneHandle>;

    fn remove(&mut self, handle: SceneHandle) -> Result<()>;
}

/// Undo-history collaborator receiving committed strokes.
pub trait UndoHistory {
    fn record(&mut self, entry: StrokeEntry);
}

/// All placements of one committed stroke, undone and redone as a unit.
///
/// Each placement keeps its handle only while the scene holds it. Undo removes live
/// placements and redo re-instantiates the others, so a refused removal or
/// instantiation never duplicates an instance or reuses a stale handle.
#[derive(Debug, Clone)]
pub struct StrokeEntry {
    stroke_id: u64,
    placements: Vec<(Option<SceneHandle>, PlacedInstance)>,
}

impl StrokeEntry {
    pub fn new(stroke_id: u64, placements: Vec<(SceneHandle, PlacedInstance)>) -> Self {
        Self {
            stroke_id,
            placements: placements
                .into_iter()
                .map(|(handle, instance)| (Some(handle), instance))
                .collect(),
        }
    }

    pub fn stroke_id(&self) -> u64 {
        self.stroke_id
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Number of placements currently in the scene.
    pub fn live(&self) -> usize {
        self.placements.iter().filter(|(h, _)| h.is_some()).count()
    }

    /// Handles of the placements currently in the scene, in placement order.
    pub fn handles(&self) -> impl Iterator<Item = SceneHandle> + '_ {
        self.placements.iter().filter_map(|(h, _)| *h)
    }

    /// Recorded placements, in placement order.
    pub fn instances(&self) -> impl Iterator<Item = &PlacedInstance> + '_ {
        self.placements.iter().map(|(_, i)| i)
    }

    /// Remove every live instance of the stroke from `scene`, newest first.
    ///
    /// Returns how many removals the scene accepted.
    pub fn undo(&mut self, scene: &mut dyn Scene) -> usize {
        let mut removed = 0;
        for (slot, instance) in self.placements.iter_mut().rev() {
            let Some(handle) = *slot else {
                continue;
            };
            match scene.remove(handle) {
                Ok(()) => {
                    *slot = None;
                    removed += 1;
                }
                Err(e) => warn!(
                    "Stroke {}: failed to remove '{}' ({:?}) on undo: {}.",
                    self.stroke_id, instance.asset, handle, e
                ),
            }
        }
        removed
    }

    /// Instantiate every placement that is not in the scene.
    ///
    /// Returns how many instances the scene accepted.
    pub fn redo(&mut self, scene: &mut dyn Scene) -> usize {
        let mut restored = 0;
        for (slot, instance) in self.placements.iter_mut() {
            if slot.is_some() {
                continue;
            }
            match scene.instantiate(instance) {
                Ok(h) => {
                    *slot = Some(h);
                    restored += 1;
                }
                Err(e) => warn!(
                    "Stroke {}: failed to re-instantiate '{}' on redo: {}.",
                    self.stroke_id, instance.asset, e
                ),
            }
        }
        restored
    }
}

/// Ordered in-memory scene.
#[derive(Debug, Default)]
pub struct MemoryScene {
    objects: BTreeMap<SceneHandle, PlacedInstance>,
    next_handle: u64,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get(&self, handle: SceneHandle) -> Option<&PlacedInstance> {
        self.objects.get(&handle)
    }

    pub fn contains(&self, handle: SceneHandle) -> bool {
        self.objects.contains_key(&handle)
    }

    /// Objects in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (SceneHandle, &PlacedInstance)> + '_ {
        self.objects.iter().map(|(h, i)| (*h, i))
    }

    pub fn instances(&self) -> impl Iterator<Item = &PlacedInstance> + '_ {
        self.objects.values()
    }
}

impl Scene for MemoryScene {
    fn instantiate(&mut self, instance: &PlacedInstance) -> Result<SceneHandle> {
        let handle = SceneHandle(self.next_handle);
        self.next_handle += 1;
        self.objects.insert(handle, instance.clone());
        Ok(handle)
    }

    fn remove(&mut self, handle: SceneHandle) -> Result<()> {
        self.objects
            .remove(&handle)
            .map(|_| ())
            .ok_or_else(|| Error::Scene(format!("unknown handle {}", handle.0)))
    }
}

/// Linear undo/redo stacks of committed strokes.
#[derive(Debug, Default)]
pub struct PlacementHistory {
    undo_stack: Vec<StrokeEntry>,
    redo_stack: Vec<StrokeEntry>,
}

impl PlacementHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Undo the newest stroke. Returns the number of removed instances.
    pub fn undo(&mut self, scene: &mut dyn Scene) -> Option<usize> {
        let mut entry = self.undo_stack.pop()?;
        let removed = entry.undo(scene);
        self.redo_stack.push(entry);
        Some(removed)
    }

    /// Redo the most recently undone stroke. Returns the number of restored instances.
    pub fn redo(&mut self, scene: &mut dyn Scene) -> Option<usize> {
        let mut entry = self.redo_stack.pop()?;
        let restored = entry.redo(scene);
        self.undo_stack.push(entry);
        Some(restored)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of entries that can be undone.
    pub fn len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.undo_stack.is_empty()
    }

    /// Newest undoable entry.
    pub fn last(&self) -> Option<&StrokeEntry> {
        self.undo_stack.last()
    }
}

impl UndoHistory for PlacementHistory {
    fn record(&mut self, entry: StrokeEntry) {
        self.redo_stack.clear();
        self.undo_stack.push(entry);
    }
}
