//! Asset pools and the selection set an editor builds before applying it to the brush.
//!
//! An [`AssetPool`] is the ordered collection of model assets a placement tick may
//! draw from. The host edits an [`AssetSelection`] (toggle, clear, search by name)
//! and hands the result to the tool with a single synchronous call once the user
//! confirms, so no UI callback type ever reaches the placement code.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::placement::AssetId;

/// A reference to a placeable asset and its relative selection weight.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct AssetRef {
    pub id: AssetId,
    /// Relative weight used by [`crate::placement::selection::SelectionPolicy::Weighted`].
    pub weight: f32,
}

impl AssetRef {
    pub fn new(id: impl Into<AssetId>) -> Self {
        Self::weighted(id, 1.0)
    }

    pub fn weighted(id: impl Into<AssetId>, weight: f32) -> Self {
        Self {
            id: id.into(),
            weight,
        }
    }
}

/// Ordered collection of assets available to a placement tick.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetPool {
    assets: Vec<AssetRef>,
}

impl AssetPool {
    pub fn new() -> Self {
        Self { assets: Vec::new() }
    }

    /// Build a pool of equally weighted assets.
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<AssetId>,
    {
        Self {
            assets: ids.into_iter().map(AssetRef::new).collect(),
        }
    }

    pub fn with_asset(mut self, id: impl Into<AssetId>) -> Self {
        self.assets.push(AssetRef::new(id));
        self
    }

    pub fn with_weighted_asset(mut self, id: impl Into<AssetId>, weight: f32) -> Self {
        self.assets.push(AssetRef::weighted(id, weight));
        self
    }

    pub fn push(&mut self, asset: AssetRef) {
        self.assets.push(asset);
    }

    pub fn get(&self, index: usize) -> Option<&AssetRef> {
        self.assets.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AssetRef> {
        self.assets.iter()
    }

    pub fn as_slice(&self) -> &[AssetRef] {
        &self.assets
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.assets.iter().any(|a| a.id == id)
    }
}

impl<S: Into<AssetId>> FromIterator<S> for AssetPool {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self::from_ids(iter)
    }
}

/// The set of assets currently selected in the editor, in selection order.
#[derive(Debug, Clone, Default)]
pub struct AssetSelection {
    selected: Vec<AssetId>,
}

impl AssetSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the selection state of `id`, returning whether it is now selected.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.deselect(id) {
            false
        } else {
            self.selected.push(id.to_owned());
            true
        }
    }

    /// Select `id`, returning `false` if it already was.
    pub fn select(&mut self, id: impl Into<AssetId>) -> bool {
        let id = id.into();
        if self.is_selected(&id) {
            return false;
        }
        self.selected.push(id);
        true
    }

    /// Deselect `id`, returning whether it was selected.
    pub fn deselect(&mut self, id: &str) -> bool {
        let before = self.selected.len();
        self.selected.retain(|s| s != id);
        self.selected.len() != before
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.iter().any(|s| s == id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Snapshot the selection as an equally weighted pool.
    pub fn to_pool(&self) -> AssetPool {
        AssetPool::from_ids(self.selected.iter().cloned())
    }
}

/// Case-insensitive substring search over asset names. An empty query matches all.
pub fn filter_by_name<'a, I>(ids: I, query: &str) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let needle = query.trim().to_lowercase();
    ids.into_iter()
        .filter(|id| needle.is_empty() || id.to_lowercase().contains(&needle))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_builders_preserve_order_and_weights() {
        let pool = AssetPool::new()
            .with_asset("oak")
            .with_weighted_asset("pine", 3.0);
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.get(0).unwrap().id, "oak");
        assert_eq!(pool.get(0).unwrap().weight, 1.0);
        assert_eq!(pool.get(1).unwrap().weight, 3.0);
        assert!(pool.contains("pine"));
        assert!(!pool.contains("birch"));

        let collected: AssetPool = ["a", "b", "c"].into_iter().collect();
        assert_eq!(
            collected.iter().map(|a| a.id.as_str()).collect::<Vec<_>>(),
            vec!["a", "b", "c"]
        );
    }

    #[test]
    fn selection_toggles_and_clears() {
        let mut sel = AssetSelection::new();
        assert!(sel.toggle("rock"));
        assert!(sel.toggle("bush"));
        assert!(sel.is_selected("rock"));
        assert!(!sel.toggle("rock"));
        assert!(!sel.is_selected("rock"));
        assert_eq!(sel.len(), 1);

        assert!(!sel.select("bush"));
        assert!(sel.select("fern"));
        assert_eq!(
            sel.to_pool().iter().map(|a| a.id.clone()).collect::<Vec<_>>(),
            vec!["bush".to_string(), "fern".to_string()]
        );

        sel.clear();
        assert!(sel.is_empty());
        assert!(sel.to_pool().is_empty());
    }

    #[test]
    fn name_filter_is_case_insensitive() {
        let names = ["Oak_Large", "oak_small", "Pine", "Rock01"];
        assert_eq!(
            filter_by_name(names.iter().copied(), "OAK"),
            vec!["Oak_Large", "oak_small"]
        );
        assert_eq!(filter_by_name(names.iter().copied(), "").len(), 4);
        assert!(filter_by_name(names.iter().copied(), "birch").is_empty());
    }
}
