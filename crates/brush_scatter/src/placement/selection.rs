//! Asset selection for accepted candidates.
//!
//! [`AssetSelector`] draws one [`AssetRef`] per accepted candidate from an
//! [`AssetPool`] using the stroke's random sequence, so a fixed seed reproduces the
//! same assets while separate strokes draw independently.
//! - [`SelectionPolicy::Uniform`]: every asset is equally likely.
//! - [`SelectionPolicy::Weighted`]: draws proportionally to [`AssetRef::weight`].
use rand::RngCore;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::placement::pool::{AssetPool, AssetRef};
use crate::placement::rand01;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SelectionPolicy {
    #[default]
    Uniform,
    Weighted,
}

#[derive(Debug, Clone, Copy)]
pub struct AssetSelector<'a> {
    pool: &'a AssetPool,
    policy: SelectionPolicy,
}

impl<'a> AssetSelector<'a> {
    pub fn new(pool: &'a AssetPool, policy: SelectionPolicy) -> Self {
        Self { pool, policy }
    }

    pub fn uniform(pool: &'a AssetPool) -> Self {
        Self::new(pool, SelectionPolicy::Uniform)
    }

    pub fn policy(&self) -> SelectionPolicy {
        self.policy
    }

    /// Draw the next asset.
    pub fn next(&self, rng: &mut dyn RngCore) -> Result<&'a AssetRef> {
        let assets = self.pool.as_slice();
        if assets.is_empty() {
            return Err(Error::EmptyAssetPool);
        }
        let picked = match self.policy {
            SelectionPolicy::Uniform => pick_uniform(assets, rng),
            SelectionPolicy::Weighted => {
                pick_weighted(assets, rng).unwrap_or_else(|| pick_uniform(assets, rng))
            }
        };
        Ok(picked)
    }
}

fn pick_uniform<'a>(assets: &'a [AssetRef], rng: &mut dyn RngCore) -> &'a AssetRef {
    let idx = ((rand01(rng) * assets.len() as f32) as usize).min(assets.len() - 1);
    &assets[idx]
}

/// Returns `None` when no asset has a positive weight.
fn pick_weighted<'a>(assets: &'a [AssetRef], rng: &mut dyn RngCore) -> Option<&'a AssetRef> {
    let total_weight: f32 = assets
        .iter()
        .filter(|a| a.weight > 0.0 && a.weight.is_finite())
        .map(|a| a.weight)
        .sum();
    if total_weight <= 0.0 {
        return None;
    }

    let mut roll = rand01(rng) * total_weight;
    let mut last = None;
    for a in assets
        .iter()
        .filter(|a| a.weight > 0.0 && a.weight.is_finite())
    {
        roll -= a.weight;
        last = Some(a);
        if roll < 0.0 {
            return Some(a);
        }
    }

    last
}
