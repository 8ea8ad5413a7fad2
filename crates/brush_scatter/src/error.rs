//! Error types and result alias for the crate.
//!
//! This module defines [`enum@crate::error::Error`] and the crate-wide [Result] alias. Variants cover
//! invalid configuration, off-terrain surface queries, empty asset pools, stroke
//! lifecycle misuse, scene collaborator failures, and generic errors.
use thiserror::Error;

use crate::placement::stroke::StrokeState;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The queried coordinate lies outside the sampleable terrain.
    #[error("position ({x}, {z}) is outside the terrain")]
    OutOfBounds { x: f32, z: f32 },

    #[error("asset pool is empty")]
    EmptyAssetPool,

    /// A stroke operation was called in a state that does not allow it.
    #[error("cannot {operation} a stroke in state {state:?}")]
    InvalidState {
        operation: &'static str,
        state: StrokeState,
    },

    #[error("scene error: {0}")]
    Scene(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Returns `true` for outcomes that only mean "skip this candidate".
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::OutOfBounds { .. } | Error::EmptyAssetPool)
    }
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Error::Other(value)
    }
}

impl From<&str> for Error {
    fn from(value: &str) -> Self {
        Error::Other(value.to_owned())
    }
}
