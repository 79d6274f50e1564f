//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! # Overview
//!
//! The main error type [`GroveError`] covers:
//! - Scene graph structure violations (cycles, double parenting, stale handles)
//! - Invalid procedural placement input
//! - External asset load failures
//! - Configuration and parameter errors
//!
//! Graph-structure errors are programming errors: the operation that raised
//! them is rejected as a whole and the scene graph keeps its prior state.
//! Asset load failures are expected at runtime and never stop the frame loop.
//!
//! ```rust,ignore
//! use grove::errors::{GroveError, Result};
//!
//! fn build() -> Result<()> {
//!     // Operations that may fail return Result
//!     Ok(())
//! }
//! ```

use thiserror::Error;

use crate::scene::NodeHandle;

/// The main error type for the crate.
#[derive(Error, Debug)]
pub enum GroveError {
    // ========================================================================
    // Scene Graph Errors
    // ========================================================================
    /// The child is the parent itself or one of its ancestors.
    #[error("Attaching {child:?} under {parent:?} would create a cycle")]
    Cycle {
        parent: NodeHandle,
        child: NodeHandle,
    },

    /// The child already has a parent and must be detached first.
    #[error("Node {child:?} is already attached to {current_parent:?}")]
    DuplicateParent {
        child: NodeHandle,
        current_parent: NodeHandle,
    },

    /// The handle does not refer to a live node.
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeHandle),

    /// The scene root cannot be detached, re-parented or removed.
    #[error("The scene root cannot be {0}")]
    RootImmutable(&'static str),

    // ========================================================================
    // Procedural Placement Errors
    // ========================================================================
    /// Instance count must be a non-negative integer.
    #[error("Invalid instance count: {0}")]
    InvalidCount(i64),

    /// A numeric range was empty, inverted or not finite.
    #[error("Invalid range for {what}: [{min}, {max})")]
    InvalidRange {
        what: &'static str,
        min: f32,
        max: f32,
    },

    // ========================================================================
    // Asset Errors
    // ========================================================================
    /// The external asset loader reported a failure.
    #[error("Asset load failed for '{source_uri}': {reason}")]
    AssetLoad { source_uri: String, reason: String },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration could not be parsed.
    #[error("Config parse error: {0}")]
    Config(#[from] serde_json::Error),

    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parameter binding index out of range.
    #[error("Parameter binding index out of bounds: {0}")]
    BindingOutOfBounds(usize),

    /// The light or material a parameter binding points at was removed.
    #[error("Parameter '{0}' has no live target")]
    BindingTargetGone(String),
}

impl GroveError {
    /// Builds an [`GroveError::AssetLoad`] from any displayable reason.
    pub fn asset_load(source_uri: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::AssetLoad {
            source_uri: source_uri.into(),
            reason: reason.to_string(),
        }
    }

    /// Returns `true` for errors that indicate misuse of the scene graph API.
    #[must_use]
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::Cycle { .. }
                | Self::DuplicateParent { .. }
                | Self::NodeNotFound(_)
                | Self::RootImmutable(_)
        )
    }
}

/// Alias for `Result<T, GroveError>`.
pub type Result<T> = std::result::Result<T, GroveError>;
