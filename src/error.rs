//! Error types for merge tree computation.

use crate::types::TreeType;
use std::fmt;

/// Errors that can occur when setting up or running a tree computation.
#[derive(Debug, Clone)]
pub enum TreeError {
    /// The requested tree type cannot be built directly.
    /// Contour trees are assembled by a downstream caller from a join tree
    /// and a split tree.
    UnsupportedTreeType(TreeType),

    /// The supplied vertex order is not a permutation of `0..len`.
    /// This indicates a broken caller-side sort or tie-break.
    InvalidOrder { len: usize, message: String },
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeError::UnsupportedTreeType(t) => {
                write!(f, "cannot build a {} tree directly", t)
            }
            TreeError::InvalidOrder { len, message } => {
                write!(f, "invalid vertex order over {} vertices: {}", len, message)
            }
        }
    }
}

impl std::error::Error for TreeError {}
