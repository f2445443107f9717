//! Error types for mate creation and assembly editing.
//!
//! Only structural problems are reported through [`MateError`]. Solving never
//! fails with an error; its outcome is always described by a
//! [`SolveResult`](crate::solver::SolveResult).

use crate::ids::{ComponentId, MateId};
use crate::mates::types::MateType;
use thiserror::Error;

/// Errors raised while building or editing the mate graph.
#[derive(Debug, Error)]
pub enum MateError {
    #[error("Mate references must point at different components (both reference '{0}')")]
    SameComponent(ComponentId),

    #[error("{mate_type} mate requires parameter '{key}'")]
    MissingParameter { mate_type: MateType, key: &'static str },

    #[error("Parameter '{key}' must be a finite number")]
    NonNumericParameter { key: String },

    #[error("Mate reference has an empty {0}")]
    EmptyReference(&'static str),

    #[error("Invalid reference type: {0} (expected face, edge, vertex or axis)")]
    InvalidReferenceType(String),

    #[error("Invalid mate type: {0}")]
    InvalidMateType(String),

    #[error("Mate '{0}' already exists")]
    DuplicateMate(MateId),

    #[error("Mate '{0}' not found")]
    MateNotFound(MateId),

    #[error("Component '{0}' already exists")]
    DuplicateComponent(ComponentId),

    #[error("Component '{0}' not found")]
    UnknownComponent(ComponentId),

    #[error("Component stored under key '{key}' has id '{id}'")]
    ComponentKeyMismatch { key: ComponentId, id: ComponentId },

    #[error("Making '{parent}' the parent of '{child}' would create a cycle")]
    ParentCycle { child: ComponentId, parent: ComponentId },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for mate and assembly operations.
pub type MateResult<T> = Result<T, MateError>;
