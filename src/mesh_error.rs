//! MeshAnnotateError: Unified error type for mesh-annotate public APIs
//!
//! Expected conditions (no active layer, empty selection, loop ambiguity)
//! surface here as values. Integrity repairs on persisted data never do:
//! they are corrected silently by the sync pipeline.

use thiserror::Error;

use crate::layers::layer::LayerId;
use crate::topology::element::ElementType;

/// Unified error type for mesh-annotate operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MeshAnnotateError {
    /// The catalog for this element type has no layers, so nothing is active.
    #[error("no active {0} layer")]
    NoActiveLayer(ElementType),
    /// A layer id that is not (or no longer) present in the catalog.
    #[error("unknown {element_type} layer id {id}")]
    UnknownLayer {
        element_type: ElementType,
        id: LayerId,
    },
    /// A catalog position outside `0..len`.
    #[error("layer index {index} out of range for {len} {element_type} layer(s)")]
    LayerIndexOutOfRange {
        element_type: ElementType,
        index: usize,
        len: usize,
    },
    /// The id counter of this element type reached the largest layer id.
    #[error("no {0} layer ids left to allocate")]
    LayerIdsExhausted(ElementType),
    /// The operation resolved to zero target elements.
    #[error("no {0} elements to operate on")]
    EmptyTarget(ElementType),
    /// Host mesh construction rejected its input.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
    /// An assignment mapping violates a structural invariant.
    #[error("invalid assignment mapping: {0}")]
    InvalidAssignment(String),
    /// A layer catalog violates a structural invariant.
    #[error("invalid layer catalog: {0}")]
    InvalidCatalog(String),
    /// Settings could not be serialized or deserialized.
    #[error("settings serialization failed: {0}")]
    Settings(String),
    /// Loop inference failed.
    #[error(transparent)]
    Loop(#[from] LoopError),
}

/// Failures reported by the loop resolvers.
///
/// `NoLoop` and `Ambiguous` are kept apart so callers can tell "nothing
/// matched" from "more than one thing matched".
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoopError {
    #[error("select at least {required} {element_type} element(s) (found {found})")]
    TooFewSelected {
        element_type: ElementType,
        required: usize,
        found: usize,
    },
    #[error("no loop covers the full selection")]
    NoLoop,
    #[error("ambiguous selection: {candidates} loops cover it")]
    Ambiguous { candidates: usize },
    #[error("selection spans multiple loops")]
    SpansMultipleLoops,
    #[error("no single path or ring passes through every selected vertex")]
    NoPath,
    #[error("loop select unavailable: {0}")]
    ContextUnavailable(String),
}
