//! # mesh-annotate
//!
//! mesh-annotate tags the vertices, edges and faces of a polygon mesh with
//! named, colored **layers**. An element may carry several layers at once;
//! the one highest in catalog order is its *top* layer and decides how the
//! element is drawn.
//!
//! ## Features
//! - Per-element-type layer catalogs with stable ids, ordering, visibility
//!   and deterministic automatic colors
//! - A persisted sparse assignment mapping plus a per-element cache, kept
//!   consistent by a prune → merge → normalize → mutate → write-back pipeline
//!   that silently repairs stale data after topology edits
//! - Loop inference: expand a sparse face, edge or vertex selection into the
//!   one quad strip, edge loop or vertex path it determines
//! - Overlay batching into per-layer, per-selection draw primitives
//!
//! ## Hosts
//!
//! The library never owns topology. A host mesh editor implements the traits
//! in [`topology::host`]; [`topology::in_memory::InMemoryMesh`] is a complete
//! reference host used by the tests and benchmarks.
//!
//! ## Determinism
//!
//! Automatic layer colors come from a `SmallRng` seeded from
//! [`AnnotationSettings::color_seed`](data::settings::AnnotationSettings) and
//! the id being allocated, so identical edit sequences give identical colors.
//!
//! ## Usage
//!
//! ```
//! use mesh_annotate::prelude::*;
//!
//! let mut settings = AnnotationSettings::new();
//! let mut mesh = InMemoryMesh::grid(4, 4);
//! mesh.set_selected(ElementType::Face, 5, true);
//! mesh.set_selected(ElementType::Face, 7, true);
//!
//! let mut engine = SyncEngine::new(&mut settings, &mut mesh);
//! let id = engine.create_layer(ElementType::Face, Some("rim"), None)?;
//! let resolved = engine.assign_loop(ElementType::Face, id)?;
//! assert_eq!(resolved.elements, vec![4, 5, 6, 7]);
//! assert_eq!(engine.indices_for_layer(ElementType::Face, id), vec![4, 5, 6, 7]);
//! # Ok::<(), MeshAnnotateError>(())
//! ```

pub mod algs;
pub mod data;
pub mod debug_invariants;
pub mod layers;
pub mod mesh_error;
pub mod topology;

pub use debug_invariants::DebugInvariants;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::algs::loops::{ResolvedLoop, resolve_loop, resolve_loop_in_active_mode};
    pub use crate::algs::overlay::{DrawBatch, OverlayBatchBuilder, OverlayFrame, PrimitiveKind};
    pub use crate::algs::sync::{ClearMode, LayerFilter, SyncEngine, Targets, materialize};
    pub use crate::data::assignment::AssignmentMap;
    pub use crate::data::settings::{AnnotationSettings, OverlaySettings};
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::layers::catalog::{LayerCatalog, MoveDirection};
    pub use crate::layers::layer::{Color, Layer, LayerId};
    pub use crate::mesh_error::{LoopError, MeshAnnotateError};
    pub use crate::topology::element::ElementType;
    pub use crate::topology::host::{
        ElementCacheStore, LoopSelect, LoopSelectError, MeshHost, MeshTopology, SeamFlags,
        SelectionState,
    };
    pub use crate::topology::in_memory::InMemoryMesh;
}
