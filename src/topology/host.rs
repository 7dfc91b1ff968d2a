//! Capabilities consumed from the host mesh-editing environment.
//!
//! The annotation core never owns topology. It reads element containers,
//! adjacency and selection flags through these traits, writes two small
//! per-element cache fields, and delegates directional loop selection to the
//! host. All calls are synchronous; indices are stable for the duration of a
//! single operation but may change between operations.

use bytes::Bytes;
use thiserror::Error;

use crate::topology::element::ElementType;

/// Read-only topology and geometry queries.
///
/// Face vertex and edge lists are ordered around the face, with
/// `face_edges(f)[i]` joining `face_verts(f)[i]` and `face_verts(f)[i + 1]`.
pub trait MeshTopology {
    /// Number of elements of `ty` currently in the mesh.
    fn element_count(&self, ty: ElementType) -> usize;
    /// The two endpoint vertices of `edge`.
    fn edge_verts(&self, edge: usize) -> [usize; 2];
    /// Vertices around `face`, in winding order.
    fn face_verts(&self, face: usize) -> &[usize];
    /// Edges around `face`, in winding order.
    fn face_edges(&self, face: usize) -> &[usize];
    /// Faces using `edge`.
    fn edge_faces(&self, edge: usize) -> &[usize];
    /// Edges incident to `vert`.
    fn vert_edges(&self, vert: usize) -> &[usize];
    /// Position of `vert`.
    fn vert_co(&self, vert: usize) -> [f32; 3];
    /// Unit normal of `vert`.
    fn vert_normal(&self, vert: usize) -> [f32; 3];
    /// Unit normal of `face`.
    fn face_normal(&self, face: usize) -> [f32; 3];

    #[inline]
    fn is_quad(&self, face: usize) -> bool {
        self.face_verts(face).len() == 4
    }

    /// The vertex across `edge` from `vert`.
    #[inline]
    fn other_vert(&self, edge: usize, vert: usize) -> usize {
        let [a, b] = self.edge_verts(edge);
        if a == vert { b } else { a }
    }
}

/// Per-element selection flags.
pub trait SelectionState {
    fn is_selected(&self, ty: ElementType, index: usize) -> bool;
    fn set_selected(&mut self, ty: ElementType, index: usize, selected: bool);
    /// Highest-priority active select mode (face over edge over vertex).
    fn active_select_mode(&self) -> ElementType;

    /// Indices of every selected element of `ty`, ascending.
    fn selected(&self, ty: ElementType) -> Vec<usize>
    where
        Self: MeshTopology,
    {
        (0..self.element_count(ty))
            .filter(|&i| self.is_selected(ty, i))
            .collect()
    }

    fn deselect_all(&mut self, ty: ElementType)
    where
        Self: MeshTopology,
    {
        for i in 0..self.element_count(ty) {
            self.set_selected(ty, i, false);
        }
    }

    /// Replace the selection of `ty` with exactly `indices`.
    fn select_only(&mut self, ty: ElementType, indices: &[usize])
    where
        Self: MeshTopology,
    {
        self.deselect_all(ty);
        let count = self.element_count(ty);
        for &i in indices {
            if i < count {
                self.set_selected(ty, i, true);
            }
        }
    }
}

/// The two session-local fields attached to every element.
///
/// Both are lazily defaulted: an element never written reports a top of `-1`
/// and an empty stack.
pub trait ElementCacheStore {
    fn cache_top(&self, ty: ElementType, index: usize) -> i32;
    fn set_cache_top(&mut self, ty: ElementType, index: usize, top: i32);
    fn cache_stack(&self, ty: ElementType, index: usize) -> Bytes;
    fn set_cache_stack(&mut self, ty: ElementType, index: usize, stack: Bytes);
    /// Ask the host to redraw its viewport.
    fn request_redraw(&mut self) {}
}

/// Why the host could not run its loop-select primitive.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoopSelectError {
    #[error("{0}")]
    Unavailable(String),
    #[error("loop select does not operate on {0} elements")]
    UnsupportedMode(ElementType),
}

/// Directional loop selection on the current selection.
///
/// In edge mode every selected edge is extended to its full edge loop. In
/// vertex mode every selected vertex is extended along one loop leaving it;
/// the host picks the heading. The call mutates selection state and returns
/// once done.
pub trait LoopSelect {
    fn select_loop(&mut self, mode: ElementType) -> Result<(), LoopSelectError>;

    /// [`select_loop`](Self::select_loop) heading for `target`, the way an
    /// interactive host follows the edge nearest the cursor.
    ///
    /// Hosts without a notion of heading ignore `target`.
    fn select_loop_toward(
        &mut self,
        mode: ElementType,
        target: [f32; 3],
    ) -> Result<(), LoopSelectError> {
        let _ = target;
        self.select_loop(mode)
    }
}

/// Optional seam flag on edges.
pub trait SeamFlags {
    fn is_seam(&self, edge: usize) -> bool;
    fn set_seam(&mut self, edge: usize, seam: bool);
}

/// Everything the sync pipeline and resolvers need from a host.
pub trait MeshHost: MeshTopology + SelectionState + ElementCacheStore + LoopSelect {}

impl<T> MeshHost for T where T: MeshTopology + SelectionState + ElementCacheStore + LoopSelect {}
