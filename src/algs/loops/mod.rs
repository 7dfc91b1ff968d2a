//! Loop inference: expand a sparse selection into a complete loop.
//!
//! One resolver per element type:
//! - [`face`]: quad strips, computed locally from topology;
//! - [`edge`]: edge loops, delegated to the host's loop-select primitive;
//! - [`vertex`]: vertex paths and rings, delegated to the primitive and then
//!   filtered for a single chain.
//!
//! On success [`resolve_loop`] replaces the selection of that type with the
//! resolved loop. On failure the selection is what it was before the call.

pub mod edge;
pub mod face;
pub mod vertex;

pub use edge::resolve_edge_loop;
pub use face::{face_loop_candidates, resolve_face_loop};
pub use vertex::resolve_vertex_loop;

use crate::mesh_error::LoopError;
use crate::topology::element::ElementType;
use crate::topology::host::{MeshHost, MeshTopology, SelectionState};

/// A loop inferred from the selection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedLoop {
    pub element_type: ElementType,
    /// Member indices. Faces and edges are ascending; vertices are in walk
    /// order along the path (or around the ring).
    pub elements: Vec<usize>,
}

/// Resolve the selection of `ty` into a loop and select it.
pub fn resolve_loop<H: MeshHost + ?Sized>(
    mesh: &mut H,
    ty: ElementType,
) -> Result<ResolvedLoop, LoopError> {
    let elements = match ty {
        ElementType::Face => resolve_face_loop(mesh)?,
        ElementType::Edge => resolve_edge_loop(mesh)?,
        ElementType::Vert => resolve_vertex_loop(mesh)?,
    };
    mesh.select_only(ty, &elements);
    mesh.request_redraw();
    log::debug!("resolved {ty} loop with {} element(s)", elements.len());
    Ok(ResolvedLoop {
        element_type: ty,
        elements,
    })
}

/// [`resolve_loop`] in the host's active select mode.
pub fn resolve_loop_in_active_mode<H: MeshHost + ?Sized>(
    mesh: &mut H,
) -> Result<ResolvedLoop, LoopError> {
    let ty = mesh.active_select_mode();
    resolve_loop(mesh, ty)
}

/// Keep the candidates containing every selected element; exactly one must
/// remain.
///
/// Each candidate and `selection` must be sorted ascending.
pub fn pick_unique_cover(
    candidates: Vec<Vec<usize>>,
    selection: &[usize],
) -> Result<Vec<usize>, LoopError> {
    let mut covering: Vec<Vec<usize>> = candidates
        .into_iter()
        .filter(|c| is_superset(c, selection))
        .collect();
    match covering.len() {
        0 => Err(LoopError::NoLoop),
        1 => Ok(covering.pop().unwrap_or_default()),
        n => Err(LoopError::Ambiguous { candidates: n }),
    }
}

/// `true` if sorted `outer` contains every element of `inner`.
pub(crate) fn is_superset(outer: &[usize], inner: &[usize]) -> bool {
    inner.iter().all(|x| outer.binary_search(x).is_ok())
}

/// Selection of one element type, captured so a failed resolve can put it
/// back.
pub(crate) struct SelectionSnapshot {
    ty: ElementType,
    indices: Vec<usize>,
}

impl SelectionSnapshot {
    pub(crate) fn capture<H>(mesh: &H, ty: ElementType) -> Self
    where
        H: MeshTopology + SelectionState + ?Sized,
    {
        Self {
            ty,
            indices: mesh.selected(ty),
        }
    }

    pub(crate) fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub(crate) fn restore<H>(&self, mesh: &mut H)
    where
        H: MeshTopology + SelectionState + ?Sized,
    {
        mesh.select_only(self.ty, &self.indices);
    }
}
