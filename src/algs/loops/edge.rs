//! Edge loops via the host's loop-select primitive.

use crate::algs::loops::{SelectionSnapshot, is_superset};
use crate::mesh_error::LoopError;
use crate::topology::element::ElementType;
use crate::topology::host::MeshHost;

/// Infer the edge loop through the current edge selection.
///
/// The first selected edge seeds the host primitive; the loop it returns must
/// contain every originally selected edge. The primitive leaves its result
/// selected; on any failure the original selection is put back.
pub fn resolve_edge_loop<H: MeshHost + ?Sized>(mesh: &mut H) -> Result<Vec<usize>, LoopError> {
    let snapshot = SelectionSnapshot::capture(mesh, ElementType::Edge);
    let Some(&seed) = snapshot.indices().first() else {
        return Err(LoopError::TooFewSelected {
            element_type: ElementType::Edge,
            required: 1,
            found: 0,
        });
    };

    mesh.select_only(ElementType::Edge, &[seed]);
    if let Err(err) = mesh.select_loop(ElementType::Edge) {
        snapshot.restore(mesh);
        log::warn!("edge loop select failed: {err}");
        return Err(LoopError::ContextUnavailable(err.to_string()));
    }

    let looped = mesh.selected(ElementType::Edge);
    if !is_superset(&looped, snapshot.indices()) {
        snapshot.restore(mesh);
        return Err(LoopError::SpansMultipleLoops);
    }
    Ok(looped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::host::SelectionState;
    use crate::topology::in_memory::InMemoryMesh;

    #[test]
    fn wire_chain_resolves_from_one_edge() {
        let mut mesh = InMemoryMesh::polyline(6, false);
        mesh.set_selected(ElementType::Edge, 2, true);
        assert_eq!(resolve_edge_loop(&mut mesh), Ok(vec![0, 1, 2, 3, 4]));
    }

    #[test]
    fn nothing_selected_is_too_few() {
        let mut mesh = InMemoryMesh::polyline(3, false);
        assert!(matches!(
            resolve_edge_loop(&mut mesh),
            Err(LoopError::TooFewSelected { found: 0, .. })
        ));
    }
}
