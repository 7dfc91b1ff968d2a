//! Face loops: rings or strips of quads crossed through opposite edges.
//!
//! Candidates are grown from every edge of a selected quad that is shared by
//! exactly two quads. From that pair the strip is walked outward in both
//! directions, leaving each quad through the edge opposite the one it was
//! entered by. A walk stops at:
//! - an edge that does not have exactly two faces,
//! - an edge touching a pole vertex,
//! - a non-quad face,
//! - a face already in the strip (the ring closed).
//!
//! The resolver accepts the single candidate that contains the whole
//! selection.

use std::collections::{BTreeSet, HashSet};

use itertools::Itertools;

use crate::algs::loops::pick_unique_cover;
use crate::mesh_error::LoopError;
use crate::topology::element::ElementType;
use crate::topology::host::{MeshTopology, SelectionState};
use crate::topology::loop_walk::{is_pole_edge, opposite_face_edge};

/// Minimum number of selected quads.
pub const MIN_SELECTED_QUADS: usize = 2;

/// Every distinct strip grown from the edges of the quads in `seeds`.
///
/// Each strip is returned sorted ascending; strips are ordered by that
/// signature.
pub fn face_loop_candidates<M: MeshTopology + ?Sized>(mesh: &M, seeds: &[usize]) -> Vec<Vec<usize>> {
    let mut signatures = BTreeSet::new();
    let mut tried = HashSet::new();
    for &face in seeds.iter().filter(|&&f| mesh.is_quad(f)) {
        for &edge in mesh.face_edges(face) {
            if !tried.insert(edge) {
                continue;
            }
            let &[a, b] = mesh.edge_faces(edge) else {
                continue;
            };
            if !mesh.is_quad(a) || !mesh.is_quad(b) {
                continue;
            }
            let mut strip = HashSet::from([a, b]);
            walk_strip(mesh, b, edge, &mut strip);
            walk_strip(mesh, a, edge, &mut strip);
            signatures.insert(strip.into_iter().sorted_unstable().collect::<Vec<_>>());
        }
    }
    signatures.into_iter().collect()
}

/// Step from `face`, entered across `entered`, until a stop rule fires.
fn walk_strip<M: MeshTopology + ?Sized>(
    mesh: &M,
    face: usize,
    entered: usize,
    strip: &mut HashSet<usize>,
) {
    let (mut face, mut entered) = (face, entered);
    while let Some(exit) = opposite_face_edge(mesh, face, entered) {
        let &[f0, f1] = mesh.edge_faces(exit) else {
            break;
        };
        if is_pole_edge(mesh, exit) {
            break;
        }
        let next = if f0 == face { f1 } else { f0 };
        if !mesh.is_quad(next) || !strip.insert(next) {
            break;
        }
        face = next;
        entered = exit;
    }
}

/// Infer the face loop covering the current face selection.
///
/// Does not modify the selection; [`resolve_loop`](super::resolve_loop)
/// selects the result.
pub fn resolve_face_loop<H>(mesh: &H) -> Result<Vec<usize>, LoopError>
where
    H: MeshTopology + SelectionState + ?Sized,
{
    let selected = mesh.selected(ElementType::Face);
    let quads = selected.iter().filter(|&&f| mesh.is_quad(f)).count();
    if quads < MIN_SELECTED_QUADS {
        return Err(LoopError::TooFewSelected {
            element_type: ElementType::Face,
            required: MIN_SELECTED_QUADS,
            found: quads,
        });
    }
    let candidates = face_loop_candidates(mesh, &selected);
    log::trace!(
        "{} face loop candidate(s) around {} selected face(s)",
        candidates.len(),
        selected.len()
    );
    pick_unique_cover(candidates, &selected)
}
