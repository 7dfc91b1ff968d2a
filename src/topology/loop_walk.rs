//! Edge-loop and quad-strip walking over any [`MeshTopology`].
//!
//! These are the local stepping rules shared by the face-loop resolver and by
//! hosts that do not ship their own loop-select primitive (see
//! [`InMemoryMesh`](crate::topology::in_memory::InMemoryMesh)).
//!
//! A walk continues through a vertex only when the next edge is unambiguous:
//! - interior edge (two faces) through a 4-edge vertex: the edge sharing no
//!   face with the incoming one;
//! - border edge (one face) through a 3-edge vertex: the other border edge;
//! - wire edge (no faces) through a 2-edge vertex: the other wire edge.
//!
//! Everything else is a pole or a branch and ends the walk.

use std::collections::{BTreeSet, HashSet};

use crate::topology::host::MeshTopology;

/// `true` if `edge` has exactly one face.
#[inline]
pub fn is_border_edge<M: MeshTopology + ?Sized>(mesh: &M, edge: usize) -> bool {
    mesh.edge_faces(edge).len() == 1
}

/// `true` if `vert` has a non-regular valence.
///
/// Interior vertices are regular with four edges. A vertex on an open border
/// is regular with three edges, two of them border edges.
pub fn is_pole<M: MeshTopology + ?Sized>(mesh: &M, vert: usize) -> bool {
    let edges = mesh.vert_edges(vert);
    match edges.len() {
        4 => false,
        3 => {
            edges
                .iter()
                .filter(|&&e| is_border_edge(mesh, e))
                .count()
                != 2
        }
        _ => true,
    }
}

/// `true` if either endpoint of `edge` is a pole.
#[inline]
pub fn is_pole_edge<M: MeshTopology + ?Sized>(mesh: &M, edge: usize) -> bool {
    let [a, b] = mesh.edge_verts(edge);
    is_pole(mesh, a) || is_pole(mesh, b)
}

/// The edge of quad `face` sharing no vertex with `edge`.
///
/// Returns `None` for non-quads or when `edge` is not on `face`.
pub fn opposite_face_edge<M: MeshTopology + ?Sized>(
    mesh: &M,
    face: usize,
    edge: usize,
) -> Option<usize> {
    if !mesh.is_quad(face) {
        return None;
    }
    let edges = mesh.face_edges(face);
    if !edges.contains(&edge) {
        return None;
    }
    let [a, b] = mesh.edge_verts(edge);
    edges.iter().copied().find(|&e| {
        let [c, d] = mesh.edge_verts(e);
        c != a && c != b && d != a && d != b
    })
}

/// Next edge when a loop walk arrives at `vert` along `edge`.
pub fn next_loop_edge<M: MeshTopology + ?Sized>(
    mesh: &M,
    vert: usize,
    edge: usize,
) -> Option<usize> {
    let edges = mesh.vert_edges(vert);
    let incoming_faces = mesh.edge_faces(edge);
    let mut candidates = edges.iter().copied().filter(|&e| e != edge);
    match incoming_faces.len() {
        0 => {
            if edges.len() != 2 {
                return None;
            }
            candidates.find(|&e| mesh.edge_faces(e).is_empty())
        }
        1 => {
            if edges.len() != 3 {
                return None;
            }
            let mut border = candidates.filter(|&e| is_border_edge(mesh, e));
            match (border.next(), border.next()) {
                (Some(e), None) => Some(e),
                _ => None,
            }
        }
        2 => {
            if edges.len() != 4 {
                return None;
            }
            let mut across = candidates.filter(|&e| {
                !mesh
                    .edge_faces(e)
                    .iter()
                    .any(|f| incoming_faces.contains(f))
            });
            match (across.next(), across.next()) {
                (Some(e), None) => Some(e),
                _ => None,
            }
        }
        _ => None,
    }
}

/// Every edge on the loop through `start`, beginning with `start` and then
/// walking out of each endpoint in turn.
pub fn walk_edge_loop<M: MeshTopology + ?Sized>(mesh: &M, start: usize) -> Vec<usize> {
    let mut seen = HashSet::from([start]);
    let mut out = vec![start];
    for end in mesh.edge_verts(start) {
        let (mut edge, mut vert) = (start, end);
        while let Some(next) = next_loop_edge(mesh, vert, edge) {
            if !seen.insert(next) {
                break;
            }
            out.push(next);
            vert = mesh.other_vert(next, vert);
            edge = next;
        }
    }
    out
}

/// Vertices on the loop leaving `vert` along `edge`, ascending.
///
/// When the loop continues through `vert` it is walked in both directions.
/// At a pole or a chain end only the ray along `edge` is taken, so two loops
/// are never joined at `vert`.
pub fn walk_vertex_loop<M: MeshTopology + ?Sized>(mesh: &M, vert: usize, edge: usize) -> Vec<usize> {
    let mut verts = BTreeSet::from([vert]);
    let mut seen = HashSet::new();
    let back = next_loop_edge(mesh, vert, edge);
    for first in std::iter::once(edge).chain(back) {
        if !seen.insert(first) {
            continue;
        }
        let (mut edge, mut at) = (first, mesh.other_vert(first, vert));
        verts.insert(at);
        while let Some(next) = next_loop_edge(mesh, at, edge) {
            if !seen.insert(next) {
                break;
            }
            at = mesh.other_vert(next, at);
            edge = next;
            verts.insert(at);
        }
    }
    verts.into_iter().collect()
}
