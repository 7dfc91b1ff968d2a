//! Vertex paths and rings via the host's loop-select primitive.
//!
//! Each selected vertex is tried as a seed in turn. From a seed the primitive
//! is run once per other selected vertex, heading for it, so every loop
//! through the seed that could reach the selection gets grown. Each grown set
//! is split into connected components (restricted to the set) and a
//! component qualifies when it is a simple chain:
//! - every member has at most two neighbours inside it;
//! - it has either zero endpoints (a ring) or exactly two (a path);
//! - it contains every originally selected vertex.
//!
//! The first seed yielding exactly one distinct qualifying chain wins.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::algs::loops::SelectionSnapshot;
use crate::mesh_error::LoopError;
use crate::topology::element::ElementType;
use crate::topology::host::{MeshHost, MeshTopology};

/// Minimum number of selected vertices.
pub const MIN_SELECTED_VERTS: usize = 2;

/// Infer the vertex path or ring through the current vertex selection.
///
/// Returns the vertices in walk order: from the lower-indexed endpoint for a
/// path, from the lowest index for a ring. On failure the original selection
/// is put back.
pub fn resolve_vertex_loop<H: MeshHost + ?Sized>(mesh: &mut H) -> Result<Vec<usize>, LoopError> {
    let snapshot = SelectionSnapshot::capture(mesh, ElementType::Vert);
    let selected = snapshot.indices().to_vec();
    if selected.len() < MIN_SELECTED_VERTS {
        return Err(LoopError::TooFewSelected {
            element_type: ElementType::Vert,
            required: MIN_SELECTED_VERTS,
            found: selected.len(),
        });
    }

    for &seed in &selected {
        // keyed by sorted members so the same chain from two headings counts once
        let mut chains: BTreeMap<BTreeSet<usize>, Vec<usize>> = BTreeMap::new();
        for &target in selected.iter().filter(|&&v| v != seed) {
            mesh.select_only(ElementType::Vert, &[seed]);
            let toward = mesh.vert_co(target);
            if let Err(err) = mesh.select_loop_toward(ElementType::Vert, toward) {
                snapshot.restore(mesh);
                log::warn!("vertex loop select failed: {err}");
                return Err(LoopError::ContextUnavailable(err.to_string()));
            }
            let grown = mesh.selected(ElementType::Vert);
            let adjacency = induced_adjacency(&*mesh, &grown);
            for component in components(&adjacency) {
                if !selected.iter().all(|v| component.contains(v)) {
                    continue;
                }
                if let Some(chain) = order_chain(&adjacency, &component) {
                    chains.insert(component, chain);
                }
            }
        }
        if chains.len() == 1 {
            return Ok(chains.into_values().next().unwrap_or_default());
        }
        log::trace!(
            "vertex seed {seed}: {} qualifying chain(s), trying next seed",
            chains.len()
        );
    }

    snapshot.restore(mesh);
    Err(LoopError::NoPath)
}

/// Neighbours of each vertex of `set`, counting only edges inside `set`.
fn induced_adjacency<M: MeshTopology + ?Sized>(
    mesh: &M,
    set: &[usize],
) -> HashMap<usize, BTreeSet<usize>> {
    let members: BTreeSet<usize> = set.iter().copied().collect();
    set.iter()
        .map(|&v| {
            let neighbours = mesh
                .vert_edges(v)
                .iter()
                .map(|&e| mesh.other_vert(e, v))
                .filter(|n| *n != v && members.contains(n))
                .collect();
            (v, neighbours)
        })
        .collect()
}

/// Connected components, each as a sorted set.
fn components(adjacency: &HashMap<usize, BTreeSet<usize>>) -> Vec<BTreeSet<usize>> {
    let mut unvisited: BTreeSet<usize> = adjacency.keys().copied().collect();
    let mut out = Vec::new();
    while let Some(start) = unvisited.pop_first() {
        let mut component = BTreeSet::from([start]);
        let mut stack = vec![start];
        while let Some(v) = stack.pop() {
            for &n in &adjacency[&v] {
                if unvisited.remove(&n) {
                    component.insert(n);
                    stack.push(n);
                }
            }
        }
        out.push(component);
    }
    out
}

/// Walk `component` as a path or ring, or `None` if it branches.
fn order_chain(
    adjacency: &HashMap<usize, BTreeSet<usize>>,
    component: &BTreeSet<usize>,
) -> Option<Vec<usize>> {
    let degree = |v: &usize| adjacency[v].len();
    if component.iter().any(|v| degree(v) > 2) {
        return None;
    }
    let endpoints: Vec<usize> = component.iter().copied().filter(|v| degree(v) < 2).collect();
    let start = match endpoints.as_slice() {
        [] => *component.first()?,
        [a, _] => *a,
        // a lone vertex, or more than one chain end pair
        _ => return None,
    };
    if component.len() < 2 {
        return None;
    }

    let mut order = vec![start];
    let (mut prev, mut at) = (None, start);
    while let Some(&next) = adjacency[&at].iter().find(|&&n| Some(n) != prev) {
        if next == start {
            break;
        }
        order.push(next);
        prev = Some(at);
        at = next;
    }
    (order.len() == component.len()).then_some(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::host::SelectionState;
    use crate::topology::in_memory::InMemoryMesh;

    fn select(mesh: &mut InMemoryMesh, verts: &[usize]) {
        for &v in verts {
            mesh.set_selected(ElementType::Vert, v, true);
        }
    }

    #[test]
    fn sparse_selection_on_a_chain_gives_the_chain() {
        let mut mesh = InMemoryMesh::polyline(10, false);
        select(&mut mesh, &[1, 4, 8]);
        let path = resolve_vertex_loop(&mut mesh).unwrap();
        assert_eq!(path, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn ring_is_walked_in_order() {
        let mut mesh = InMemoryMesh::polyline(6, true);
        select(&mut mesh, &[2, 5]);
        let ring = resolve_vertex_loop(&mut mesh).unwrap();
        assert_eq!(ring.len(), 6);
        assert_eq!(ring[0], 0);
        assert!(ring == vec![0, 1, 2, 3, 4, 5] || ring == vec![0, 5, 4, 3, 2, 1]);
    }

    #[test]
    fn grid_rows_resolve_without_turning_corners() {
        let mut mesh = InMemoryMesh::grid(4, 4);
        select(&mut mesh, &[11, 13]);
        assert_eq!(resolve_vertex_loop(&mut mesh), Ok(vec![10, 11, 12, 13, 14]));

        mesh.deselect_all(ElementType::Vert);
        select(&mut mesh, &[0, 2]);
        assert_eq!(resolve_vertex_loop(&mut mesh), Ok(vec![0, 1, 2, 3, 4]));
    }

    #[test]
    fn branching_component_is_rejected() {
        let mut adjacency = HashMap::new();
        adjacency.insert(0, BTreeSet::from([1, 2, 3]));
        adjacency.insert(1, BTreeSet::from([0]));
        adjacency.insert(2, BTreeSet::from([0]));
        adjacency.insert(3, BTreeSet::from([0]));
        let comps = components(&adjacency);
        assert_eq!(comps.len(), 1);
        assert_eq!(order_chain(&adjacency, &comps[0]), None);
    }
}
