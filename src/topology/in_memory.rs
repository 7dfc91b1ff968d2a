//! In-memory reference host.
//!
//! `InMemoryMesh` owns a polygon mesh (plus optional wire edges), selection
//! flags for all three element types, the two per-element cache fields and
//! edge seam flags. It implements every host capability trait, using
//! [`loop_walk`](crate::topology::loop_walk) for its loop-select primitive.
//!
//! Selection is tracked per element type independently; selecting a face does
//! not flush to its edges or vertices.

use std::collections::HashMap;

use bytes::Bytes;

use crate::mesh_error::MeshAnnotateError;
use crate::topology::element::{ElementType, PerElement};
use crate::topology::host::{
    ElementCacheStore, LoopSelect, LoopSelectError, MeshTopology, SeamFlags, SelectionState,
};
use crate::topology::loop_walk::{walk_edge_loop, walk_vertex_loop};

/// Polygon mesh with edit-mode state.
#[derive(Clone, Debug)]
pub struct InMemoryMesh {
    positions: Vec<[f32; 3]>,
    edges: Vec<[usize; 2]>,
    faces: Vec<Vec<usize>>,
    face_edges: Vec<Vec<usize>>,
    edge_faces: Vec<Vec<usize>>,
    vert_edges: Vec<Vec<usize>>,
    edge_lookup: HashMap<(usize, usize), usize>,
    face_normals: Vec<[f32; 3]>,
    vert_normals: Vec<[f32; 3]>,
    selection: PerElement<Vec<bool>>,
    cache_top: PerElement<Vec<i32>>,
    cache_stack: PerElement<Vec<Bytes>>,
    seams: Vec<bool>,
    select_mode: ElementType,
    headless: bool,
    redraws: usize,
}

fn invalid_geometry(message: impl Into<String>) -> MeshAnnotateError {
    MeshAnnotateError::InvalidGeometry(message.into())
}

#[inline]
fn edge_key(a: usize, b: usize) -> (usize, usize) {
    if a < b { (a, b) } else { (b, a) }
}

fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn normalize_or(v: [f32; 3], fallback: [f32; 3]) -> [f32; 3] {
    let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    if len <= f32::EPSILON {
        fallback
    } else {
        [v[0] / len, v[1] / len, v[2] / len]
    }
}

impl InMemoryMesh {
    /// Build a mesh from vertex positions, polygon vertex loops and extra
    /// wire edges.
    ///
    /// Edges are numbered in first-use order: face edges first (walking each
    /// face in order), then wire edges not already created by a face.
    ///
    /// # Errors
    /// `InvalidGeometry` for polygons with fewer than three vertices, repeated
    /// vertices within a polygon, degenerate wire edges, or out-of-range
    /// vertex indices.
    pub fn new(
        positions: Vec<[f32; 3]>,
        wire_edges: &[[usize; 2]],
        faces: Vec<Vec<usize>>,
    ) -> Result<Self, MeshAnnotateError> {
        let n_verts = positions.len();
        let mut edges: Vec<[usize; 2]> = Vec::new();
        let mut edge_lookup = HashMap::new();
        let mut face_edges: Vec<Vec<usize>> = Vec::with_capacity(faces.len());

        let mut intern = |a: usize, b: usize, edges: &mut Vec<[usize; 2]>| -> usize {
            *edge_lookup.entry(edge_key(a, b)).or_insert_with(|| {
                edges.push([a, b]);
                edges.len() - 1
            })
        };

        for (f, verts) in faces.iter().enumerate() {
            if verts.len() < 3 {
                return Err(invalid_geometry(format!(
                    "face {f} has {} vertices, expected at least 3",
                    verts.len()
                )));
            }
            for (i, &v) in verts.iter().enumerate() {
                if v >= n_verts {
                    return Err(invalid_geometry(format!(
                        "face {f} references missing vertex {v}"
                    )));
                }
                if verts[..i].contains(&v) {
                    return Err(invalid_geometry(format!(
                        "face {f} repeats vertex {v}"
                    )));
                }
            }
            let ring = (0..verts.len())
                .map(|i| intern(verts[i], verts[(i + 1) % verts.len()], &mut edges))
                .collect();
            face_edges.push(ring);
        }

        for &[a, b] in wire_edges {
            if a >= n_verts || b >= n_verts {
                return Err(invalid_geometry(format!(
                    "wire edge ({a}, {b}) references a missing vertex"
                )));
            }
            if a == b {
                return Err(invalid_geometry(format!("wire edge ({a}, {b}) is degenerate")));
            }
            intern(a, b, &mut edges);
        }

        let mut edge_faces = vec![Vec::new(); edges.len()];
        for (f, ring) in face_edges.iter().enumerate() {
            for &e in ring {
                edge_faces[e].push(f);
            }
        }
        let mut vert_edges = vec![Vec::new(); n_verts];
        for (e, &[a, b]) in edges.iter().enumerate() {
            vert_edges[a].push(e);
            vert_edges[b].push(e);
        }

        let face_normals: Vec<[f32; 3]> = faces
            .iter()
            .map(|verts| newell_normal(&positions, verts))
            .collect();
        let mut vert_sums = vec![[0.0f32; 3]; n_verts];
        for (verts, n) in faces.iter().zip(&face_normals) {
            for &v in verts {
                for k in 0..3 {
                    vert_sums[v][k] += n[k];
                }
            }
        }
        let vert_normals = vert_sums
            .into_iter()
            .map(|s| normalize_or(s, [0.0, 0.0, 1.0]))
            .collect();

        let counts = PerElement {
            vert: n_verts,
            edge: edges.len(),
            face: faces.len(),
        };
        Ok(Self {
            positions,
            seams: vec![false; edges.len()],
            edges,
            faces,
            face_edges,
            edge_faces,
            vert_edges,
            edge_lookup,
            face_normals,
            vert_normals,
            selection: PerElement::from_fn(|ty| vec![false; *counts.get(ty)]),
            cache_top: PerElement::from_fn(|ty| vec![-1; *counts.get(ty)]),
            cache_stack: PerElement::from_fn(|ty| vec![Bytes::new(); *counts.get(ty)]),
            select_mode: ElementType::Face,
            headless: false,
            redraws: 0,
        })
    }

    /// Polygon mesh without wire edges.
    pub fn from_polygons(
        positions: Vec<[f32; 3]>,
        faces: Vec<Vec<usize>>,
    ) -> Result<Self, MeshAnnotateError> {
        Self::new(positions, &[], faces)
    }

    /// Flat `nx`×`ny` quad grid in the XY plane.
    ///
    /// Vertex `(x, y)` has index `y * (nx + 1) + x`; face `(col, row)` has
    /// index `row * nx + col` and winds counter-clockwise seen from +Z.
    pub fn grid(nx: usize, ny: usize) -> Self {
        let stride = nx + 1;
        let positions = (0..=ny)
            .flat_map(|y| (0..=nx).map(move |x| [x as f32, y as f32, 0.0]))
            .collect();
        let faces = (0..ny)
            .flat_map(|row| {
                (0..nx).map(move |col| {
                    let v = row * stride + col;
                    vec![v, v + 1, v + 1 + stride, v + stride]
                })
            })
            .collect();
        Self::polygons_unchecked(positions, &[], faces)
    }

    /// `n` vertices joined by wire edges along +X; `closed` adds the edge
    /// from the last vertex back to the first and lays the points on a circle.
    ///
    /// Edge `i` joins vertex `i` and vertex `i + 1`.
    pub fn polyline(n: usize, closed: bool) -> Self {
        let positions = (0..n)
            .map(|i| {
                if closed {
                    let t = i as f32 / n as f32 * std::f32::consts::TAU;
                    [t.cos(), t.sin(), 0.0]
                } else {
                    [i as f32, 0.0, 0.0]
                }
            })
            .collect();
        let mut wires: Vec<[usize; 2]> = (1..n).map(|i| [i - 1, i]).collect();
        if closed && n > 2 {
            wires.push([n - 1, 0]);
        }
        Self::polygons_unchecked(positions, &wires, Vec::new())
    }

    // Generators above only emit well-formed input.
    fn polygons_unchecked(
        positions: Vec<[f32; 3]>,
        wires: &[[usize; 2]],
        faces: Vec<Vec<usize>>,
    ) -> Self {
        match Self::new(positions, wires, faces) {
            Ok(mesh) => mesh,
            Err(e) => unreachable!("generated mesh rejected: {e}"),
        }
    }

    /// Index of the edge joining `a` and `b`, if any.
    pub fn edge_between(&self, a: usize, b: usize) -> Option<usize> {
        self.edge_lookup.get(&edge_key(a, b)).copied()
    }

    /// Set the host's active select mode.
    pub fn set_select_mode(&mut self, mode: ElementType) {
        self.select_mode = mode;
    }

    /// Simulate running without a usable viewport: loop select fails.
    pub fn set_headless(&mut self, headless: bool) {
        self.headless = headless;
    }

    /// Number of redraws requested so far.
    pub fn redraw_count(&self) -> usize {
        self.redraws
    }
}

fn newell_normal(positions: &[[f32; 3]], verts: &[usize]) -> [f32; 3] {
    let mut n = [0.0f32; 3];
    for (i, &v) in verts.iter().enumerate() {
        let a = positions[v];
        let b = positions[verts[(i + 1) % verts.len()]];
        let d = sub(a, b);
        n[0] += d[1] * (a[2] + b[2]);
        n[1] += d[2] * (a[0] + b[0]);
        n[2] += d[0] * (a[1] + b[1]);
    }
    normalize_or(n, [0.0, 0.0, 1.0])
}

impl MeshTopology for InMemoryMesh {
    fn element_count(&self, ty: ElementType) -> usize {
        match ty {
            ElementType::Vert => self.positions.len(),
            ElementType::Edge => self.edges.len(),
            ElementType::Face => self.faces.len(),
        }
    }

    fn edge_verts(&self, edge: usize) -> [usize; 2] {
        self.edges[edge]
    }

    fn face_verts(&self, face: usize) -> &[usize] {
        &self.faces[face]
    }

    fn face_edges(&self, face: usize) -> &[usize] {
        &self.face_edges[face]
    }

    fn edge_faces(&self, edge: usize) -> &[usize] {
        &self.edge_faces[edge]
    }

    fn vert_edges(&self, vert: usize) -> &[usize] {
        &self.vert_edges[vert]
    }

    fn vert_co(&self, vert: usize) -> [f32; 3] {
        self.positions[vert]
    }

    fn vert_normal(&self, vert: usize) -> [f32; 3] {
        self.vert_normals[vert]
    }

    fn face_normal(&self, face: usize) -> [f32; 3] {
        self.face_normals[face]
    }
}

impl SelectionState for InMemoryMesh {
    fn is_selected(&self, ty: ElementType, index: usize) -> bool {
        self.selection.get(ty).get(index).copied().unwrap_or(false)
    }

    fn set_selected(&mut self, ty: ElementType, index: usize, selected: bool) {
        if let Some(flag) = self.selection.get_mut(ty).get_mut(index) {
            *flag = selected;
        }
    }

    fn active_select_mode(&self) -> ElementType {
        self.select_mode
    }
}

impl ElementCacheStore for InMemoryMesh {
    fn cache_top(&self, ty: ElementType, index: usize) -> i32 {
        self.cache_top.get(ty).get(index).copied().unwrap_or(-1)
    }

    fn set_cache_top(&mut self, ty: ElementType, index: usize, top: i32) {
        if let Some(slot) = self.cache_top.get_mut(ty).get_mut(index) {
            *slot = top;
        }
    }

    fn cache_stack(&self, ty: ElementType, index: usize) -> Bytes {
        self.cache_stack
            .get(ty)
            .get(index)
            .cloned()
            .unwrap_or_default()
    }

    fn set_cache_stack(&mut self, ty: ElementType, index: usize, stack: Bytes) {
        if let Some(slot) = self.cache_stack.get_mut(ty).get_mut(index) {
            *slot = stack;
        }
    }

    fn request_redraw(&mut self) {
        self.redraws += 1;
    }
}

impl InMemoryMesh {
    fn check_loop_context(&self) -> Result<(), LoopSelectError> {
        if self.headless {
            return Err(LoopSelectError::Unavailable(
                "no 3D viewport available for loop select".into(),
            ));
        }
        Ok(())
    }

    /// Incident edge of `vert` pointing most directly at `target`.
    fn heading_edge(&self, vert: usize, target: [f32; 3]) -> Option<usize> {
        let from = self.vert_co(vert);
        let want = normalize_or(sub(target, from), [0.0; 3]);
        let score = |e: &usize| {
            let dir = normalize_or(sub(self.vert_co(self.other_vert(*e, vert)), from), [0.0; 3]);
            dir[0] * want[0] + dir[1] * want[1] + dir[2] * want[2]
        };
        // ties keep the lowest edge index
        self.vert_edges[vert]
            .iter()
            .copied()
            .rev()
            .max_by(|a, b| score(a).total_cmp(&score(b)))
    }

    fn grow_vertex_loops(&mut self, heading: impl Fn(&Self, usize) -> Option<usize>) {
        let mesh: &Self = self;
        let grown: Vec<usize> = mesh
            .selected(ElementType::Vert)
            .into_iter()
            .filter_map(|v| heading(mesh, v).map(|e| walk_vertex_loop(mesh, v, e)))
            .flatten()
            .collect();
        for v in grown {
            self.set_selected(ElementType::Vert, v, true);
        }
    }
}

impl LoopSelect for InMemoryMesh {
    /// Vertex mode heads along each vertex's first incident edge.
    fn select_loop(&mut self, mode: ElementType) -> Result<(), LoopSelectError> {
        self.check_loop_context()?;
        match mode {
            ElementType::Edge => {
                let grown: Vec<usize> = self
                    .selected(ElementType::Edge)
                    .into_iter()
                    .flat_map(|e| walk_edge_loop(&*self, e))
                    .collect();
                for e in grown {
                    self.set_selected(ElementType::Edge, e, true);
                }
            }
            ElementType::Vert => {
                self.grow_vertex_loops(|mesh, v| mesh.vert_edges[v].first().copied());
            }
            ElementType::Face => return Err(LoopSelectError::UnsupportedMode(mode)),
        }
        Ok(())
    }

    fn select_loop_toward(
        &mut self,
        mode: ElementType,
        target: [f32; 3],
    ) -> Result<(), LoopSelectError> {
        if mode != ElementType::Vert {
            return self.select_loop(mode);
        }
        self.check_loop_context()?;
        self.grow_vertex_loops(|mesh, v| mesh.heading_edge(v, target));
        Ok(())
    }
}

impl SeamFlags for InMemoryMesh {
    fn is_seam(&self, edge: usize) -> bool {
        self.seams.get(edge).copied().unwrap_or(false)
    }

    fn set_seam(&mut self, edge: usize, seam: bool) {
        if let Some(flag) = self.seams.get_mut(edge) {
            *flag = seam;
        }
    }
}
