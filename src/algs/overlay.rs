//! Overlay batching: per-layer draw primitives for a rendering consumer.
//!
//! For each element type the builder resolves every element's stack, picks
//! its top *visible* layer, and groups elements into buckets keyed by
//! (layer, selected). Each bucket becomes one [`DrawBatch`] of tightly packed
//! [`OverlayVertex`] positions that can be uploaded with
//! [`DrawBatch::as_bytes`].
//!
//! Geometry is pushed along the normal by `face_offset` to avoid z-fighting:
//! faces are fan-triangulated, edges become line segments (optionally trimmed
//! at both ends by `edge_trim`), vertices become points.
//!
//! Nothing here writes to the settings or the host.

use std::collections::{BTreeMap, HashMap, HashSet};

use bytemuck::{Pod, Zeroable};

use crate::data::assignment::{AssignmentMap, normalize_stack};
use crate::data::element_cache::decode_stack;
use crate::data::settings::{AnnotationSettings, OverlaySettings};
use crate::layers::layer::{Color, LayerId};
use crate::topology::element::ElementType;
use crate::topology::host::{ElementCacheStore, MeshTopology, SelectionState};

/// One overlay vertex as uploaded to the GPU.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct OverlayVertex {
    pub position: [f32; 3],
}

static_assertions::assert_eq_size!(OverlayVertex, [f32; 3]);

/// How a batch's vertices are to be assembled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrimitiveKind {
    /// Every three vertices form a triangle.
    Triangles,
    /// Every two vertices form a segment.
    Lines,
    /// One point per vertex.
    Points,
}

impl PrimitiveKind {
    pub fn for_element(ty: ElementType) -> Self {
        match ty {
            ElementType::Face => PrimitiveKind::Triangles,
            ElementType::Edge => PrimitiveKind::Lines,
            ElementType::Vert => PrimitiveKind::Points,
        }
    }
}

/// All elements of one type whose top visible layer is `layer` and whose
/// selection flag equals `selected`.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawBatch {
    pub element_type: ElementType,
    pub layer: LayerId,
    /// Layer color with alpha scaled by the global opacity.
    pub color: Color,
    pub selected: bool,
    pub primitive: PrimitiveKind,
    /// Elements in this batch, ascending.
    pub elements: Vec<usize>,
    pub vertices: Vec<OverlayVertex>,
}

impl DrawBatch {
    /// Vertex data as raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}

/// Everything a consumer needs to draw one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayFrame {
    /// Vertex batches first, then edges, then faces; within a type in
    /// catalog order, unselected before selected.
    pub batches: Vec<DrawBatch>,
    pub line_width: f32,
    pub point_size: f32,
    pub show_backfaces: bool,
}

/// Builds [`OverlayFrame`]s from settings and live topology.
pub struct OverlayBatchBuilder<'a, M: ?Sized> {
    settings: &'a AnnotationSettings,
    mesh: &'a M,
}

impl<'a, M> OverlayBatchBuilder<'a, M>
where
    M: MeshTopology + SelectionState + ElementCacheStore + ?Sized,
{
    pub fn new(settings: &'a AnnotationSettings, mesh: &'a M) -> Self {
        Self { settings, mesh }
    }

    pub fn build(&self) -> OverlayFrame {
        let overlay = &self.settings.overlay;
        OverlayFrame {
            batches: ElementType::ALL
                .into_iter()
                .flat_map(|ty| self.build_type(ty))
                .collect(),
            line_width: overlay.line_width,
            point_size: overlay.point_size,
            show_backfaces: overlay.show_backfaces,
        }
    }

    /// Layers of `ty` eligible for drawing.
    fn drawable_layers(&self, ty: ElementType) -> HashSet<LayerId> {
        let catalog = self.settings.catalog(ty);
        if self.settings.overlay.solo_active {
            return catalog
                .active()
                .filter(|l| l.visible)
                .map(|l| l.id())
                .into_iter()
                .collect();
        }
        catalog
            .layers()
            .iter()
            .filter(|l| l.visible)
            .map(|l| l.id())
            .collect()
    }

    /// Stack of `index` in catalog order. The persisted mapping is used when
    /// it has an entry; otherwise the element cache is.
    fn stack_of(
        &self,
        ty: ElementType,
        index: usize,
        persisted: &AssignmentMap,
        order: &HashMap<LayerId, usize>,
    ) -> Vec<LayerId> {
        let mut stack = persisted.stack(index).to_vec();
        if stack.is_empty() {
            stack = decode_stack(&self.mesh.cache_stack(ty, index)).ids;
        }
        if stack.is_empty() {
            stack.extend(LayerId::from_i64(i64::from(self.mesh.cache_top(ty, index))));
        }
        normalize_stack(&mut stack, order);
        stack
    }

    /// Batches for one element type.
    pub fn build_type(&self, ty: ElementType) -> Vec<DrawBatch> {
        let drawable = self.drawable_layers(ty);
        if drawable.is_empty() {
            return Vec::new();
        }
        let catalog = self.settings.catalog(ty);
        let order = catalog.order_index();
        let count = self.mesh.element_count(ty);
        let mut persisted = self.settings.load_assignments(ty);
        persisted.prune_to_valid_indices(count);

        let mut buckets: BTreeMap<(usize, bool), Vec<usize>> = BTreeMap::new();
        for index in 0..count {
            let stack = self.stack_of(ty, index, &persisted, &order);
            let Some(top) = stack.iter().rev().find(|id| drawable.contains(*id)) else {
                continue;
            };
            let selected = self.mesh.is_selected(ty, index);
            buckets
                .entry((order[top], selected))
                .or_default()
                .push(index);
        }

        let overlay = &self.settings.overlay;
        let opacity = overlay.clamped_opacity();
        buckets
            .into_iter()
            .filter_map(|((pos, selected), elements)| {
                let layer = catalog.get(pos)?;
                let mut color = layer.color;
                color[3] *= opacity;
                let mut vertices = Vec::new();
                for &index in &elements {
                    self.emit(ty, index, overlay, &mut vertices);
                }
                Some(DrawBatch {
                    element_type: ty,
                    layer: layer.id(),
                    color,
                    selected,
                    primitive: PrimitiveKind::for_element(ty),
                    elements,
                    vertices,
                })
            })
            .collect()
    }

    fn emit(
        &self,
        ty: ElementType,
        index: usize,
        overlay: &OverlaySettings,
        out: &mut Vec<OverlayVertex>,
    ) {
        let mesh = self.mesh;
        let offset = overlay.face_offset;
        match ty {
            ElementType::Face => {
                let push = scale(mesh.face_normal(index), offset);
                let corners: Vec<[f32; 3]> = mesh
                    .face_verts(index)
                    .iter()
                    .map(|&v| add(mesh.vert_co(v), push))
                    .collect();
                for i in 1..corners.len().saturating_sub(1) {
                    out.extend(
                        [corners[0], corners[i], corners[i + 1]]
                            .map(|position| OverlayVertex { position }),
                    );
                }
            }
            ElementType::Edge => {
                let [a, b] = mesh.edge_verts(index);
                let normal = normalized(add(mesh.vert_normal(a), mesh.vert_normal(b)));
                let push = scale(normal, offset);
                let (pa, pb) = (add(mesh.vert_co(a), push), add(mesh.vert_co(b), push));
                let trim = overlay.clamped_edge_trim();
                out.push(OverlayVertex {
                    position: lerp(pa, pb, trim),
                });
                out.push(OverlayVertex {
                    position: lerp(pa, pb, 1.0 - trim),
                });
            }
            ElementType::Vert => {
                let push = scale(mesh.vert_normal(index), offset);
                out.push(OverlayVertex {
                    position: add(mesh.vert_co(index), push),
                });
            }
        }
    }
}

fn add(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

fn scale(v: [f32; 3], s: f32) -> [f32; 3] {
    [v[0] * s, v[1] * s, v[2] * s]
}

fn lerp(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    add(a, scale([b[0] - a[0], b[1] - a[1], b[2] - a[2]], t))
}

/// Unit vector, or zero for a degenerate input.
fn normalized(v: [f32; 3]) -> [f32; 3] {
    let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    if len > f32::EPSILON {
        scale(v, 1.0 / len)
    } else {
        [0.0; 3]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_is_tightly_packed() {
        let batch = DrawBatch {
            element_type: ElementType::Vert,
            layer: LayerId::new(1).unwrap(),
            color: [1.0; 4],
            selected: false,
            primitive: PrimitiveKind::Points,
            elements: vec![0, 1],
            vertices: vec![OverlayVertex::default(); 2],
        };
        assert_eq!(batch.as_bytes().len(), 2 * 3 * 4);
    }

    #[test]
    fn lerp_and_normalize() {
        assert_eq!(lerp([0.0; 3], [4.0, 0.0, 0.0], 0.25), [1.0, 0.0, 0.0]);
        let n = normalized([0.0, 3.0, 4.0]);
        assert!((n[1] - 0.6).abs() < 1e-6 && (n[2] - 0.8).abs() < 1e-6);
        assert_eq!(normalized([0.0; 3]), [0.0; 3]);
    }
}
