//! `LayerCatalog`: the ordered layer list of one element type.
//!
//! The catalog owns catalog order (position = draw/stack order, last = top),
//! the active-layer pointer and the monotonic id counter. It knows nothing
//! about assignments; operations that must cascade into stacks (removal,
//! reordering) live in [`SyncEngine`](crate::algs::sync::SyncEngine), which
//! calls into the catalog and then re-normalizes.

use std::collections::HashMap;

use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::debug_invariants::DebugInvariants;
use crate::layers::color::auto_color;
use crate::layers::layer::{Color, Layer, LayerId, clamp_color};
use crate::mesh_error::MeshAnnotateError;
use crate::topology::element::ElementType;

/// Counter value after the largest id a [`LayerId`] accepts was allocated.
const MAX_NEXT_ID: u32 = i32::MAX as u32 + 1;

/// Direction for [`LayerCatalog::move_layer`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MoveDirection {
    /// Toward the front of the list (lower in the stack).
    Up,
    /// Toward the back of the list (higher in the stack).
    Down,
}

/// Ordered layers for one element type.
///
/// # Invariants
///
/// - Every layer has this catalog's element type.
/// - Ids are unique and strictly below `next_id`, which never exceeds one
///   past the largest [`LayerId`].
/// - Every color component is in `[0, 1]`.
/// - `active_index < layers.len()` whenever the catalog is non-empty, and `0`
///   otherwise.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LayerCatalog {
    element_type: ElementType,
    layers: Vec<Layer>,
    active_index: usize,
    next_id: u32,
}

impl LayerCatalog {
    pub fn new(element_type: ElementType) -> Self {
        Self {
            element_type,
            layers: Vec::new(),
            active_index: 0,
            next_id: 1,
        }
    }

    #[inline]
    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    /// Layers in catalog order.
    #[inline]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    #[inline]
    pub fn active_index(&self) -> usize {
        self.active_index
    }

    /// The id the next [`create`](Self::create) will allocate.
    #[inline]
    pub fn next_id(&self) -> u32 {
        self.next_id
    }

    pub fn active(&self) -> Option<&Layer> {
        self.layers.get(self.active_index)
    }

    /// Point the active index at `index`.
    pub fn set_active(&mut self, index: usize) -> Result<(), MeshAnnotateError> {
        self.check_index(index)?;
        self.active_index = index;
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Layer> {
        self.layers.get_mut(index)
    }

    /// Catalog position of `id`.
    pub fn position(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|l| l.id() == id)
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id() == id)
    }

    pub fn contains(&self, id: LayerId) -> bool {
        self.position(id).is_some()
    }

    /// Map from id to catalog position, for repeated stack normalization.
    pub fn order_index(&self) -> HashMap<LayerId, usize> {
        self.layers
            .iter()
            .enumerate()
            .map(|(pos, l)| (l.id(), pos))
            .collect()
    }

    /// Append a new layer and make it active.
    ///
    /// A missing name becomes `"<Type> Layer <id>"`; a missing color is picked
    /// by [`auto_color`] using an RNG seeded from `color_seed` and the new id,
    /// so the same catalog state always yields the same color.
    ///
    /// # Errors
    /// `LayerIdsExhausted` once every id a [`LayerId`] can hold was handed out.
    pub fn create(
        &mut self,
        name: Option<&str>,
        color: Option<Color>,
        color_seed: u64,
    ) -> Result<LayerId, MeshAnnotateError> {
        let raw = self.next_id;
        let id =
            LayerId::new(raw).ok_or(MeshAnnotateError::LayerIdsExhausted(self.element_type))?;
        self.next_id += 1;
        let name = match name {
            Some(n) if !n.trim().is_empty() => n.to_string(),
            _ => format!("{} Layer {raw}", capitalized(self.element_type)),
        };
        let color = color.unwrap_or_else(|| {
            let existing: Vec<Color> = self.layers.iter().map(|l| l.color).collect();
            let mut rng = SmallRng::seed_from_u64(color_seed ^ u64::from(raw).rotate_left(32));
            auto_color(&existing, self.element_type, &mut rng)
        });
        self.layers
            .push(Layer::new(id, self.element_type, name, color));
        self.active_index = self.layers.len() - 1;
        crate::debug_invariants!(self.validate_invariants(), "LayerCatalog::create");
        Ok(id)
    }

    /// Undo the most recent [`create`](Self::create): drop layer `id` and
    /// hand its id back to the counter.
    ///
    /// Only succeeds when `id` is the newest id ever allocated, so ids are
    /// still never reused once anything else observed them.
    pub(crate) fn rollback_create(&mut self, id: LayerId) -> bool {
        if id.get() + 1 != self.next_id {
            return false;
        }
        let Some(index) = self.position(id) else {
            return false;
        };
        self.layers.remove(index);
        self.next_id -= 1;
        self.clamp_active();
        true
    }

    /// Remove the layer at `index` and clamp the active index.
    ///
    /// Stacks still referencing the removed id are repaired by the caller.
    pub fn remove(&mut self, index: usize) -> Result<Layer, MeshAnnotateError> {
        self.check_index(index)?;
        let layer = self.layers.remove(index);
        if self.active_index > index || self.active_index >= self.layers.len() {
            self.active_index = self.active_index.saturating_sub(1);
        }
        self.clamp_active();
        crate::debug_invariants!(self.validate_invariants(), "LayerCatalog::remove");
        Ok(layer)
    }

    /// Swap the layer at `index` with its neighbour in `direction`.
    ///
    /// Returns `Ok(false)` when the layer is already at that end. The active
    /// index follows the moved layer.
    pub fn move_layer(
        &mut self,
        index: usize,
        direction: MoveDirection,
    ) -> Result<bool, MeshAnnotateError> {
        self.check_index(index)?;
        let target = match direction {
            MoveDirection::Up if index > 0 => index - 1,
            MoveDirection::Down if index + 1 < self.layers.len() => index + 1,
            _ => return Ok(false),
        };
        self.layers.swap(index, target);
        if self.active_index == index {
            self.active_index = target;
        } else if self.active_index == target {
            self.active_index = index;
        }
        Ok(true)
    }

    pub fn rename(&mut self, index: usize, name: &str) -> Result<(), MeshAnnotateError> {
        self.check_index(index)?;
        self.layers[index].name = name.to_string();
        Ok(())
    }

    pub fn set_color(&mut self, index: usize, color: Color) -> Result<(), MeshAnnotateError> {
        self.check_index(index)?;
        self.layers[index].color = clamp_color(color);
        Ok(())
    }

    pub fn set_visible(&mut self, index: usize, visible: bool) -> Result<(), MeshAnnotateError> {
        self.check_index(index)?;
        self.layers[index].visible = visible;
        Ok(())
    }

    fn clamp_active(&mut self) {
        self.active_index = self.active_index.min(self.layers.len().saturating_sub(1));
    }

    fn check_index(&self, index: usize) -> Result<(), MeshAnnotateError> {
        if index < self.layers.len() {
            Ok(())
        } else {
            Err(MeshAnnotateError::LayerIndexOutOfRange {
                element_type: self.element_type,
                index,
                len: self.layers.len(),
            })
        }
    }
}

fn capitalized(ty: ElementType) -> &'static str {
    match ty {
        ElementType::Vert => "Vertex",
        ElementType::Edge => "Edge",
        ElementType::Face => "Face",
    }
}

impl DebugInvariants for LayerCatalog {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "LayerCatalog invalid");
    }

    fn validate_invariants(&self) -> Result<(), MeshAnnotateError> {
        let invalid = |msg: String| Err(MeshAnnotateError::InvalidCatalog(msg));
        if self.next_id == 0 || self.next_id > MAX_NEXT_ID {
            return invalid(format!("id counter {} out of range", self.next_id));
        }
        let mut seen = std::collections::HashSet::new();
        for layer in &self.layers {
            if layer.element_type() != self.element_type {
                return invalid(format!(
                    "layer {} is a {} layer in the {} catalog",
                    layer.id(),
                    layer.element_type(),
                    self.element_type
                ));
            }
            if layer.color.iter().any(|c| !(0.0..=1.0).contains(c)) {
                return invalid(format!(
                    "layer {} color {:?} outside [0, 1]",
                    layer.id(),
                    layer.color
                ));
            }
            if !seen.insert(layer.id()) {
                return invalid(format!("duplicate layer id {}", layer.id()));
            }
            if layer.id().get() == 0 || layer.id().get() >= self.next_id {
                return invalid(format!(
                    "layer id {} not below counter {}",
                    layer.id(),
                    self.next_id
                ));
            }
        }
        if self.active_index >= self.layers.len().max(1) {
            return invalid(format!(
                "active index {} out of range for {} layer(s)",
                self.active_index,
                self.layers.len()
            ));
        }
        Ok(())
    }
}
