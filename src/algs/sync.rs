//! `SyncEngine`: every assignment mutation, wrapped in the repair pipeline.
//!
//! Each mutating operation runs to completion in one pass:
//!
//! 1. **prune**: load the persisted map and drop indices beyond the current
//!    element count (the mesh may have changed since the last write);
//! 2. **merge**: fold each element's cache stack into the map, cache winning;
//! 3. **normalize**: drop unknown or duplicate ids and restore catalog order;
//! 4. **mutate**;
//! 5. **write back**: persist the map, then rewrite both cache fields of
//!    every element from the fresh stacks, then request a redraw.
//!
//! Preconditions (layer exists, target set non-empty) are checked before step
//! 1, so a failed operation leaves both the blob and the caches untouched.

use crate::algs::loops::{ResolvedLoop, resolve_loop};
use crate::data::assignment::AssignmentMap;
use crate::data::element_cache::{decode_stack, encode_stack, top_of};
use crate::data::settings::AnnotationSettings;
use crate::debug_invariants::DebugInvariants;
use crate::layers::catalog::MoveDirection;
use crate::layers::layer::{Color, Layer, LayerId};
use crate::mesh_error::MeshAnnotateError;
use crate::topology::element::ElementType;
use crate::topology::host::{ElementCacheStore, MeshHost, MeshTopology, SeamFlags};

/// Which elements an operation applies to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Targets {
    /// Every currently selected element of the operation's type.
    Selection,
    /// Explicit indices; out-of-range and repeated entries are ignored.
    Indices(Vec<usize>),
}

/// Which layer ids a clear removes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayerFilter {
    /// Any layer (wildcard).
    Any,
    /// Only this layer.
    Only(LayerId),
}

/// How much of each stack a clear removes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClearMode {
    /// Every id matching the filter; with [`LayerFilter::Any`], the whole stack.
    All,
    /// Only the top id of each stack ("undo last tag"). With
    /// [`LayerFilter::Only`], the top is removed only if it is that layer.
    Top,
}

/// Read the repaired assignment view of `ty` without writing anything.
///
/// Runs the prune, merge and normalize steps of the pipeline.
pub fn materialize<H>(settings: &AnnotationSettings, mesh: &H, ty: ElementType) -> AssignmentMap
where
    H: MeshTopology + ElementCacheStore + ?Sized,
{
    let mut map = settings.load_assignments(ty);
    let count = mesh.element_count(ty);
    map.prune_to_valid_indices(count);
    for index in 0..count {
        let raw = mesh.cache_stack(ty, index);
        if !raw.is_empty() {
            map.merge_cache(index, &decode_stack(&raw));
        }
    }
    let repaired = map.normalize(settings.catalog(ty));
    if repaired > 0 {
        log::debug!("normalized {repaired} {ty} stack(s) against the catalog");
    }
    map.debug_assert_invariants();
    map
}

/// Runs annotation operations for one object against one host mesh.
///
/// Both borrows are held only for the lifetime of the engine, which is meant
/// to be constructed per operation or per batch of operations.
#[derive(Debug)]
pub struct SyncEngine<'a, H: ?Sized> {
    settings: &'a mut AnnotationSettings,
    mesh: &'a mut H,
}

impl<'a, H: MeshHost + ?Sized> SyncEngine<'a, H> {
    pub fn new(settings: &'a mut AnnotationSettings, mesh: &'a mut H) -> Self {
        Self { settings, mesh }
    }

    pub fn settings(&self) -> &AnnotationSettings {
        self.settings
    }

    pub fn mesh(&self) -> &H {
        self.mesh
    }

    /// Repaired view of `ty`; see [`materialize`].
    pub fn materialize(&self, ty: ElementType) -> AssignmentMap {
        materialize(self.settings, self.mesh, ty)
    }

    fn commit(&mut self, ty: ElementType, map: &AssignmentMap) {
        self.settings.save_assignments(ty, map);
        for index in 0..self.mesh.element_count(ty) {
            let stack = map.stack(index);
            self.mesh.set_cache_top(ty, index, top_of(stack));
            self.mesh.set_cache_stack(ty, index, encode_stack(stack));
        }
        self.mesh.request_redraw();
    }

    fn require_layer(&self, ty: ElementType, id: LayerId) -> Result<(), MeshAnnotateError> {
        if self.settings.catalog(ty).contains(id) {
            Ok(())
        } else {
            Err(MeshAnnotateError::UnknownLayer {
                element_type: ty,
                id,
            })
        }
    }

    fn active_layer(&self, ty: ElementType) -> Result<LayerId, MeshAnnotateError> {
        self.settings
            .catalog(ty)
            .active()
            .map(Layer::id)
            .ok_or(MeshAnnotateError::NoActiveLayer(ty))
    }

    fn resolve_targets(
        &self,
        ty: ElementType,
        targets: &Targets,
    ) -> Result<Vec<usize>, MeshAnnotateError> {
        let count = self.mesh.element_count(ty);
        let mut indices = match targets {
            Targets::Selection => self.mesh.selected(ty),
            Targets::Indices(raw) => raw.iter().copied().filter(|&i| i < count).collect(),
        };
        indices.sort_unstable();
        indices.dedup();
        if indices.is_empty() {
            return Err(MeshAnnotateError::EmptyTarget(ty));
        }
        Ok(indices)
    }

    /// Put layer `id` on top-of-order position in each target's stack.
    ///
    /// Returns the number of elements assigned.
    ///
    /// # Errors
    /// `UnknownLayer` or `EmptyTarget`; nothing is written in either case.
    pub fn assign(
        &mut self,
        ty: ElementType,
        id: LayerId,
        targets: &Targets,
    ) -> Result<usize, MeshAnnotateError> {
        self.require_layer(ty, id)?;
        let indices = self.resolve_targets(ty, targets)?;
        let mut map = self.materialize(ty);
        let order = self.settings.catalog(ty).order_index();
        for &index in &indices {
            map.assign(index, id, &order);
        }
        self.commit(ty, &map);
        log::debug!("assigned {ty} layer {id} to {} element(s)", indices.len());
        Ok(indices.len())
    }

    /// [`assign`](Self::assign) with the catalog's active layer.
    pub fn assign_active(
        &mut self,
        ty: ElementType,
        targets: &Targets,
    ) -> Result<usize, MeshAnnotateError> {
        let id = self.active_layer(ty)?;
        self.assign(ty, id, targets)
    }

    /// Expand the current selection of `ty` to a loop, then assign `id` to it.
    ///
    /// If loop resolution fails nothing is assigned and the selection is left
    /// as it was.
    pub fn assign_loop(
        &mut self,
        ty: ElementType,
        id: LayerId,
    ) -> Result<ResolvedLoop, MeshAnnotateError> {
        self.require_layer(ty, id)?;
        let resolved = resolve_loop(self.mesh, ty)?;
        self.assign(ty, id, &Targets::Indices(resolved.elements.clone()))?;
        Ok(resolved)
    }

    /// Remove layers from the target elements.
    ///
    /// Returns the number of elements whose stack changed.
    pub fn clear(
        &mut self,
        ty: ElementType,
        filter: LayerFilter,
        targets: &Targets,
        mode: ClearMode,
    ) -> Result<usize, MeshAnnotateError> {
        if let LayerFilter::Only(id) = filter {
            self.require_layer(ty, id)?;
        }
        let indices = self.resolve_targets(ty, targets)?;
        let mut map = self.materialize(ty);
        let mut changed = 0;
        for &index in &indices {
            let hit = match (mode, filter) {
                (ClearMode::All, LayerFilter::Any) => map.clear_index(index),
                (ClearMode::All, LayerFilter::Only(id)) => map.remove_id(index, id),
                (ClearMode::Top, LayerFilter::Any) => map.remove_top(index, None).is_some(),
                (ClearMode::Top, LayerFilter::Only(id)) => {
                    map.remove_top(index, Some(id)).is_some()
                }
            };
            changed += usize::from(hit);
        }
        self.commit(ty, &map);
        log::debug!("cleared {ty} layers ({mode:?}, {filter:?}) on {changed} element(s)");
        Ok(changed)
    }

    /// Strip layer `id` from every element of `ty`.
    pub fn clear_layer(&mut self, ty: ElementType, id: LayerId) -> Result<usize, MeshAnnotateError> {
        self.require_layer(ty, id)?;
        let mut map = self.materialize(ty);
        let touched = map.strip_layer(id);
        self.commit(ty, &map);
        Ok(touched)
    }

    /// Append a new layer to the catalog of `ty` and make it active.
    pub fn create_layer(
        &mut self,
        ty: ElementType,
        name: Option<&str>,
        color: Option<Color>,
    ) -> Result<LayerId, MeshAnnotateError> {
        let seed = self.settings.color_seed;
        self.settings.catalog_mut(ty).create(name, color, seed)
    }

    /// Create a layer and immediately assign it to `targets`.
    ///
    /// If there is nothing to assign, the new layer is removed again and its
    /// id handed back to the counter, so the failed attempt leaves no trace.
    pub fn create_layer_and_assign(
        &mut self,
        ty: ElementType,
        name: Option<&str>,
        color: Option<Color>,
        targets: &Targets,
    ) -> Result<(LayerId, usize), MeshAnnotateError> {
        let id = self.create_layer(ty, name, color)?;
        match self.assign(ty, id, targets) {
            Ok(n) => Ok((id, n)),
            Err(err) => {
                self.settings.catalog_mut(ty).rollback_create(id);
                Err(err)
            }
        }
    }

    /// Remove the layer at catalog position `index`, stripping its id from
    /// every stack of `ty`.
    pub fn remove_layer(
        &mut self,
        ty: ElementType,
        index: usize,
    ) -> Result<Layer, MeshAnnotateError> {
        let mut map = self.materialize(ty);
        let layer = self.settings.catalog_mut(ty).remove(index)?;
        let touched = map.strip_layer(layer.id());
        self.commit(ty, &map);
        log::debug!(
            "removed {ty} layer {} ({:?}); stripped from {touched} element(s)",
            layer.id(),
            layer.name
        );
        Ok(layer)
    }

    /// Move the layer at `index` one step and re-normalize every stack of
    /// `ty` to the new order. Returns `Ok(false)` if it was already at the end.
    pub fn move_layer(
        &mut self,
        ty: ElementType,
        index: usize,
        direction: MoveDirection,
    ) -> Result<bool, MeshAnnotateError> {
        if !self.settings.catalog_mut(ty).move_layer(index, direction)? {
            return Ok(false);
        }
        let map = self.materialize(ty);
        self.commit(ty, &map);
        Ok(true)
    }

    /// Re-run the repair pipeline and write back, with no other change.
    ///
    /// Hosts call this after editing topology so stale indices disappear
    /// from the persisted blob right away instead of on the next operation.
    pub fn resync(&mut self, ty: ElementType) {
        let map = self.materialize(ty);
        self.commit(ty, &map);
    }

    /// Select every element of `ty` carrying layer `id`.
    ///
    /// Without `extend`, the previous selection of `ty` is cleared first.
    /// Returns the number of elements selected.
    pub fn select_layer_elements(
        &mut self,
        ty: ElementType,
        id: LayerId,
        extend: bool,
    ) -> Result<usize, MeshAnnotateError> {
        self.require_layer(ty, id)?;
        let members = self.materialize(ty).indices_for_layer(id);
        if !extend {
            self.mesh.deselect_all(ty);
        }
        for &index in &members {
            self.mesh.set_selected(ty, index, true);
        }
        self.mesh.request_redraw();
        Ok(members.len())
    }

    /// Repaired stack of one element.
    pub fn stack_for(&self, ty: ElementType, index: usize) -> Vec<LayerId> {
        self.materialize(ty).stack(index).to_vec()
    }

    /// Number of elements of `ty` carrying `id`.
    pub fn count_for_layer(&self, ty: ElementType, id: LayerId) -> usize {
        self.materialize(ty).count_for_layer(id)
    }

    /// Elements of `ty` carrying `id`, ascending.
    pub fn indices_for_layer(&self, ty: ElementType, id: LayerId) -> Vec<usize> {
        self.materialize(ty).indices_for_layer(id)
    }
}

impl<H: MeshHost + SeamFlags + ?Sized> SyncEngine<'_, H> {
    /// Set the seam flag on every edge carrying edge layer `id`.
    ///
    /// With `exclusive`, seams on all other edges are cleared. Returns the
    /// number of edges marked.
    pub fn mark_seams(&mut self, id: LayerId, exclusive: bool) -> Result<usize, MeshAnnotateError> {
        self.require_layer(ElementType::Edge, id)?;
        let map = self.materialize(ElementType::Edge);
        let mut marked = 0;
        for edge in 0..self.mesh.element_count(ElementType::Edge) {
            if map.stack(edge).contains(&id) {
                self.mesh.set_seam(edge, true);
                marked += 1;
            } else if exclusive {
                self.mesh.set_seam(edge, false);
            }
        }
        self.mesh.request_redraw();
        Ok(marked)
    }
}
