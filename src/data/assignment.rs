//! `AssignmentMap`: sparse element index → ordered layer stack.
//!
//! This is the canonical, persisted side of the dual representation. One map
//! exists per element type and is stored as a JSON object mapping the decimal
//! element index to a list of integer layer ids, e.g. `{"0":[2],"7":[1,3]}`.
//!
//! The map tolerates stale input: unknown ids, duplicate ids, out-of-range
//! indices and catalog reordering are all repaired by [`prune_to_valid_indices`]
//! and [`normalize`], never reported as errors.
//!
//! [`prune_to_valid_indices`]: AssignmentMap::prune_to_valid_indices
//! [`normalize`]: AssignmentMap::normalize

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::data::element_cache::CachedStack;
use crate::debug_invariants::DebugInvariants;
use crate::layers::catalog::LayerCatalog;
use crate::layers::layer::LayerId;
use crate::mesh_error::MeshAnnotateError;

/// Ordered layer ids on one element, bottom first. The last entry is the top.
pub type Stack = Vec<LayerId>;

/// Sparse per-type assignment mapping.
///
/// # Invariants
///
/// - No stack is empty; an element with no layers has no key.
/// - No stack contains the same id twice.
///
/// Catalog-dependent invariants (ids exist, order matches the catalog) are
/// restored by [`normalize`](Self::normalize) rather than enforced on every
/// mutation, because the catalog may change independently.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AssignmentMap {
    stacks: BTreeMap<usize, Stack>,
}

impl AssignmentMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a persisted blob.
    ///
    /// Any parse failure (including non-integer keys or ids) yields an empty
    /// map. A Python-style dict literal with single quotes is accepted too.
    /// Non-positive ids are dropped, duplicate ids collapse to their first
    /// occurrence and empty stacks are discarded.
    pub fn load(blob: &str) -> Self {
        let trimmed = blob.trim();
        if trimmed.is_empty() {
            return Self::default();
        }
        let parsed = serde_json::from_str::<BTreeMap<usize, Vec<i64>>>(trimmed).or_else(|err| {
            if trimmed.contains('\'') {
                serde_json::from_str(&trimmed.replace('\'', "\""))
            } else {
                Err(err)
            }
        });
        let raw = match parsed {
            Ok(raw) => raw,
            Err(err) => {
                log::debug!("discarding unparsable assignment blob: {err}");
                return Self::default();
            }
        };

        let mut map = Self::default();
        for (index, ids) in raw {
            let mut seen = HashSet::new();
            let stack: Stack = ids
                .into_iter()
                .filter_map(LayerId::from_i64)
                .filter(|id| seen.insert(*id))
                .collect();
            map.set_stack(index, stack);
        }
        map
    }

    /// Serialize every non-empty stack, keys in ascending index order.
    pub fn save(&self) -> String {
        let nonempty: BTreeMap<usize, &Stack> = self
            .stacks
            .iter()
            .filter(|(_, s)| !s.is_empty())
            .map(|(&i, s)| (i, s))
            .collect();
        match serde_json::to_string(&nonempty) {
            Ok(s) => s,
            Err(err) => {
                log::warn!("failed to serialize assignment map: {err}");
                String::from("{}")
            }
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.stacks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.stacks.is_empty()
    }

    /// Stack of `index`, empty if unassigned.
    pub fn stack(&self, index: usize) -> &[LayerId] {
        self.stacks.get(&index).map_or(&[], Vec::as_slice)
    }

    /// Top layer of `index`.
    pub fn top(&self, index: usize) -> Option<LayerId> {
        self.stacks.get(&index).and_then(|s| s.last().copied())
    }

    /// `(index, stack)` pairs in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[LayerId])> + '_ {
        self.stacks.iter().map(|(&i, s)| (i, s.as_slice()))
    }

    /// Indices with at least one layer, ascending.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.stacks.keys().copied()
    }

    /// Replace the stack of `index`; an empty stack removes the key.
    pub fn set_stack(&mut self, index: usize, stack: Stack) {
        if stack.is_empty() {
            self.stacks.remove(&index);
        } else {
            self.stacks.insert(index, stack);
        }
    }

    /// Drop every entry at or beyond `count`. Returns how many were dropped.
    pub fn prune_to_valid_indices(&mut self, count: usize) -> usize {
        let stale = self.stacks.split_off(&count);
        if !stale.is_empty() {
            log::debug!(
                "pruned {} assignment(s) beyond element count {count}",
                stale.len()
            );
        }
        stale.len()
    }

    /// Fold one element's cache into the map.
    ///
    /// A complete cache wins outright. A truncated cache is unioned with the
    /// stored stack so ids that only the mapping still holds are kept.
    /// Order is not restored here; call [`normalize`](Self::normalize).
    pub fn merge_cache(&mut self, index: usize, cached: &CachedStack) {
        if cached.is_empty() {
            return;
        }
        if !cached.truncated {
            self.set_stack(index, cached.ids.clone());
            return;
        }
        let stack = self.stacks.entry(index).or_default();
        for id in &cached.ids {
            if !stack.contains(id) {
                stack.push(*id);
            }
        }
    }

    /// Restore catalog order on every stack, dropping unknown and duplicate
    /// ids and then empty stacks. Returns how many stacks changed.
    pub fn normalize(&mut self, catalog: &LayerCatalog) -> usize {
        let order = catalog.order_index();
        let mut changed = 0;
        self.stacks.retain(|_, stack| {
            if normalize_stack(stack, &order) {
                changed += 1;
            }
            !stack.is_empty()
        });
        changed
    }

    /// Put `id` on top of whatever else `index` carries, then restore catalog
    /// order. Assigning twice is the same as assigning once.
    pub fn assign(&mut self, index: usize, id: LayerId, order: &HashMap<LayerId, usize>) {
        let stack = self.stacks.entry(index).or_default();
        stack.retain(|&s| s != id);
        stack.push(id);
        normalize_stack(stack, order);
        if stack.is_empty() {
            self.stacks.remove(&index);
        }
    }

    /// Remove `id` from `index`. Returns whether it was present.
    pub fn remove_id(&mut self, index: usize, id: LayerId) -> bool {
        let Some(stack) = self.stacks.get_mut(&index) else {
            return false;
        };
        let before = stack.len();
        stack.retain(|&s| s != id);
        let removed = stack.len() != before;
        if stack.is_empty() {
            self.stacks.remove(&index);
        }
        removed
    }

    /// Remove the highest-ordered id of `index`, optionally only if it is
    /// `only`. The stack must already be normalized.
    pub fn remove_top(&mut self, index: usize, only: Option<LayerId>) -> Option<LayerId> {
        let stack = self.stacks.get_mut(&index)?;
        let top = *stack.last()?;
        if only.is_some_and(|id| id != top) {
            return None;
        }
        stack.pop();
        if stack.is_empty() {
            self.stacks.remove(&index);
        }
        Some(top)
    }

    /// Remove the whole stack of `index`. Returns whether one existed.
    pub fn clear_index(&mut self, index: usize) -> bool {
        self.stacks.remove(&index).is_some()
    }

    /// Strip `id` from every stack. Returns how many stacks held it.
    pub fn strip_layer(&mut self, id: LayerId) -> usize {
        let mut touched = 0;
        self.stacks.retain(|_, stack| {
            let before = stack.len();
            stack.retain(|&s| s != id);
            if stack.len() != before {
                touched += 1;
            }
            !stack.is_empty()
        });
        touched
    }

    /// Number of elements carrying `id`.
    pub fn count_for_layer(&self, id: LayerId) -> usize {
        self.stacks.values().filter(|s| s.contains(&id)).count()
    }

    /// Elements carrying `id`, ascending.
    pub fn indices_for_layer(&self, id: LayerId) -> Vec<usize> {
        self.stacks
            .iter()
            .filter(|(_, s)| s.contains(&id))
            .map(|(&i, _)| i)
            .collect()
    }
}

/// Sort `stack` by catalog position, dropping ids absent from `order` and
/// repeated ids. Returns whether anything changed.
pub fn normalize_stack(stack: &mut Stack, order: &HashMap<LayerId, usize>) -> bool {
    let before = stack.clone();
    stack.retain(|id| order.contains_key(id));
    stack.sort_by_key(|id| order[id]);
    stack.dedup();
    *stack != before
}

impl DebugInvariants for AssignmentMap {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "AssignmentMap invalid");
    }

    fn validate_invariants(&self) -> Result<(), MeshAnnotateError> {
        for (&index, stack) in &self.stacks {
            if stack.is_empty() {
                return Err(MeshAnnotateError::InvalidAssignment(format!(
                    "empty stack stored for element {index}"
                )));
            }
            let mut seen = HashSet::new();
            if let Some(dup) = stack.iter().find(|id| !seen.insert(**id)) {
                return Err(MeshAnnotateError::InvalidAssignment(format!(
                    "layer {dup} appears twice on element {index}"
                )));
            }
        }
        Ok(())
    }
}
