//! Per-object annotation state.
//!
//! [`AnnotationSettings`] is the explicit context value every operation takes:
//! the three layer catalogs, the three persisted assignment blobs, the overlay
//! tuning parameters and the color seed. The host stores it alongside the
//! mesh object (for example as JSON via [`to_json`](AnnotationSettings::to_json)).

use crate::data::assignment::AssignmentMap;
use crate::layers::catalog::LayerCatalog;
use crate::mesh_error::MeshAnnotateError;
use crate::topology::element::{ElementType, PerElement};

/// Upper bound for [`OverlaySettings::edge_trim`]; beyond it segments vanish.
pub const MAX_EDGE_TRIM: f32 = 0.45;

/// Numeric knobs for the overlay drawing consumer.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct OverlaySettings {
    /// Line width for edge batches, in pixels.
    pub line_width: f32,
    /// Point size for vertex batches, in pixels.
    pub point_size: f32,
    /// Distance primitives are pushed along the normal to avoid z-fighting.
    pub face_offset: f32,
    /// Fraction of each edge trimmed from both ends, `[0, MAX_EDGE_TRIM]`.
    pub edge_trim: f32,
    /// Global alpha multiplier, `[0, 1]`.
    pub opacity: f32,
    /// Whether the consumer should draw back-facing primitives.
    pub show_backfaces: bool,
    /// Draw only the active layer of each type.
    pub solo_active: bool,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            line_width: 3.0,
            point_size: 8.0,
            face_offset: 0.002,
            edge_trim: 0.0,
            opacity: 0.5,
            show_backfaces: false,
            solo_active: false,
        }
    }
}

impl OverlaySettings {
    /// `edge_trim` clamped into its valid range.
    pub fn clamped_edge_trim(&self) -> f32 {
        if self.edge_trim.is_nan() {
            0.0
        } else {
            self.edge_trim.clamp(0.0, MAX_EDGE_TRIM)
        }
    }

    /// `opacity` clamped into `[0, 1]`.
    pub fn clamped_opacity(&self) -> f32 {
        if self.opacity.is_nan() {
            0.0
        } else {
            self.opacity.clamp(0.0, 1.0)
        }
    }
}

/// Everything persisted for one annotated mesh object.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AnnotationSettings {
    catalogs: PerElement<LayerCatalog>,
    blobs: PerElement<String>,
    #[serde(default)]
    pub overlay: OverlaySettings,
    /// Seed for automatic layer colors.
    #[serde(default)]
    pub color_seed: u64,
}

impl Default for AnnotationSettings {
    fn default() -> Self {
        Self {
            catalogs: PerElement::from_fn(LayerCatalog::new),
            blobs: PerElement::default(),
            overlay: OverlaySettings::default(),
            color_seed: 0,
        }
    }
}

impl AnnotationSettings {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn catalog(&self, ty: ElementType) -> &LayerCatalog {
        self.catalogs.get(ty)
    }

    #[inline]
    pub fn catalog_mut(&mut self, ty: ElementType) -> &mut LayerCatalog {
        self.catalogs.get_mut(ty)
    }

    /// The raw persisted assignment blob of `ty`.
    #[inline]
    pub fn blob(&self, ty: ElementType) -> &str {
        self.blobs.get(ty)
    }

    /// Overwrite the raw blob of `ty`, e.g. when restoring from a file.
    pub fn set_blob(&mut self, ty: ElementType, blob: impl Into<String>) {
        *self.blobs.get_mut(ty) = blob.into();
    }

    /// Parse the blob of `ty` without any repair against topology.
    pub fn load_assignments(&self, ty: ElementType) -> AssignmentMap {
        AssignmentMap::load(self.blob(ty))
    }

    /// Persist `map` as the blob of `ty`.
    pub fn save_assignments(&mut self, ty: ElementType, map: &AssignmentMap) {
        self.set_blob(ty, map.save());
    }

    pub fn to_json(&self) -> Result<String, MeshAnnotateError> {
        serde_json::to_string(self).map_err(|e| MeshAnnotateError::Settings(e.to_string()))
    }

    /// Restore settings; the catalogs are validated before being accepted.
    pub fn from_json(json: &str) -> Result<Self, MeshAnnotateError> {
        use crate::debug_invariants::DebugInvariants;

        let settings: Self =
            serde_json::from_str(json).map_err(|e| MeshAnnotateError::Settings(e.to_string()))?;
        for ty in ElementType::ALL {
            let catalog = settings.catalog(ty);
            if catalog.element_type() != ty {
                return Err(MeshAnnotateError::Settings(format!(
                    "{ty} catalog slot holds a {} catalog",
                    catalog.element_type()
                )));
            }
            catalog.validate_invariants()?;
        }
        Ok(settings)
    }
}
