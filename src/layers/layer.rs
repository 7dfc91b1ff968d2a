//! Layer records and their identifiers.

use std::fmt;

use crate::topology::element::ElementType;

/// RGBA color, every component in `[0, 1]`.
pub type Color = [f32; 4];

/// Identifier of a layer, unique within one element type.
///
/// Ids are allocated from a per-type counter starting at 1 and are never
/// reused, even after the layer is removed. The element cache uses `-1` for
/// "no layer", so a valid id always fits in a positive `i32`.
#[derive(
    Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct LayerId(u32);

impl LayerId {
    /// Wraps a raw id; `0` and values above `i32::MAX` are rejected.
    #[inline]
    pub fn new(raw: u32) -> Option<Self> {
        (raw != 0 && raw <= i32::MAX as u32).then_some(LayerId(raw))
    }

    /// Accepts the signed integers found in persisted blobs.
    #[inline]
    pub fn from_i64(raw: i64) -> Option<Self> {
        u32::try_from(raw).ok().and_then(Self::new)
    }

    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Value written to the element cache top field.
    #[inline]
    pub const fn as_cache_top(self) -> i32 {
        self.0 as i32
    }
}

impl fmt::Debug for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LayerId").field(&self.0).finish()
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named, colored annotation layer.
///
/// The layer's order is implicit: its position in the owning
/// [`LayerCatalog`](crate::layers::catalog::LayerCatalog).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Layer {
    id: LayerId,
    element_type: ElementType,
    pub name: String,
    pub color: Color,
    pub visible: bool,
}

impl Layer {
    pub(crate) fn new(id: LayerId, element_type: ElementType, name: String, color: Color) -> Self {
        Self {
            id,
            element_type,
            name,
            color: clamp_color(color),
            visible: true,
        }
    }

    #[inline]
    pub fn id(&self) -> LayerId {
        self.id
    }

    /// Fixed at creation.
    #[inline]
    pub fn element_type(&self) -> ElementType {
        self.element_type
    }
}

/// Clamp every component into `[0, 1]`; NaN becomes 0.
pub fn clamp_color(color: Color) -> Color {
    color.map(|c| if c.is_nan() { 0.0 } else { c.clamp(0.0, 1.0) })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_id_rejects_zero_and_negative() {
        assert!(LayerId::new(0).is_none());
        assert!(LayerId::from_i64(-1).is_none());
        assert!(LayerId::from_i64(i64::from(i32::MAX) + 1).is_none());
        assert_eq!(LayerId::from_i64(7).map(LayerId::get), Some(7));
    }

    #[test]
    fn serde_is_a_bare_integer() {
        let id = LayerId::new(3).unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "3");
    }

    #[test]
    fn colors_are_clamped() {
        assert_eq!(clamp_color([1.5, -0.2, f32::NAN, 0.5]), [1.0, 0.0, 0.0, 0.5]);
    }
}
