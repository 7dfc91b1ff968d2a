//! `ElementType`: the three kinds of mesh element a layer can annotate.
//!
//! Every layer, every assignment mapping and every cache field is scoped to
//! exactly one element type; the three are fully independent.

use std::fmt;

/// Vertex, edge or face.
///
/// Serialized with the short upper-case tags used by the persisted layer
/// records (`"VERT"`, `"EDGE"`, `"FACE"`).
#[derive(
    Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, serde::Serialize, serde::Deserialize,
)]
pub enum ElementType {
    #[serde(rename = "VERT")]
    Vert,
    #[serde(rename = "EDGE")]
    Edge,
    #[serde(rename = "FACE")]
    Face,
}

impl ElementType {
    /// All element types in storage order.
    pub const ALL: [ElementType; 3] = [ElementType::Vert, ElementType::Edge, ElementType::Face];

    /// Dense slot used to index per-type arrays.
    #[inline]
    pub const fn slot(self) -> usize {
        match self {
            ElementType::Vert => 0,
            ElementType::Edge => 1,
            ElementType::Face => 2,
        }
    }

    /// The persisted tag.
    pub const fn tag(self) -> &'static str {
        match self {
            ElementType::Vert => "VERT",
            ElementType::Edge => "EDGE",
            ElementType::Face => "FACE",
        }
    }
}

/// Prints the lower-case noun, e.g. `face`.
impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let noun = match self {
            ElementType::Vert => "vertex",
            ElementType::Edge => "edge",
            ElementType::Face => "face",
        };
        f.write_str(noun)
    }
}

/// Small fixed array holding one value per element type.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PerElement<T> {
    pub vert: T,
    pub edge: T,
    pub face: T,
}

impl<T> PerElement<T> {
    /// Builds all three slots from a constructor.
    pub fn from_fn(mut f: impl FnMut(ElementType) -> T) -> Self {
        Self {
            vert: f(ElementType::Vert),
            edge: f(ElementType::Edge),
            face: f(ElementType::Face),
        }
    }

    #[inline]
    pub fn get(&self, ty: ElementType) -> &T {
        match ty {
            ElementType::Vert => &self.vert,
            ElementType::Edge => &self.edge,
            ElementType::Face => &self.face,
        }
    }

    #[inline]
    pub fn get_mut(&mut self, ty: ElementType) -> &mut T {
        match ty {
            ElementType::Vert => &mut self.vert,
            ElementType::Edge => &mut self.edge,
            ElementType::Face => &mut self.face,
        }
    }
}
