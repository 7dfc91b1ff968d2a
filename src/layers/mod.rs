//! Layer records and the per-type catalogs that order them.

pub mod catalog;
pub mod color;
pub mod layer;

pub use catalog::{LayerCatalog, MoveDirection};
pub use layer::{Color, Layer, LayerId};
