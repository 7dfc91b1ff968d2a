//! Mesh topology as seen by the annotation core.
//!
//! - [`element`]: the three element kinds and per-kind storage
//! - [`host`]: capability traits a host mesh editor implements
//! - [`in_memory`]: a self-contained reference host
//! - [`loop_walk`]: local loop-stepping rules over any host

pub mod element;
pub mod host;
pub mod in_memory;
pub mod loop_walk;

pub use element::{ElementType, PerElement};
pub use host::{ElementCacheStore, LoopSelect, MeshHost, MeshTopology, SelectionState};
