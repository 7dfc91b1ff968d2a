//! Re-export public algorithms.

pub mod loops;
pub mod overlay;
pub mod sync;

pub use loops::resolve_loop;
pub use overlay::OverlayBatchBuilder;
pub use sync::SyncEngine;
