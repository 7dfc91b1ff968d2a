//! Structural self-checks for layer catalogs and assignment maps.
//!
//! `LayerCatalog` and `AssignmentMap` implement [`DebugInvariants`]; their
//! mutators run the checks through [`debug_invariants!`](crate::debug_invariants)
//! and `AnnotationSettings::from_json` uses `validate_invariants` to reject
//! loaded catalogs outright.

use crate::mesh_error::MeshAnnotateError;

/// Trait for validating data structure invariants.
pub trait DebugInvariants {
    /// Assert invariants in debug builds or when invariant checking is enabled.
    fn debug_assert_invariants(&self);
    /// Validate invariants and return the first error encountered.
    fn validate_invariants(&self) -> Result<(), MeshAnnotateError>;
}

/// Helper macro to run a fallible check and panic on error when invariant
/// checking is enabled.
#[macro_export]
macro_rules! debug_invariants {
    ($expr:expr, $($ctx:tt)*) => {
        #[cfg(any(debug_assertions, feature = "check-invariants"))]
        if let Err(e) = $expr {
            panic!(concat!("[invariants] ", $($ctx)*, ": {}"), e);
        }
    };
}
