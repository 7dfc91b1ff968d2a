//! Data module: assignment mapping, element cache and persisted settings

pub mod assignment;
pub mod element_cache;
pub mod settings;
