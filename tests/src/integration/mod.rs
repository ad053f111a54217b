//! Cross-crate protocol scenarios.

pub mod api_surface;
pub mod registry_semantics;
pub mod visibility;
