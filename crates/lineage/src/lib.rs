//! Facade crate for the lineage workspace.
//! Re-exports the hierarchy primitives and, behind the `manifest` feature, the manifest loader.
//! Keep this crate thin: it should compose other crates, not implement logic.
//!
//! ## Usage
//! - Add `lineage` (the `manifest` feature is on by default).
//! - `use lineage::prelude::*;` for the common types.

pub use lineage_core as primitives;
#[cfg(feature = "manifest")]
pub use lineage_manifest as manifest;

pub use lineage_core::{
    Accessor, AncestorOrder, AttachHook, Capability, CapabilityBuilder, CapabilityKind,
    Declaration, Hierarchy, HierarchyBuilder, HierarchyConfig, LineageError, LineageErrorExt,
    UnitId,
};

pub mod prelude {
    pub use lineage_core::{
        AncestorOrder, Capability, CapabilityKind, Hierarchy, LineageError, LineageErrorExt,
        UnitId,
    };
    #[cfg(feature = "manifest")]
    pub use lineage_manifest::{Manifest, ManifestError, build_hierarchy, load_manifest};
}

/// Build-time enabled features (by Cargo feature).
pub const ENABLED: &[&str] = &[
    "core",
    #[cfg(feature = "manifest")]
    "manifest",
];

#[must_use]
pub fn is_enabled(name: &str) -> bool {
    ENABLED.contains(&name)
}
