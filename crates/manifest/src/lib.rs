//! # Lineage Manifest
//!
//! Describes a hierarchy as data: settings, capabilities and units with their edges and
//! local declarations. Manifests are read through the `config` crate, so any format it
//! understands works and environment variables can override individual values.
//!
//! ```toml
//! [settings]
//! order = "nearest_first"
//!
//! [[capabilities]]
//! name = "validations"
//! accessors = ["validations"]
//!
//! [[units]]
//! name = "Record"
//! capabilities = ["validations"]
//! [units.declarations]
//! validations = "presence"
//!
//! [[units]]
//! name = "Invoice"
//! composes = ["Record"]
//! ```

mod error;
mod loader;
mod schema;

pub use error::{ManifestError, ManifestErrorExt};
pub use loader::{ENV_PREFIX, ENV_SEPARATOR, build_hierarchy, load_manifest, load_manifest_with_env};
pub use schema::{CapabilityEntry, Manifest, UnitEntry};
