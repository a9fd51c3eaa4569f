//! # Lineage Core
//!
//! Ancestor-aware declaration storage for units composed into a DAG.
//!
//! ## Overview
//!
//! Every unit owns local declarations (name to value). A unit composed from others sees
//! the values its ancestors declared, collected in a deterministic order, computed on
//! first read and cached. Any write on an ancestor clears the caches of everything that
//! read through it, transitively, before the write returns.
//!
//! ## Features
//!
//! * **Deterministic ancestry**: depth-first, edges in insertion order, each ancestor once.
//! * **Cycle safety**: an edge that would close a cycle is refused and leaves the graph intact.
//! * **Lazy caches**: sequences and aggregations are memoized per unit and name.
//! * **Capabilities**: named accessor bundles, attached on demand when a dependent calls a
//!   method only its ancestors provide.
//! * **Thread safe**: `FxHashMap` + `parking_lot::RwLock` behind a cheap `Clone` handle.
//!
//! # Example
//!
//! ```rust
//! use lineage_core::{Hierarchy, LineageError};
//!
//! fn main() -> Result<(), LineageError> {
//!     let hierarchy = Hierarchy::<&'static str>::new();
//!     let record = hierarchy.create_unit("Record")?;
//!     let audited = hierarchy.create_unit("Audited")?;
//!     let invoice = hierarchy.create_unit("Invoice")?;
//!     hierarchy.compose(invoice, audited)?;
//!     hierarchy.compose(audited, record)?;
//!
//!     hierarchy.local_set(record, "table", "records")?;
//!     assert_eq!(&*hierarchy.inherited(invoice, "table")?, ["records"]);
//!
//!     // Writes on an ancestor reach every cached dependent.
//!     hierarchy.local_set(audited, "table", "audits")?;
//!     assert_eq!(&*hierarchy.inherited(invoice, "table")?, ["audits", "records"]);
//!     Ok(())
//! }
//! ```

mod cache;
mod capability;
mod config;
mod dispatch;
mod error;
mod graph;
mod hierarchy;
mod store;
mod unit;

pub use capability::{Accessor, AttachHook, Capability, CapabilityBuilder, CapabilityKind};
pub use config::{AncestorOrder, HierarchyConfig};
pub use error::{LineageError, LineageErrorExt};
pub use hierarchy::{Declaration, Hierarchy, HierarchyBuilder};
pub use unit::UnitId;
