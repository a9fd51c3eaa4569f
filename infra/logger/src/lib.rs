//! # Logger
//!
//! Installs the global `tracing` subscriber for lineage binaries.
//!
//! * Console output is written to stderr, keeping stdout for command results.
//! * Optional rolling log files with non-blocking I/O.
//! * Use [`LoggerBuilder::env_filter`] for per-crate filters
//!   (e.g. `"lineage_core=trace"`); `RUST_LOG` applies otherwise.
//!
//! ## Example
//!
//! ```rust
//! # use lineage_logger::{Logger, LevelFilter};
//!
//! let _logger = Logger::builder()
//!     .name("lineage")
//!     .console(true)
//!     .level(LevelFilter::DEBUG)
//!     .init()
//!     .unwrap();
//! ```

mod builder;
mod error;

pub use crate::builder::{Logger, LoggerBuilder, NoFile, NoName, WithFile, WithName};
pub use crate::error::{LoggerError, LoggerErrorExt};
pub use tracing::level_filters::LevelFilter;
pub use tracing_appender::rolling::Rotation;
