//! # CLI Argument Definitions

use clap::{Parser, Subcommand};
use lineage_logger::LevelFilter;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "lineage")]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(arg_required_else_help = true)]
#[command(about = "Inspect a hierarchy manifest")]
pub(crate) struct Cli {
    /// Manifest file (TOML, JSON, YAML, ...); `LINEAGE__*` variables override its values
    #[arg(short, long, global = true, default_value = "lineage.toml")]
    pub(crate) manifest: PathBuf,

    /// Log level written to stderr (`RUST_LOG` takes precedence)
    #[arg(long, global = true, default_value = "warn")]
    pub(crate) log_level: LevelFilter,

    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// List every unit in creation order
    Units,
    /// Print the transitive ancestors of a unit, nearest first
    Ancestors { unit: String },
    /// Print the values of a declaration inherited by a unit
    Inherited {
        unit: String,
        name: String,
        /// Include the unit's own value
        #[arg(long)]
        effective: bool,
    },
    /// Call a capability accessor, extending the unit on demand
    Invoke { unit: String, method: String },
    /// Print the capabilities a unit carries
    Capabilities {
        unit: String,
        /// Attach inherited extensions to every unit first
        #[arg(long)]
        propagate: bool,
    },
}
