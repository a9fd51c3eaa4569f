#![allow(clippy::print_stdout)]

mod args;
mod commands;

use crate::args::{Cli, Command};
use anyhow::{Context, Result};
use clap::Parser;
use lineage::manifest::build_hierarchy;
use lineage_logger::Logger;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _logger =
        Logger::builder().name(env!("CARGO_PKG_NAME")).console(true).level(cli.log_level).init()?;

    let hierarchy = build_hierarchy(&cli.manifest)
        .with_context(|| format!("Failed to load {}", cli.manifest.display()))?;
    tracing::debug!(units = hierarchy.units().len(), "Manifest loaded");

    let output = match &cli.command {
        Command::Units => commands::units(&hierarchy)?,
        Command::Ancestors { unit } => commands::ancestors(&hierarchy, unit)?,
        Command::Inherited { unit, name, effective } => {
            commands::inherited(&hierarchy, unit, name, *effective)?
        },
        Command::Invoke { unit, method } => commands::invoke(&hierarchy, unit, method)?,
        Command::Capabilities { unit, propagate } => {
            commands::capabilities(&hierarchy, unit, *propagate)?
        },
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
