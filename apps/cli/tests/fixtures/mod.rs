use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

pub const SHOP: &str = r#"
[[capabilities]]
name = "scopes"
accessors = ["scopes"]

[[units]]
name = "Record"
capabilities = ["scopes"]
[units.declarations]
scopes = "all"

[[units]]
name = "Archivable"
[units.declarations]
scopes = "archived"

[[units]]
name = "Order"
composes = ["Archivable", "Record"]
[units.declarations]
scopes = "recent"
"#;

/// Writes the shop manifest into a fresh temporary directory.
///
/// # Panics
/// * If the file cannot be written.
#[must_use]
pub fn shop_manifest() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("shop.toml");
    std::fs::write(&path, SHOP).expect("Failed to write manifest");
    (dir, path)
}

/// The `lineage` binary pointed at `manifest`.
#[must_use]
pub fn lineage(manifest: &Path) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_lineage"));
    command.arg("--manifest").arg(manifest);
    command
}
