use std::path::PathBuf;
use tempfile::TempDir;

pub const BLOG: &str = r#"
[settings]
order = "nearest_first"

[[capabilities]]
name = "validations"
accessors = ["validations"]

[[capabilities]]
name = "callbacks"
accessors = ["callbacks"]
requires = ["validations"]

[[units]]
name = "Post"
composes = ["Publishable", "Record"]
[units.declarations]
validations = "title"

[[units]]
name = "Record"
capabilities = ["validations"]
[units.declarations]
validations = "id"

[[units]]
name = "Publishable"
composes = ["Record"]
capabilities = ["callbacks"]
[units.declarations]
validations = "published_at"
callbacks = "notify"
"#;

/// Writes `content` to `file_name` inside a fresh temporary directory.
///
/// # Panics
/// * If the file cannot be written.
#[must_use]
pub fn write_manifest(file_name: &str, content: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join(file_name);
    std::fs::write(&path, content).expect("Failed to write manifest");
    (dir, path)
}
