use crate::error::{ManifestError, ManifestErrorExt};
use crate::schema::Manifest;
use config::{Config, Environment, File};
use lineage_core::Hierarchy;
use serde_json::Value;
use std::path::Path;
use tracing::info;

/// Prefix of environment variables overriding manifest values.
pub const ENV_PREFIX: &str = "LINEAGE";
/// Separator between nested keys in environment variables.
pub const ENV_SEPARATOR: &str = "__";

/// Loads a manifest, layering environment overrides over the file.
///
/// 1. **File**: required; the format (TOML, JSON, YAML, ...) follows the extension.
/// 2. **Environment**: variables prefixed with `LINEAGE__`, nested keys separated by
///    `__` (e.g. `LINEAGE__SETTINGS__ORDER=farthest_first`).
///
/// # Errors
/// [`ManifestError::Config`] when the file is missing or malformed, or when its content
/// does not match the manifest schema.
///
/// # Example
/// ```rust,no_run
/// use lineage_manifest::load_manifest;
///
/// let manifest = load_manifest("lineage.toml")?;
/// let hierarchy = manifest.build()?;
/// # Ok::<(), lineage_manifest::ManifestError>(())
/// ```
pub fn load_manifest(path: impl AsRef<Path>) -> Result<Manifest, ManifestError> {
    load(path.as_ref(), Environment::with_prefix(ENV_PREFIX))
}

/// Like [`load_manifest`], reading overrides from `vars` instead of the process environment.
///
/// # Errors
/// Same as [`load_manifest`].
pub fn load_manifest_with_env<I, K, V>(
    path: impl AsRef<Path>,
    vars: I,
) -> Result<Manifest, ManifestError>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let vars = vars.into_iter().map(|(key, value)| (key.into(), value.into())).collect();
    load(path.as_ref(), Environment::with_prefix(ENV_PREFIX).source(Some(vars)))
}

/// Loads, validates and builds a hierarchy in one step.
///
/// # Errors
/// Everything [`load_manifest`] and [`Manifest::build`] report.
pub fn build_hierarchy(path: impl AsRef<Path>) -> Result<Hierarchy<Value>, ManifestError> {
    load_manifest(path)?.build()
}

fn load(path: &Path, environment: Environment) -> Result<Manifest, ManifestError> {
    info!("Loading manifest from {}", path.display());

    let manifest = Config::builder()
        .add_source(File::from(path).required(true))
        .add_source(environment.separator(ENV_SEPARATOR))
        .build()
        .context("Failed to build manifest")?
        .try_deserialize::<Manifest>()
        .context("Failed to deserialize manifest")?;

    Ok(manifest)
}
