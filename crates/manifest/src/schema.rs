use crate::error::{ManifestError, ManifestErrorExt};
use lineage_core::{Capability, CapabilityKind, Hierarchy, HierarchyConfig, UnitId};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// A whole hierarchy described as data.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Manifest {
    pub settings: HierarchyConfig,
    pub capabilities: Vec<CapabilityEntry>,
    pub units: Vec<UnitEntry>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CapabilityEntry {
    pub name: String,
    #[serde(default)]
    pub kind: CapabilityKind,
    /// Each accessor returns the inherited values of the declaration with the same name.
    #[serde(default)]
    pub accessors: Vec<String>,
    #[serde(default)]
    pub requires: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UnitEntry {
    pub name: String,
    /// Direct ancestors, composed in this order.
    #[serde(default)]
    pub composes: Vec<String>,
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default)]
    pub declarations: Map<String, Value>,
}

impl Manifest {
    /// Checks names and cross references without building anything.
    ///
    /// # Errors
    /// - [`ManifestError::Invalid`] for empty or repeated names.
    /// - [`ManifestError::UnknownReference`] for edges or capabilities naming something
    ///   the manifest does not declare.
    pub fn validate(&self) -> Result<(), ManifestError> {
        let capabilities =
            unique_names(self.capabilities.iter().map(|c| c.name.as_str()), "capability")?;
        let units = unique_names(self.units.iter().map(|u| u.name.as_str()), "unit")?;

        for capability in &self.capabilities {
            for required in &capability.requires {
                if !capabilities.contains(required.as_str()) {
                    return Err(unknown(format!(
                        "capability `{}` requires undefined `{required}`",
                        capability.name
                    )));
                }
            }
        }
        for unit in &self.units {
            if let Some(ancestor) = unit.composes.iter().find(|a| !units.contains(a.as_str())) {
                return Err(unknown(format!(
                    "unit `{}` composes undefined `{ancestor}`",
                    unit.name
                )));
            }
            if let Some(missing) =
                unit.capabilities.iter().find(|c| !capabilities.contains(c.as_str()))
            {
                return Err(unknown(format!(
                    "unit `{}` carries undefined capability `{missing}`",
                    unit.name
                )));
            }
        }
        Ok(())
    }

    /// Builds a hierarchy from the manifest.
    ///
    /// All units are created first, then edges are added in listed order, then local
    /// declarations are stored and finally capabilities are attached, so units may be
    /// listed in any order.
    ///
    /// # Errors
    /// - Everything [`Manifest::validate`] reports.
    /// - [`ManifestError::Lineage`] when the hierarchy refuses an edge, e.g. a cycle.
    pub fn build(&self) -> Result<Hierarchy<Value>, ManifestError> {
        self.validate()?;
        let hierarchy = Hierarchy::builder().config(self.settings).build();

        for entry in &self.capabilities {
            hierarchy.define_capability(capability(entry)).context("Failed to define capability")?;
        }

        let mut ids = BTreeMap::new();
        for entry in &self.units {
            let unit = hierarchy.create_unit(entry.name.as_str()).context("Failed to create unit")?;
            ids.insert(entry.name.as_str(), unit);
        }
        let id = |name: &str| -> Result<UnitId, ManifestError> {
            ids.get(name).copied().ok_or_else(|| unknown(format!("unit `{name}`")))
        };

        for entry in &self.units {
            let unit = id(&entry.name)?;
            for ancestor in &entry.composes {
                hierarchy.compose(unit, id(ancestor)?).context("Failed to compose units")?;
            }
        }
        for entry in &self.units {
            let unit = id(&entry.name)?;
            for (name, value) in &entry.declarations {
                hierarchy.local_set(unit, name, value.clone()).context("Failed to declare")?;
            }
            for capability in &entry.capabilities {
                hierarchy.attach(unit, capability).context("Failed to attach capability")?;
            }
        }

        debug!(
            units = self.units.len(),
            capabilities = self.capabilities.len(),
            order = ?self.settings.order,
            "Manifest applied"
        );
        Ok(hierarchy)
    }
}

fn capability(entry: &CapabilityEntry) -> Capability<Value> {
    let mut builder = Capability::builder(entry.name.as_str()).kind(entry.kind);
    for accessor in &entry.accessors {
        let declaration = accessor.clone();
        builder = builder.accessor(accessor.as_str(), move |hierarchy: &Hierarchy<Value>, unit, _| {
            Ok(Value::Array(hierarchy.inherited(unit, &declaration)?.to_vec()))
        });
    }
    for required in &entry.requires {
        builder = builder.requires(required.as_str());
    }
    builder.build()
}

fn unique_names<'a>(
    names: impl Iterator<Item = &'a str>,
    what: &str,
) -> Result<BTreeSet<&'a str>, ManifestError> {
    let mut seen = BTreeSet::new();
    for name in names {
        if name.trim().is_empty() {
            return Err(ManifestError::Invalid {
                message: format!("{what} with an empty name").into(),
                context: None,
            });
        }
        if !seen.insert(name) {
            return Err(ManifestError::Invalid {
                message: format!("{what} `{name}` is declared twice").into(),
                context: None,
            });
        }
    }
    Ok(seen)
}

fn unknown(message: String) -> ManifestError {
    ManifestError::UnknownReference { message: message.into(), context: None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn manifest(value: Value) -> Manifest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let parsed = manifest(json!({ "units": [{ "name": "A" }] }));
        assert_eq!(parsed.settings, HierarchyConfig::default());
        assert!(parsed.capabilities.is_empty());
        assert!(parsed.units[0].composes.is_empty());
        assert_eq!(parsed.units[0].declarations, Map::new());
    }

    #[test]
    fn dangling_references_are_reported() {
        let parsed = manifest(json!({ "units": [{ "name": "A", "composes": ["Ghost"] }] }));
        assert!(matches!(parsed.validate(), Err(ManifestError::UnknownReference { .. })));

        let parsed = manifest(json!({
            "capabilities": [{ "name": "dsl", "requires": ["missing"] }],
        }));
        let err = parsed.validate().unwrap_err();
        assert!(err.to_string().contains("requires undefined `missing`"), "{err}");
    }

    #[test]
    fn repeated_names_are_invalid() {
        let parsed = manifest(json!({ "units": [{ "name": "A" }, { "name": "A" }] }));
        assert!(matches!(parsed.validate(), Err(ManifestError::Invalid { .. })));

        let parsed = manifest(json!({ "units": [{ "name": " " }] }));
        assert!(matches!(parsed.validate(), Err(ManifestError::Invalid { .. })));
    }

    #[test]
    fn cycles_surface_as_lineage_errors() {
        let parsed = manifest(json!({
            "units": [
                { "name": "A", "composes": ["B"] },
                { "name": "B", "composes": ["A"] },
            ],
        }));
        let err = parsed.build().unwrap_err();
        assert!(matches!(err, ManifestError::Lineage { .. }));
        assert!(err.to_string().contains("cannot compose"), "{err}");
    }

    #[test]
    fn generated_accessors_return_inherited_values() {
        let parsed = manifest(json!({
            "capabilities": [{ "name": "validations", "accessors": ["validations"] }],
            "units": [
                { "name": "Post", "composes": ["Base"] },
                {
                    "name": "Base",
                    "capabilities": ["validations"],
                    "declarations": { "validations": "presence" },
                },
            ],
        }));
        let hierarchy = parsed.build().unwrap();
        let post = hierarchy.unit("Post").unwrap();

        assert_eq!(hierarchy.invoke(post, "validations", &[]).unwrap(), json!(["presence"]));
        assert_eq!(hierarchy.capabilities_of(post).unwrap().len(), 1);
    }
}
