use anyhow::{Context, Result};
use lineage::{Hierarchy, UnitId};
use serde_json::Value;

fn unit(hierarchy: &Hierarchy<Value>, name: &str) -> Result<UnitId> {
    hierarchy.unit(name).with_context(|| format!("Unknown unit `{name}`"))
}

fn names(hierarchy: &Hierarchy<Value>, units: &[UnitId]) -> Result<Value> {
    let names = units
        .iter()
        .map(|unit| hierarchy.name_of(*unit).map(|name| Value::from(&*name)))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Value::Array(names))
}

pub(crate) fn units(hierarchy: &Hierarchy<Value>) -> Result<Value> {
    names(hierarchy, &hierarchy.units())
}

pub(crate) fn ancestors(hierarchy: &Hierarchy<Value>, name: &str) -> Result<Value> {
    let ancestors = hierarchy.ancestors(unit(hierarchy, name)?)?;
    names(hierarchy, &ancestors)
}

pub(crate) fn inherited(
    hierarchy: &Hierarchy<Value>,
    name: &str,
    declaration: &str,
    effective: bool,
) -> Result<Value> {
    let unit = unit(hierarchy, name)?;
    let values = if effective {
        hierarchy.effective(unit, declaration)?
    } else {
        hierarchy.inherited(unit, declaration)?.to_vec()
    };
    Ok(Value::Array(values))
}

pub(crate) fn invoke(hierarchy: &Hierarchy<Value>, name: &str, method: &str) -> Result<Value> {
    let unit = unit(hierarchy, name)?;
    hierarchy.invoke(unit, method, &[]).with_context(|| format!("Failed to invoke `{method}`"))
}

pub(crate) fn capabilities(
    hierarchy: &Hierarchy<Value>,
    name: &str,
    propagate: bool,
) -> Result<Value> {
    let unit = unit(hierarchy, name)?;
    if propagate {
        hierarchy.propagate_capabilities()?;
    }
    let carried = hierarchy.capabilities_of(unit)?;
    Ok(Value::Array(carried.iter().map(|capability| Value::from(&**capability)).collect()))
}
