use lineage_core::{Hierarchy, UnitId};

/// Builds `names[0] <- names[1] <- ...`: each unit composes the one before it.
///
/// # Panics
/// * If a unit cannot be created or composed.
#[must_use]
pub fn chain(names: &[&str]) -> (Hierarchy<i64>, Vec<UnitId>) {
    let hierarchy = Hierarchy::new();
    let units: Vec<_> =
        names.iter().map(|name| hierarchy.create_unit(*name).expect("unit")).collect();
    for pair in units.windows(2) {
        hierarchy.compose(pair[1], pair[0]).expect("edge");
    }
    (hierarchy, units)
}

/// `D` composes `B` then `C`, both of which compose `A`.
///
/// # Panics
/// * If a unit cannot be created or composed.
#[must_use]
pub fn diamond() -> (Hierarchy<i64>, [UnitId; 4]) {
    let hierarchy = Hierarchy::new();
    let [a, b, c, d] = ["A", "B", "C", "D"].map(|name| hierarchy.create_unit(name).expect("unit"));
    hierarchy.compose(b, a).expect("edge");
    hierarchy.compose(c, a).expect("edge");
    hierarchy.compose(d, b).expect("edge");
    hierarchy.compose(d, c).expect("edge");
    (hierarchy, [a, b, c, d])
}
