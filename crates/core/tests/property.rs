use lineage_core::{Hierarchy, LineageError, UnitId};
use proptest::prelude::*;

const NAMES: [&str; 2] = ["x", "y"];

#[derive(Debug, Clone)]
enum Op {
    Compose(usize, usize),
    Set(usize, usize, i64),
    Remove(usize, usize),
    Read(usize, usize),
    Sum(usize, usize),
}

fn op(units: usize) -> impl Strategy<Value = Op> {
    let name = 0..NAMES.len();
    prop_oneof![
        (0..units, 0..units).prop_map(|(unit, ancestor)| Op::Compose(unit, ancestor)),
        (0..units, name.clone(), -1000_i64..1000)
            .prop_map(|(unit, name, value)| Op::Set(unit, name, value)),
        (0..units, name.clone()).prop_map(|(unit, name)| Op::Remove(unit, name)),
        (0..units, name.clone()).prop_map(|(unit, name)| Op::Read(unit, name)),
        (0..units, name).prop_map(|(unit, name)| Op::Sum(unit, name)),
    ]
}

/// Random starting DAG (edges point from a later unit to an earlier one) followed by
/// arbitrary edges, writes and reads in any order.
fn scenario() -> impl Strategy<Value = (usize, Vec<(usize, usize)>, Vec<Op>)> {
    (2_usize..8).prop_flat_map(|units| {
        (
            Just(units),
            proptest::collection::vec((1..units, 0..units), 0..12),
            proptest::collection::vec(op(units), 1..96),
        )
    })
}

/// Inherited values recomputed from scratch, bypassing every cache.
fn recompute(hierarchy: &Hierarchy<i64>, unit: UnitId, name: &str) -> Vec<i64> {
    hierarchy
        .ancestors(unit)
        .unwrap()
        .into_iter()
        .filter_map(|ancestor| hierarchy.local_get(ancestor, name).unwrap())
        .collect()
}

proptest! {
    #[test]
    fn cached_view_matches_recomputation((units, edges, ops) in scenario()) {
        let hierarchy = Hierarchy::<i64>::new();
        let ids: Vec<_> =
            (0..units).map(|i| hierarchy.create_unit(format!("U{i}")).unwrap()).collect();
        for (from, to) in edges {
            if to < from {
                hierarchy.compose(ids[from], ids[to]).unwrap();
            }
        }

        for op in ops {
            match op {
                Op::Compose(unit, ancestor) => {
                    match hierarchy.compose(ids[unit], ids[ancestor]) {
                        Ok(_) | Err(LineageError::Cycle { .. }) => {},
                        Err(err) => prop_assert!(false, "unexpected error: {err}"),
                    }
                },
                Op::Set(unit, name, value) => {
                    hierarchy.local_set(ids[unit], NAMES[name], value).unwrap();
                },
                Op::Remove(unit, name) => {
                    hierarchy.local_remove(ids[unit], NAMES[name]).unwrap();
                },
                Op::Read(unit, name) => {
                    let cached = hierarchy.inherited(ids[unit], NAMES[name]).unwrap();
                    prop_assert_eq!(cached.to_vec(), recompute(&hierarchy, ids[unit], NAMES[name]));
                },
                Op::Sum(unit, name) => {
                    let cached = hierarchy
                        .inherited_with(ids[unit], NAMES[name], "sum", |v| v.iter().sum::<i64>())
                        .unwrap();
                    let expected: i64 = recompute(&hierarchy, ids[unit], NAMES[name]).iter().sum();
                    prop_assert_eq!(*cached, expected);
                },
            }
        }

        for id in &ids {
            for name in NAMES {
                let cached = hierarchy.inherited(*id, name).unwrap();
                prop_assert_eq!(cached.to_vec(), recompute(&hierarchy, *id, name));
            }
        }
    }

    #[test]
    fn back_edges_are_always_refused(units in 2_usize..8, extra in 0_usize..8) {
        let hierarchy = Hierarchy::<i64>::new();
        let ids: Vec<_> =
            (0..units).map(|i| hierarchy.create_unit(format!("U{i}")).unwrap()).collect();
        for pair in ids.windows(2) {
            hierarchy.compose(pair[1], pair[0]).unwrap();
        }
        let last = ids[units - 1];
        let target = ids[extra % (units - 1)];
        let before = hierarchy.ancestors(target).unwrap();

        prop_assert!(hierarchy.compose(target, last).is_err());
        prop_assert_eq!(hierarchy.ancestors(target).unwrap(), before);
    }
}
