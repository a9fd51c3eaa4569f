use serde::Deserialize;

/// Order in which ancestor contributions appear in an inherited sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AncestorOrder {
    /// Traversal order: direct ancestors first, depth-first, edges in insertion order.
    #[default]
    NearestFirst,
    /// The exact reverse of [`AncestorOrder::NearestFirst`].
    FarthestFirst,
}

impl AncestorOrder {
    pub(crate) fn arrange<T>(self, mut items: Vec<T>) -> Vec<T> {
        if self == Self::FarthestFirst {
            items.reverse();
        }
        items
    }
}

/// Settings fixed for the lifetime of a [`Hierarchy`](crate::Hierarchy).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HierarchyConfig {
    pub order: AncestorOrder,
}
