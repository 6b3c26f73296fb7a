//! Category records and their display ordering.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A named grouping for subscriptions. Read-only from the client's side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub category_id: String,
    pub category_name: String,
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Sort categories by display name, case-insensitive, ascending.
///
/// Names that differ only by case fall back to a byte-wise comparison so the
/// resulting order is total and stable across reloads.
pub fn sort_categories(categories: &mut [Category]) {
    categories.sort_by(|a, b| compare_names(&a.category_name, &b.category_name));
}
