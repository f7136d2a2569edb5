//! Query identity for cached todo pages.

use serde::{Deserialize, Serialize};

use crate::todo::Priority;

/// The filter half of a query key.
///
/// Two filters are the same cache key iff all present fields are equal;
/// a missing field is a wildcard. Distinct filter combinations address
/// independent cache entries that do not automatically stay in sync with
/// each other — cross-entry convergence happens only through
/// invalidation-driven refetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoFilter {
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub completed: Option<bool>,
    pub priority: Option<Priority>,
    pub sort: Option<String>,
}

impl TodoFilter {
    /// Render the present fields as query-string pairs, in the order the
    /// list endpoint documents them.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(size) = self.size {
            pairs.push(("size", size.to_string()));
        }
        if let Some(completed) = self.completed {
            pairs.push(("completed", completed.to_string()));
        }
        if let Some(priority) = self.priority {
            let value = serde_json::to_value(priority)
                .ok()
                .and_then(|v| v.as_str().map(str::to_owned))
                .unwrap_or_default();
            pairs.push(("priority", value));
        }
        if let Some(sort) = &self.sort {
            pairs.push(("sort", sort.clone()));
        }
        pairs
    }
}
