//! Search result types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One scored match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub id: String,
    pub score: f32,
    #[serde(default)]
    pub category: Option<String>,
    /// Indexed field values; fields may hold several values.
    #[serde(default)]
    pub values: BTreeMap<String, Vec<String>>,
}

impl SearchResult {
    /// Creates a result without field values.
    #[must_use]
    pub fn new(id: impl Into<String>, score: f32) -> Self {
        Self {
            id: id.into(),
            score,
            category: None,
            values: BTreeMap::new(),
        }
    }

    /// Sets the category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Appends a value to a field.
    #[must_use]
    pub fn with_value(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.entry(field.into()).or_default().push(value.into());
        self
    }

    /// First value of a field.
    #[must_use]
    pub fn value(&self, field: &str) -> Option<&str> {
        self.values
            .get(field)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// All values of a field.
    #[must_use]
    pub fn values(&self, field: &str) -> &[String] {
        self.values.get(field).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// An ordered result set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    /// Number of matches before the result cap was applied.
    pub total_item_count: u64,
    pub results: Vec<SearchResult>,
}

impl SearchResults {
    /// Creates a result set.
    #[must_use]
    pub fn new(total_item_count: u64, results: Vec<SearchResult>) -> Self {
        Self {
            total_item_count,
            results,
        }
    }

    /// Number of returned results.
    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether no results were returned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
