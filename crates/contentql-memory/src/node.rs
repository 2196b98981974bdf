//! Published nodes held by the in-memory store.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use contentql_model::{
    ContentError, ContentType, Fallback, PropertyValue, PublishedContent, PublishedElement,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::convert;
use crate::language::culture_entry;
use crate::store::StoreInner;

/// Raw data of a content node, as loaded from fixtures.
///
/// Values of culture-variant properties are JSON objects keyed by culture
/// code; invariant properties hold the value directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentData {
    pub id: i32,
    #[serde(default = "Uuid::new_v4")]
    pub key: Uuid,
    #[serde(default)]
    pub parent_id: Option<i32>,
    pub content_type: String,
    /// Invariant name.
    pub name: String,
    /// Per-culture names. A node with culture names is only available in
    /// those cultures.
    #[serde(default)]
    pub names: HashMap<String, String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub urls: HashMap<String, String>,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default = "OffsetDateTime::now_utc", with = "time::serde::rfc3339")]
    pub create_date: OffsetDateTime,
    #[serde(default = "OffsetDateTime::now_utc", with = "time::serde::rfc3339")]
    pub update_date: OffsetDateTime,
    #[serde(default)]
    pub values: HashMap<String, Value>,
}

impl ContentData {
    /// Creates node data with a fresh key and the current timestamp.
    #[must_use]
    pub fn new(id: i32, content_type: impl Into<String>, name: impl Into<String>) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id,
            key: Uuid::new_v4(),
            parent_id: None,
            content_type: content_type.into(),
            name: name.into(),
            names: HashMap::new(),
            url: None,
            urls: HashMap::new(),
            sort_order: 0,
            create_date: now,
            update_date: now,
            values: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_key(mut self, key: Uuid) -> Self {
        self.key = key;
        self
    }

    #[must_use]
    pub fn with_parent(mut self, parent_id: i32) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    #[must_use]
    pub fn with_sort_order(mut self, sort_order: i32) -> Self {
        self.sort_order = sort_order;
        self
    }

    /// Adds a culture-specific name.
    #[must_use]
    pub fn with_culture_name(mut self, culture: impl Into<String>, name: impl Into<String>) -> Self {
        self.names.insert(culture.into(), name.into());
        self
    }

    /// Sets a raw property value.
    #[must_use]
    pub fn with_value(mut self, alias: impl Into<String>, value: Value) -> Self {
        self.values.insert(alias.into(), value);
        self
    }

    /// Whether the node is available in `culture`.
    pub(crate) fn is_available_in(&self, culture: &str) -> bool {
        self.names.is_empty() || culture_entry(&self.names, culture).is_some()
    }
}

/// A routable content node.
#[derive(Debug)]
pub struct MemoryContent {
    data: ContentData,
    content_type: Arc<ContentType>,
    store: Weak<StoreInner>,
}

impl MemoryContent {
    pub(crate) fn new(
        data: ContentData,
        content_type: Arc<ContentType>,
        store: Weak<StoreInner>,
    ) -> Self {
        Self {
            data,
            content_type,
            store,
        }
    }

    /// Raw node data.
    #[must_use]
    pub fn data(&self) -> &ContentData {
        &self.data
    }

    fn store(&self) -> Result<Arc<StoreInner>, ContentError> {
        self.store
            .upgrade()
            .ok_or_else(|| ContentError::internal("content store has been dropped"))
    }

    fn route(&self, culture: Option<&str>) -> Option<String> {
        let store = self.store().ok()?;
        let ancestors = store.ancestors(self.data.parent_id);
        // A broken or looping chain has no route.
        if ancestors
            .last()
            .is_some_and(|root| root.data.parent_id.is_some())
        {
            return None;
        }
        let mut segments = vec![slugify(&self.name(culture)?)];
        for ancestor in &ancestors {
            segments.push(slugify(&ancestor.name(culture)?));
        }
        segments.reverse();
        Some(format!("/{}/", segments.join("/")))
    }
}

impl PublishedElement for MemoryContent {
    fn key(&self) -> Uuid {
        self.data.key
    }

    fn content_type(&self) -> &ContentType {
        &self.content_type
    }

    fn value(
        &self,
        alias: &str,
        culture: Option<&str>,
        fallback: Fallback,
    ) -> Result<PropertyValue, ContentError> {
        read_property(
            &self.content_type,
            &self.data.values,
            &self.store()?,
            alias,
            culture,
            fallback,
        )
    }
}

impl PublishedContent for MemoryContent {
    fn id(&self) -> i32 {
        self.data.id
    }

    fn parent_id(&self) -> Option<i32> {
        self.data.parent_id
    }

    fn name(&self, culture: Option<&str>) -> Option<String> {
        culture
            .and_then(|culture| culture_entry(&self.data.names, culture))
            .cloned()
            .or_else(|| Some(self.data.name.clone()))
    }

    fn url(&self, culture: Option<&str>) -> Option<String> {
        culture
            .and_then(|culture| culture_entry(&self.data.urls, culture))
            .or(self.data.url.as_ref())
            .cloned()
            .or_else(|| self.route(culture))
    }

    fn level(&self) -> i32 {
        let depth = self
            .store()
            .map_or(0, |store| store.ancestors(self.data.parent_id).len());
        i32::try_from(depth).map_or(i32::MAX, |depth| depth + 1)
    }

    fn sort_order(&self) -> i32 {
        self.data.sort_order
    }

    fn create_date(&self) -> OffsetDateTime {
        self.data.create_date
    }

    fn update_date(&self) -> OffsetDateTime {
        self.data.update_date
    }
}

/// A nested element, such as a block list item.
#[derive(Debug)]
pub struct MemoryElement {
    key: Uuid,
    content_type: Arc<ContentType>,
    values: HashMap<String, Value>,
    store: Weak<StoreInner>,
}

impl MemoryElement {
    pub(crate) fn new(
        key: Uuid,
        content_type: Arc<ContentType>,
        values: HashMap<String, Value>,
        store: Weak<StoreInner>,
    ) -> Self {
        Self {
            key,
            content_type,
            values,
            store,
        }
    }
}

impl PublishedElement for MemoryElement {
    fn key(&self) -> Uuid {
        self.key
    }

    fn content_type(&self) -> &ContentType {
        &self.content_type
    }

    fn value(
        &self,
        alias: &str,
        culture: Option<&str>,
        fallback: Fallback,
    ) -> Result<PropertyValue, ContentError> {
        let store = self
            .store
            .upgrade()
            .ok_or_else(|| ContentError::internal("content store has been dropped"))?;
        read_property(
            &self.content_type,
            &self.values,
            &store,
            alias,
            culture,
            fallback,
        )
    }
}

fn read_property(
    content_type: &ContentType,
    values: &HashMap<String, Value>,
    store: &Arc<StoreInner>,
    alias: &str,
    culture: Option<&str>,
    fallback: Fallback,
) -> Result<PropertyValue, ContentError> {
    let Some(property) = content_type.property(alias) else {
        return Ok(PropertyValue::Null);
    };
    let Some(raw) = values.get(alias) else {
        return Ok(PropertyValue::Null);
    };

    let raw = if property.varies_by_culture {
        match select_culture(raw, culture, fallback, store) {
            Some(raw) => raw,
            None => return Ok(PropertyValue::Null),
        }
    } else {
        raw
    };

    convert::convert(alias, &property.value_type, raw, store)
}

fn select_culture<'a>(
    raw: &'a Value,
    culture: Option<&str>,
    fallback: Fallback,
    store: &StoreInner,
) -> Option<&'a Value> {
    // Variant values stored without a culture map apply to every culture.
    let Value::Object(by_culture) = raw else {
        return Some(raw);
    };

    let requested = culture.unwrap_or(store.default_culture());
    let chain = match fallback {
        Fallback::ToLanguage => store.fallback_chain(requested),
        Fallback::None => vec![requested.to_string()],
    };

    chain.iter().find_map(|culture| {
        by_culture
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(culture))
            .map(|(_, value)| value)
            .filter(|value| !value.is_null())
    })
}

fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
