//! Content packages seeding the in-memory store and search indexes.
//!
//! A package is a JSON document:
//!
//! ```json
//! {
//!   "languages": [{ "isoCode": "da-DK", "fallback": "en-US" }],
//!   "contentTypes": [{ "alias": "page", "properties": [...] }],
//!   "content": [{ "id": 1000, "contentType": "page", "name": "Home" }],
//!   "indexes": [{ "name": "External", "contentTypes": ["page"] }]
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use contentql_memory::{
    ContentData, Document, Language, MemoryContent, MemoryContentStore, MemorySearchIndex,
};
use contentql_model::{ContentError, ContentType};
use contentql_search::DynSearcher;
use serde::Deserialize;
use tracing::{debug, info};

/// Errors raised while loading a content package.
#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error("Failed to read content package {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid content package: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to seed content: {0}")]
    Content(#[from] ContentError),
}

/// A search index to build from the package.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexDefinition {
    pub name: String,
    /// Culture used for names and variant values of indexed content.
    #[serde(default)]
    pub culture: Option<String>,
    /// Aliases of the content types to index. Empty indexes every node.
    #[serde(default)]
    pub content_types: Vec<String>,
    /// Documents indexed in addition to the package content.
    #[serde(default)]
    pub documents: Vec<Document>,
}

impl IndexDefinition {
    fn includes(&self, content_type: &str) -> bool {
        self.content_types.is_empty()
            || self
                .content_types
                .iter()
                .any(|alias| alias.eq_ignore_ascii_case(content_type))
    }
}

/// Languages, content model, content and indexes of a site.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentPackage {
    #[serde(default)]
    pub languages: Vec<Language>,
    #[serde(default)]
    pub content_types: Vec<ContentType>,
    #[serde(default)]
    pub content: Vec<ContentData>,
    #[serde(default)]
    pub indexes: Vec<IndexDefinition>,
}

impl ContentPackage {
    /// Reads a package from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self, FixtureError> {
        let raw = std::fs::read_to_string(path).map_err(|source| FixtureError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// Parses a package from JSON text.
    pub fn from_json(raw: &str) -> Result<Self, FixtureError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Loads the package into `store` and builds its indexes.
    ///
    /// Content may be listed in any order; every node is added after its
    /// parent. A node whose parent is missing from both the store and the
    /// package fails the load.
    pub fn seed(self, store: &MemoryContentStore) -> Result<Vec<DynSearcher>, FixtureError> {
        for language in self.languages {
            store.add_language(language);
        }
        for content_type in self.content_types {
            store.add_content_type(content_type)?;
        }

        let nodes = add_parents_first(store, self.content)?;
        info!(nodes = nodes.len(), indexes = self.indexes.len(), "Content package loaded");

        Ok(self
            .indexes
            .into_iter()
            .map(|definition| build_index(definition, &nodes))
            .collect())
    }
}

fn add_parents_first(
    store: &MemoryContentStore,
    content: Vec<ContentData>,
) -> Result<Vec<Arc<MemoryContent>>, FixtureError> {
    let mut added = Vec::with_capacity(content.len());
    let mut pending = content;

    while !pending.is_empty() {
        let before = pending.len();
        let mut deferred = Vec::new();
        for data in pending {
            let parent_ready = data.parent_id.is_none_or(|parent_id| {
                added
                    .iter()
                    .any(|node: &Arc<MemoryContent>| node.data().id == parent_id)
            });
            if parent_ready {
                added.push(store.add_content(data)?);
            } else {
                deferred.push(data);
            }
        }

        if deferred.len() == before {
            // No progress: the first deferred parent is not in the package.
            // Adding reports it missing unless an earlier load provided it.
            let mut deferred = deferred.into_iter();
            if let Some(data) = deferred.next() {
                added.push(store.add_content(data)?);
            }
            pending = deferred.collect();
        } else {
            pending = deferred;
        }
    }
    Ok(added)
}

fn build_index(definition: IndexDefinition, nodes: &[Arc<MemoryContent>]) -> DynSearcher {
    let index = MemorySearchIndex::new(definition.name.clone());
    let culture = definition.culture.as_deref();

    for node in nodes
        .iter()
        .filter(|node| definition.includes(&node.data().content_type))
    {
        index.index(Document::from_content(&**node, culture));
    }
    for document in definition.documents {
        index.index(document);
    }

    debug!(index = %definition.name, documents = index.len(), "Search index built");
    Arc::new(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use contentql_model::ContentCache;
    use contentql_search::Searcher;

    const PACKAGE: &str = r#"{
        "languages": [{ "isoCode": "da-DK", "fallback": "en-US" }],
        "contentTypes": [
            {
                "alias": "page",
                "properties": [
                    { "alias": "title", "valueType": "String", "variesByCulture": true }
                ]
            },
            { "alias": "image", "kind": "media" }
        ],
        "content": [
            { "id": 1001, "parentId": 1000, "contentType": "page", "name": "About" },
            {
                "id": 1000,
                "contentType": "page",
                "name": "Home",
                "values": { "title": { "en-US": "Welcome home" } }
            },
            { "id": 2000, "contentType": "image", "name": "Logo" }
        ],
        "indexes": [
            { "name": "External", "contentTypes": ["page"] },
            {
                "name": "Members",
                "documents": [{ "id": "m1", "category": "member", "values": { "email": ["a@b.c"] } }]
            }
        ]
    }"#;

    #[tokio::test]
    async fn test_seed_package() {
        let store = MemoryContentStore::new("en-US");
        let searchers = ContentPackage::from_json(PACKAGE)
            .unwrap()
            .seed(&store)
            .unwrap();

        assert_eq!(store.len(), 3);
        let about = store.get_by_id(1001).unwrap();
        assert_eq!(about.level(), 2);

        let names: Vec<&str> = searchers.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["External", "Members"]);

        let results = searchers[0].search("welcome", 10).await.unwrap();
        assert_eq!(results.total_item_count, 1);
        assert_eq!(results.results[0].id, "1000");

        let fields = searchers[1].indexed_field_names().unwrap();
        assert_eq!(fields, vec!["email".to_string()]);
    }

    #[test]
    fn test_missing_parent_fails() {
        let store = MemoryContentStore::new("en-US");
        let package = ContentPackage::from_json(
            r#"{
                "contentTypes": [{ "alias": "page" }],
                "content": [{ "id": 2, "parentId": 1, "contentType": "page", "name": "Orphan" }]
            }"#,
        )
        .unwrap();

        let err = package.seed(&store).err().unwrap();
        assert!(matches!(err, FixtureError::Content(_)));
    }

    #[test]
    fn test_demo_fixture_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../fixtures/demo.json");
        let store = MemoryContentStore::new("en-US");
        let searchers = ContentPackage::from_path(&path)
            .unwrap()
            .seed(&store)
            .unwrap();
        assert_eq!(store.len(), 4);
        assert_eq!(searchers.len(), 2);
    }

    #[test]
    fn test_missing_file() {
        let err = ContentPackage::from_path(Path::new("does/not/exist.json")).unwrap_err();
        assert!(matches!(err, FixtureError::Io { .. }));
    }

    #[test]
    fn test_invalid_json() {
        let err = ContentPackage::from_json("{ not json").unwrap_err();
        assert!(matches!(err, FixtureError::Parse(_)));
    }
}
