use std::collections::HashSet;
use std::sync::Arc;

use contentql_model::{
    ContentCache, ContentError, ContentType, PublishedContent, PublishedElement,
};
use papaya::HashMap as PapayaHashMap;
use uuid::Uuid;

use crate::language::{Language, fallback_chain};
use crate::node::{ContentData, MemoryContent};

/// Shared state behind a [`MemoryContentStore`].
///
/// Nodes keep a weak reference to it so content pickers can resolve the
/// nodes they point at.
#[derive(Debug)]
pub(crate) struct StoreInner {
    content_types: PapayaHashMap<String, Arc<ContentType>>,
    nodes: PapayaHashMap<i32, Arc<MemoryContent>>,
    keys: PapayaHashMap<Uuid, i32>,
    languages: PapayaHashMap<String, Language>,
    default_culture: String,
}

impl StoreInner {
    pub(crate) fn default_culture(&self) -> &str {
        &self.default_culture
    }

    pub(crate) fn content_type(&self, alias: &str) -> Option<Arc<ContentType>> {
        let guard = self.content_types.pin();
        guard.get(alias).cloned().or_else(|| {
            guard
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(alias))
                .map(|(_, content_type)| content_type.clone())
        })
    }

    pub(crate) fn node(&self, id: i32) -> Option<Arc<MemoryContent>> {
        self.nodes.pin().get(&id).cloned()
    }

    pub(crate) fn node_by_key(&self, key: &Uuid) -> Option<Arc<MemoryContent>> {
        let id = *self.keys.pin().get(key)?;
        self.node(id)
    }

    /// Walks up from `parent_id`, nearest ancestor first.
    ///
    /// Stops at a missing node or at the first id seen twice.
    pub(crate) fn ancestors(&self, mut parent_id: Option<i32>) -> Vec<Arc<MemoryContent>> {
        let mut seen = HashSet::new();
        let mut ancestors = Vec::new();
        while let Some(id) = parent_id {
            if !seen.insert(id) {
                break;
            }
            let Some(node) = self.node(id) else {
                break;
            };
            parent_id = node.parent_id();
            ancestors.push(node);
        }
        ancestors
    }

    pub(crate) fn fallback_chain(&self, culture: &str) -> Vec<String> {
        let guard = self.languages.pin();
        fallback_chain(culture, |culture| {
            guard.get(culture).cloned().or_else(|| {
                guard
                    .iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(culture))
                    .map(|(_, language)| language.clone())
            })
        })
    }

    fn collect(
        &self,
        filter: impl Fn(&MemoryContent) -> bool,
    ) -> Vec<Arc<dyn PublishedContent>> {
        let guard = self.nodes.pin();
        let mut nodes: Vec<Arc<MemoryContent>> = guard
            .iter()
            .filter(|(_, node)| filter(node))
            .map(|(_, node)| node.clone())
            .collect();
        nodes.sort_by_key(|node| (node.sort_order(), node.id()));
        nodes
            .into_iter()
            .map(|node| node as Arc<dyn PublishedContent>)
            .collect()
    }
}

/// In-memory published content snapshot using papaya lock-free HashMaps.
///
/// Content types must be added before content that uses them, and parents
/// before their children.
#[derive(Debug, Clone)]
pub struct MemoryContentStore {
    inner: Arc<StoreInner>,
}

impl MemoryContentStore {
    /// Creates an empty store.
    pub fn new(default_culture: &str) -> Self {
        let inner = StoreInner {
            content_types: PapayaHashMap::new(),
            nodes: PapayaHashMap::new(),
            keys: PapayaHashMap::new(),
            languages: PapayaHashMap::new(),
            default_culture: default_culture.to_string(),
        };
        inner
            .languages
            .pin()
            .insert(default_culture.to_string(), Language::new(default_culture));
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Culture used when a request names none.
    pub fn default_culture(&self) -> &str {
        self.inner.default_culture()
    }

    /// Adds or replaces a language.
    pub fn add_language(&self, language: Language) {
        self.inner
            .languages
            .pin()
            .insert(language.iso_code.clone(), language);
    }

    /// Adds or replaces a content type.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::DuplicateProperty` if the type repeats a
    /// property alias.
    pub fn add_content_type(&self, content_type: ContentType) -> Result<(), ContentError> {
        content_type.validate()?;
        tracing::debug!(alias = %content_type.alias, kind = ?content_type.kind, "Adding content type");
        self.inner
            .content_types
            .pin()
            .insert(content_type.alias.clone(), Arc::new(content_type));
        Ok(())
    }

    /// Adds or replaces a content node.
    ///
    /// # Errors
    ///
    /// Returns an error if the content type is unknown or is an element type,
    /// if the parent node has not been added, or if the parent chain leads
    /// back to the node itself.
    pub fn add_content(&self, data: ContentData) -> Result<Arc<MemoryContent>, ContentError> {
        let content_type = self
            .inner
            .content_type(&data.content_type)
            .ok_or_else(|| ContentError::unknown_content_type(&data.content_type))?;
        if content_type.kind.is_element() {
            return Err(ContentError::internal(format!(
                "element type '{}' cannot be published as content",
                content_type.alias
            )));
        }

        if let Some(parent_id) = data.parent_id {
            if self.inner.node(parent_id).is_none() {
                return Err(ContentError::content_not_found(parent_id));
            }
            let cyclic = parent_id == data.id
                || self
                    .inner
                    .ancestors(Some(parent_id))
                    .iter()
                    .any(|ancestor| ancestor.id() == data.id);
            if cyclic {
                return Err(ContentError::cyclic_parent(data.id, parent_id));
            }
        }

        let id = data.id;
        let key = data.key;
        let node = Arc::new(MemoryContent::new(
            data,
            content_type,
            Arc::downgrade(&self.inner),
        ));

        let nodes = self.inner.nodes.pin();
        if let Some(previous) = nodes.insert(id, node.clone()) {
            if previous.key() != key {
                self.inner.keys.pin().remove(&previous.key());
            }
        }
        self.inner.keys.pin().insert(key, id);
        Ok(node)
    }

    /// Removes a node. Children are left in place.
    pub fn remove_content(&self, id: i32) -> bool {
        match self.inner.nodes.pin().remove(&id) {
            Some(node) => {
                self.inner.keys.pin().remove(&node.key());
                true
            }
            None => false,
        }
    }

    #[cfg(test)]
    pub(crate) fn inner_for_tests(&self) -> Arc<StoreInner> {
        self.inner.clone()
    }

    /// Number of content nodes.
    pub fn len(&self) -> usize {
        self.inner.nodes.len()
    }

    /// Whether the store holds no content nodes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ContentCache for MemoryContentStore {
    fn content_types(&self) -> Vec<Arc<ContentType>> {
        let guard = self.inner.content_types.pin();
        let mut content_types: Vec<_> = guard
            .iter()
            .map(|(_, content_type)| content_type.clone())
            .collect();
        content_types.sort_by(|a, b| a.alias.cmp(&b.alias));
        content_types
    }

    fn get_by_id(&self, id: i32) -> Option<Arc<dyn PublishedContent>> {
        self.inner
            .node(id)
            .map(|node| node as Arc<dyn PublishedContent>)
    }

    fn get_by_key(&self, key: Uuid) -> Option<Arc<dyn PublishedContent>> {
        self.inner
            .node_by_key(&key)
            .map(|node| node as Arc<dyn PublishedContent>)
    }

    fn get_at_root(&self, culture: Option<&str>) -> Vec<Arc<dyn PublishedContent>> {
        self.inner.collect(|node| {
            node.parent_id().is_none()
                && culture.is_none_or(|culture| node.data().is_available_in(culture))
        })
    }

    fn get_children(&self, id: i32, culture: Option<&str>) -> Vec<Arc<dyn PublishedContent>> {
        self.inner.collect(|node| {
            node.parent_id() == Some(id)
                && culture.is_none_or(|culture| node.data().is_available_in(culture))
        })
    }

    fn get_by_content_type(&self, alias: &str) -> Vec<Arc<dyn PublishedContent>> {
        self.inner
            .collect(|node| node.content_type().alias.eq_ignore_ascii_case(alias))
    }
}
