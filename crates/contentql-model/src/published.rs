//! Published content traits.
//!
//! These traits are the read side of the content-management system: a
//! published snapshot of content nodes and their property values.

use std::sync::Arc;

use time::OffsetDateTime;
use uuid::Uuid;

use crate::content_type::ContentType;
use crate::error::ContentError;
use crate::value::{Fallback, PropertyValue};

/// A published node with typed property values.
///
/// Implementations must be thread-safe; the GraphQL layer reads them from
/// concurrent resolvers.
pub trait PublishedElement: Send + Sync {
    /// Unique key of the node.
    fn key(&self) -> Uuid;

    /// Content type of the node.
    fn content_type(&self) -> &ContentType;

    /// Reads a property value by alias.
    ///
    /// `culture` selects a culture for culture-variant properties; `None`
    /// means the default culture. With `Fallback::ToLanguage`, a missing
    /// culture value falls back along the configured language chain.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored value cannot be converted to the
    /// property's declared type.
    fn value(
        &self,
        alias: &str,
        culture: Option<&str>,
        fallback: Fallback,
    ) -> Result<PropertyValue, ContentError>;
}

/// A routable published content node.
pub trait PublishedContent: PublishedElement {
    /// Integer id of the node.
    fn id(&self) -> i32;

    /// Id of the parent node, `None` at the root.
    fn parent_id(&self) -> Option<i32>;

    /// Node name in the given culture.
    fn name(&self, culture: Option<&str>) -> Option<String>;

    /// Node url in the given culture.
    fn url(&self, culture: Option<&str>) -> Option<String>;

    /// Depth in the tree, 1 at the root.
    fn level(&self) -> i32;

    /// Position among siblings.
    fn sort_order(&self) -> i32;

    /// Creation timestamp.
    fn create_date(&self) -> OffsetDateTime;

    /// Last update timestamp.
    fn update_date(&self) -> OffsetDateTime;
}

/// Read-only published content snapshot.
pub trait ContentCache: Send + Sync {
    /// All content types known to the snapshot.
    fn content_types(&self) -> Vec<Arc<ContentType>>;

    /// Gets a node by id.
    fn get_by_id(&self, id: i32) -> Option<Arc<dyn PublishedContent>>;

    /// Gets a node by key.
    fn get_by_key(&self, key: Uuid) -> Option<Arc<dyn PublishedContent>>;

    /// Root nodes, optionally restricted to those available in `culture`.
    fn get_at_root(&self, culture: Option<&str>) -> Vec<Arc<dyn PublishedContent>>;

    /// Children of a node, optionally restricted to `culture`.
    fn get_children(&self, id: i32, culture: Option<&str>) -> Vec<Arc<dyn PublishedContent>>;

    /// All nodes of a content type.
    fn get_by_content_type(&self, alias: &str) -> Vec<Arc<dyn PublishedContent>>;
}
