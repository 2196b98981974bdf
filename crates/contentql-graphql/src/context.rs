//! GraphQL execution context.
//!
//! The context is constructed per request and carries the content cache the
//! content resolvers read from. Searchers are bound into the schema when it is
//! built and are not part of the context.
//!
//! # Example
//!
//! ```ignore
//! use contentql_graphql::GraphQLContextBuilder;
//!
//! let context = GraphQLContextBuilder::new()
//!     .with_content(content_cache.clone())
//!     .with_request_id("req-123")
//!     .with_culture(Some("da-DK".to_string()))
//!     .build()?;
//! ```

use contentql_model::DynContentCache;

/// GraphQL execution context.
///
/// Cheap to clone: the content cache is shared behind an `Arc`.
#[derive(Clone)]
pub struct GraphQLContext {
    /// Published content snapshot.
    pub content: DynContentCache,

    /// Request ID for tracing and correlation.
    pub request_id: String,

    /// Culture used by culture-aware fields when a query passes none.
    pub culture: Option<String>,
}

impl GraphQLContext {
    /// Creates a new builder for GraphQLContext.
    #[must_use]
    pub fn builder() -> GraphQLContextBuilder {
        GraphQLContextBuilder::default()
    }

    /// Picks the culture for a field: the explicit argument wins.
    #[must_use]
    pub fn culture_or<'a>(&'a self, argument: Option<&'a str>) -> Option<&'a str> {
        argument.or(self.culture.as_deref())
    }
}

/// Builder for constructing GraphQLContext.
#[derive(Default)]
pub struct GraphQLContextBuilder {
    content: Option<DynContentCache>,
    request_id: Option<String>,
    culture: Option<String>,
}

impl GraphQLContextBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the content cache.
    #[must_use]
    pub fn with_content(mut self, content: DynContentCache) -> Self {
        self.content = Some(content);
        self
    }

    /// Sets the request ID.
    #[must_use]
    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    /// Sets the request culture.
    #[must_use]
    pub fn with_culture(mut self, culture: Option<String>) -> Self {
        self.culture = culture;
        self
    }

    /// Builds the GraphQLContext.
    ///
    /// # Errors
    ///
    /// Returns an error if required fields are missing.
    pub fn build(self) -> Result<GraphQLContext, ContextBuilderError> {
        let content = self
            .content
            .ok_or(ContextBuilderError::MissingField("content"))?;

        let request_id = self
            .request_id
            .ok_or(ContextBuilderError::MissingField("request_id"))?;

        Ok(GraphQLContext {
            content,
            request_id,
            culture: self.culture,
        })
    }
}

/// Errors that can occur when building a GraphQLContext.
#[derive(Debug, thiserror::Error)]
pub enum ContextBuilderError {
    /// A required field was not provided.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use contentql_model::{ContentCache, ContentType, PublishedContent};
    use std::sync::Arc;
    use uuid::Uuid;

    struct EmptyCache;

    impl ContentCache for EmptyCache {
        fn content_types(&self) -> Vec<Arc<ContentType>> {
            Vec::new()
        }
        fn get_by_id(&self, _id: i32) -> Option<Arc<dyn PublishedContent>> {
            None
        }
        fn get_by_key(&self, _key: Uuid) -> Option<Arc<dyn PublishedContent>> {
            None
        }
        fn get_at_root(&self, _culture: Option<&str>) -> Vec<Arc<dyn PublishedContent>> {
            Vec::new()
        }
        fn get_children(&self, _id: i32, _culture: Option<&str>) -> Vec<Arc<dyn PublishedContent>> {
            Vec::new()
        }
        fn get_by_content_type(&self, _alias: &str) -> Vec<Arc<dyn PublishedContent>> {
            Vec::new()
        }
    }

    #[test]
    fn test_builder_missing_content() {
        let result = GraphQLContextBuilder::new()
            .with_request_id("req-123")
            .build();

        assert!(matches!(
            result,
            Err(ContextBuilderError::MissingField("content"))
        ));
    }

    #[test]
    fn test_builder_missing_request_id() {
        let result = GraphQLContextBuilder::new()
            .with_content(Arc::new(EmptyCache))
            .build();

        assert!(matches!(
            result,
            Err(ContextBuilderError::MissingField("request_id"))
        ));
    }

    #[test]
    fn test_culture_argument_wins() {
        let context = GraphQLContext::builder()
            .with_content(Arc::new(EmptyCache))
            .with_request_id("req-1")
            .with_culture(Some("da-DK".to_string()))
            .build()
            .unwrap();

        assert_eq!(context.culture_or(Some("en-US")), Some("en-US"));
        assert_eq!(context.culture_or(None), Some("da-DK"));
    }
}
