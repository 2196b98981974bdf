//! The searcher trait.

use async_trait::async_trait;

use crate::error::SearchError;
use crate::query::SearchQuery;
use crate::results::SearchResults;

/// A searchable index.
///
/// Implementations must be thread-safe (`Send + Sync`). Calls may block on
/// I/O; callers add no timeouts or retries.
#[async_trait]
pub trait Searcher: Send + Sync {
    /// Logical index name.
    fn name(&self) -> &str;

    /// Executes a structured query, returning at most `max_results` matches.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::InvalidQuery` if the native query text does not
    /// parse, or another error if the index cannot be searched.
    async fn execute(
        &self,
        query: &SearchQuery,
        max_results: usize,
    ) -> Result<SearchResults, SearchError>;

    /// Runs a natural-language search, returning at most `max_results` matches.
    ///
    /// # Errors
    ///
    /// Returns an error if the index cannot be searched.
    async fn search(&self, text: &str, max_results: usize) -> Result<SearchResults, SearchError>;

    /// Names of all indexed fields.
    ///
    /// This is introspection for schema convenience only. The default
    /// implementation reports the operation as unsupported.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot enumerate its fields.
    fn indexed_field_names(&self) -> Result<Vec<String>, SearchError> {
        Err(SearchError::unsupported("indexed field names"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullSearcher;

    #[async_trait]
    impl Searcher for NullSearcher {
        fn name(&self) -> &str {
            "Null"
        }

        async fn execute(
            &self,
            _query: &SearchQuery,
            _max_results: usize,
        ) -> Result<SearchResults, SearchError> {
            Ok(SearchResults::default())
        }

        async fn search(
            &self,
            _text: &str,
            _max_results: usize,
        ) -> Result<SearchResults, SearchError> {
            Ok(SearchResults::default())
        }
    }

    #[test]
    fn test_default_field_names_unsupported() {
        assert!(matches!(
            NullSearcher.indexed_field_names(),
            Err(SearchError::Unsupported { .. })
        ));
    }

    #[tokio::test]
    async fn test_trait_object_dispatch() {
        let searcher: crate::DynSearcher = std::sync::Arc::new(NullSearcher);
        let results = searcher.search("anything", 10).await.unwrap();
        assert!(results.is_empty());
        assert_eq!(searcher.name(), "Null");
    }
}
