//! Error types for GraphQL operations.
//!
//! Request-level errors are rendered as HTTP responses by the handlers.
//! Collaborator failures inside resolvers become field errors that keep the
//! collaborator's message and add an `extensions.code`.

use std::fmt;

use async_graphql::ErrorExtensions;
use contentql_model::ContentError;
use contentql_search::SearchError;

/// Errors that can occur during GraphQL operations.
#[derive(Debug)]
pub enum GraphQLError {
    /// Schema is still being built - client should retry.
    SchemaInitializing,

    /// Schema build failed.
    SchemaBuildFailed(String),

    /// Invalid query syntax or request body.
    InvalidQuery(String),

    /// A field argument combination is not valid.
    InvalidArgument(String),

    /// The content cache failed.
    Content(String),

    /// A search index failed.
    Search(String),

    /// Internal server error.
    Internal(String),
}

impl fmt::Display for GraphQLError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SchemaInitializing => {
                write!(f, "GraphQL schema is initializing, please retry")
            }
            Self::SchemaBuildFailed(msg) => {
                write!(f, "Failed to build GraphQL schema: {msg}")
            }
            Self::InvalidQuery(msg) => {
                write!(f, "Invalid GraphQL query: {msg}")
            }
            Self::InvalidArgument(msg) => {
                write!(f, "Invalid argument: {msg}")
            }
            Self::Content(msg) => {
                write!(f, "Content error: {msg}")
            }
            Self::Search(msg) => {
                write!(f, "Search error: {msg}")
            }
            Self::Internal(msg) => {
                write!(f, "Internal error: {msg}")
            }
        }
    }
}

impl std::error::Error for GraphQLError {}

impl GraphQLError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::SchemaInitializing => 503,
            Self::SchemaBuildFailed(_) => 500,
            Self::InvalidQuery(_) | Self::InvalidArgument(_) => 400,
            Self::Content(_) | Self::Search(_) => 500,
            Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for GraphQL error extensions.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::SchemaInitializing => "SCHEMA_INITIALIZING",
            Self::SchemaBuildFailed(_) => "SCHEMA_BUILD_FAILED",
            Self::InvalidQuery(_) => "INVALID_QUERY",
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::Content(_) => "CONTENT_ERROR",
            Self::Search(_) => "SEARCH_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the Retry-After header value in seconds, if applicable.
    #[must_use]
    pub fn retry_after(&self) -> Option<u32> {
        match self {
            Self::SchemaInitializing => Some(5),
            _ => None,
        }
    }

    /// Converts the error to a field error.
    ///
    /// Collaborator errors keep their original message.
    #[must_use]
    pub fn to_field_error(&self) -> async_graphql::Error {
        let message = match self {
            Self::Content(msg) | Self::Search(msg) | Self::InvalidArgument(msg) => msg.clone(),
            other => other.to_string(),
        };
        let code = self.error_code();
        async_graphql::Error::new(message).extend_with(|_, extensions| extensions.set("code", code))
    }
}

impl From<ContentError> for GraphQLError {
    fn from(err: ContentError) -> Self {
        Self::Content(err.to_string())
    }
}

impl From<SearchError> for GraphQLError {
    fn from(err: SearchError) -> Self {
        Self::Search(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(GraphQLError::SchemaInitializing.status_code(), 503);
        assert_eq!(GraphQLError::InvalidQuery("test".into()).status_code(), 400);
        assert_eq!(GraphQLError::Search("test".into()).status_code(), 500);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            GraphQLError::SchemaInitializing.error_code(),
            "SCHEMA_INITIALIZING"
        );
        assert_eq!(
            GraphQLError::from(SearchError::invalid_query("bad")).error_code(),
            "SEARCH_ERROR"
        );
    }

    #[test]
    fn test_retry_after() {
        assert_eq!(GraphQLError::SchemaInitializing.retry_after(), Some(5));
        assert_eq!(
            GraphQLError::InvalidQuery("test".into()).retry_after(),
            None
        );
    }

    #[test]
    fn test_field_error_keeps_message() {
        let err = GraphQLError::from(SearchError::invalid_query("unbalanced quote"));
        let field_error = err.to_field_error();
        assert_eq!(field_error.message, "Invalid query: unbalanced quote");

        let err = GraphQLError::from(ContentError::unknown_content_type("blog"));
        assert_eq!(err.to_field_error().message, "Unknown content type: blog");
    }
}
