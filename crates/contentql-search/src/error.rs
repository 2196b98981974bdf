//! Search error types.

/// Errors raised by search backends.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The native query text could not be parsed.
    #[error("Invalid query: {message}")]
    InvalidQuery {
        /// Description of the syntax problem.
        message: String,
    },

    /// The index cannot currently be searched.
    #[error("Index unavailable: {index}")]
    IndexUnavailable {
        /// Name of the index.
        index: String,
    },

    /// The backend does not support the requested operation.
    #[error("Unsupported operation: {operation}")]
    Unsupported {
        /// Name of the operation.
        operation: String,
    },

    /// An internal backend error.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl SearchError {
    /// Creates a new `InvalidQuery` error.
    #[must_use]
    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::InvalidQuery {
            message: message.into(),
        }
    }

    /// Creates a new `IndexUnavailable` error.
    #[must_use]
    pub fn index_unavailable(index: impl Into<String>) -> Self {
        Self::IndexUnavailable {
            index: index.into(),
        }
    }

    /// Creates a new `Unsupported` error.
    #[must_use]
    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::Unsupported {
            operation: operation.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            SearchError::invalid_query("unbalanced quote").to_string(),
            "Invalid query: unbalanced quote"
        );
        assert_eq!(
            SearchError::index_unavailable("ExternalIndex").to_string(),
            "Index unavailable: ExternalIndex"
        );
    }
}
