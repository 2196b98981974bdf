//! Content model error types.

/// Errors raised by the content model and its backends.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// A model type notation could not be parsed.
    #[error("Invalid model type '{value}': {message}")]
    InvalidModelType {
        /// The notation that failed to parse.
        value: String,
        /// Why it failed.
        message: String,
    },

    /// A content type alias is not known to the content cache.
    #[error("Unknown content type: {alias}")]
    UnknownContentType {
        /// The unknown alias.
        alias: String,
    },

    /// A referenced content node does not exist.
    #[error("Content not found: {id}")]
    ContentNotFound {
        /// Id or key of the missing node.
        id: String,
    },

    /// A node would become its own ancestor.
    #[error("Content {id} cannot be placed under {parent_id}: the parent chain leads back to it")]
    CyclicParent {
        /// The node being added.
        id: i32,
        /// The requested parent.
        parent_id: i32,
    },

    /// A content type declares the same property alias twice.
    #[error("Duplicate property alias '{property}' on content type '{content_type}'")]
    DuplicateProperty {
        /// The content type alias.
        content_type: String,
        /// The duplicated property alias.
        property: String,
    },

    /// A stored property value could not be converted to its declared type.
    #[error("Cannot convert property '{alias}': {message}")]
    PropertyConversion {
        /// The property alias.
        alias: String,
        /// Description of the conversion failure.
        message: String,
    },

    /// An internal backend error.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl ContentError {
    /// Creates a new `InvalidModelType` error.
    #[must_use]
    pub fn invalid_model_type(value: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidModelType {
            value: value.into(),
            message: message.into(),
        }
    }

    /// Creates a new `UnknownContentType` error.
    #[must_use]
    pub fn unknown_content_type(alias: impl Into<String>) -> Self {
        Self::UnknownContentType {
            alias: alias.into(),
        }
    }

    /// Creates a new `ContentNotFound` error.
    #[must_use]
    pub fn content_not_found(id: impl ToString) -> Self {
        Self::ContentNotFound { id: id.to_string() }
    }

    /// Creates a new `CyclicParent` error.
    #[must_use]
    pub fn cyclic_parent(id: i32, parent_id: i32) -> Self {
        Self::CyclicParent { id, parent_id }
    }

    /// Creates a new `PropertyConversion` error.
    #[must_use]
    pub fn property_conversion(alias: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PropertyConversion {
            alias: alias.into(),
            message: message.into(),
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
        let err = ContentError::property_conversion("price", "expected a number");
        assert_eq!(
            err.to_string(),
            "Cannot convert property 'price': expected a number"
        );

        let err = ContentError::unknown_content_type("blogPost");
        assert_eq!(err.to_string(), "Unknown content type: blogPost");

        let err = ContentError::content_not_found(1064);
        assert_eq!(err.to_string(), "Content not found: 1064");
    }
}
