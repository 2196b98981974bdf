//! Runtime property values.

use std::fmt;
use std::sync::Arc;

use time::OffsetDateTime;
use uuid::Uuid;

use crate::media::{ImageCropperValue, MediaWithCrops};
use crate::published::{PublishedContent, PublishedElement};

/// Fallback policy when a culture has no value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Fallback {
    /// Return nothing.
    #[default]
    None,
    /// Follow the requested language's configured fallback languages.
    ToLanguage,
}

/// A converted property value.
#[derive(Clone)]
pub enum PropertyValue {
    Null,
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    DateTime(OffsetDateTime),
    Guid(Uuid),
    Json(serde_json::Value),
    Content(Arc<dyn PublishedContent>),
    Element(Arc<dyn PublishedElement>),
    MediaWithCrops(MediaWithCrops),
    ImageCropper(ImageCropperValue),
    List(Vec<PropertyValue>),
}

impl PropertyValue {
    /// Whether the value is `Null`.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the string content of a `String` value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Debug for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::String(s) => f.debug_tuple("String").field(s).finish(),
            Self::Integer(n) => f.debug_tuple("Integer").field(n).finish(),
            Self::Float(n) => f.debug_tuple("Float").field(n).finish(),
            Self::Boolean(b) => f.debug_tuple("Boolean").field(b).finish(),
            Self::DateTime(dt) => f.debug_tuple("DateTime").field(dt).finish(),
            Self::Guid(g) => f.debug_tuple("Guid").field(g).finish(),
            Self::Json(v) => f.debug_tuple("Json").field(v).finish(),
            Self::Content(c) => f.debug_tuple("Content").field(&c.id()).finish(),
            Self::Element(e) => f.debug_tuple("Element").field(&e.key()).finish(),
            Self::MediaWithCrops(m) => fmt::Debug::fmt(m, f),
            Self::ImageCropper(v) => f.debug_tuple("ImageCropper").field(v).finish(),
            Self::List(items) => f.debug_tuple("List").field(items).finish(),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        assert!(PropertyValue::Null.is_null());
        assert_eq!(PropertyValue::from("hello").as_str(), Some("hello"));
        assert_eq!(PropertyValue::from(3_i64).as_str(), None);
    }

    #[test]
    fn test_debug_output() {
        let value = PropertyValue::List(vec![PropertyValue::from(true), PropertyValue::Null]);
        assert_eq!(format!("{value:?}"), "List([Boolean(true), Null])");
    }
}
