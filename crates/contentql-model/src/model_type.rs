//! Declared value types of content properties.
//!
//! A [`ModelType`] is a [`BaseType`] wrapped in zero or more `Optional` and
//! `List` layers. Types have a compact text notation used by fixtures and
//! configuration:
//!
//! | Notation          | Meaning                                        |
//! |-------------------|------------------------------------------------|
//! | `String`          | built-in base type                             |
//! | `Integer?`        | optional integer                               |
//! | `[String]`        | list of strings                                |
//! | `Page@content`    | object type with the published-content capability |
//! | `Block@element`   | object type with the published-element capability  |
//! | `MediaWithCrops`  | object type with no capability                 |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ContentError;

/// Object type name of a media item with local crops.
pub const MEDIA_WITH_CROPS: &str = "MediaWithCrops";

/// Object type name of an image cropper value.
pub const IMAGE_CROPPER_VALUE: &str = "ImageCropperValue";

/// Capability tag of an object type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    /// Behaves as published content (routable, cache-backed node).
    Content,
    /// Behaves as a published element (nested, non-routable node).
    Element,
    /// Plain object.
    #[default]
    Other,
}

/// Base type of a property value, with all wrapping removed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BaseType {
    String,
    Integer,
    Long,
    Decimal,
    Double,
    Boolean,
    DateTime,
    Guid,
    /// Untyped JSON token. Structurally enumerable over its children.
    Json,
    /// Named object type.
    Object {
        /// Type name.
        name: String,
        /// Capability tag.
        capability: Capability,
    },
}

impl BaseType {
    /// Creates a plain object type.
    #[must_use]
    pub fn object(name: impl Into<String>) -> Self {
        Self::Object {
            name: name.into(),
            capability: Capability::Other,
        }
    }

    /// Creates an object type with the published-content capability.
    #[must_use]
    pub fn content(name: impl Into<String>) -> Self {
        Self::Object {
            name: name.into(),
            capability: Capability::Content,
        }
    }

    /// Creates an object type with the published-element capability.
    #[must_use]
    pub fn element(name: impl Into<String>) -> Self {
        Self::Object {
            name: name.into(),
            capability: Capability::Element,
        }
    }

    /// Returns the capability tag. Non-object types are always `Other`.
    #[must_use]
    pub fn capability(&self) -> Capability {
        match self {
            Self::Object { capability, .. } => *capability,
            _ => Capability::Other,
        }
    }

    fn keyword(&self) -> Option<&'static str> {
        Some(match self {
            Self::String => "String",
            Self::Integer => "Integer",
            Self::Long => "Long",
            Self::Decimal => "Decimal",
            Self::Double => "Double",
            Self::Boolean => "Boolean",
            Self::DateTime => "DateTime",
            Self::Guid => "Guid",
            Self::Json => "Json",
            Self::Object { .. } => return None,
        })
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(keyword) = self.keyword() {
            return f.write_str(keyword);
        }
        match self {
            Self::Object {
                name,
                capability: Capability::Content,
            } => write!(f, "{name}@content"),
            Self::Object {
                name,
                capability: Capability::Element,
            } => write!(f, "{name}@element"),
            Self::Object { name, .. } => f.write_str(name),
            _ => Ok(()),
        }
    }
}

impl FromStr for BaseType {
    type Err = ContentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let base = match s {
            "String" => Self::String,
            "Integer" => Self::Integer,
            "Long" => Self::Long,
            "Decimal" => Self::Decimal,
            "Double" => Self::Double,
            "Boolean" => Self::Boolean,
            "DateTime" => Self::DateTime,
            "Guid" => Self::Guid,
            "Json" => Self::Json,
            other => {
                let (name, capability) = match other.split_once('@') {
                    Some((name, "content")) => (name, Capability::Content),
                    Some((name, "element")) => (name, Capability::Element),
                    Some((name, "other")) => (name, Capability::Other),
                    Some((_, tag)) => {
                        return Err(ContentError::invalid_model_type(
                            s,
                            format!("unknown capability '{tag}'"),
                        ));
                    }
                    None => (other, Capability::Other),
                };
                if !is_type_name(name) {
                    return Err(ContentError::invalid_model_type(s, "invalid type name"));
                }
                Self::Object {
                    name: name.to_string(),
                    capability,
                }
            }
        };
        Ok(base)
    }
}

/// Declared value type of a property.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ModelType {
    /// A bare base type.
    Base(BaseType),
    /// Nullable wrapper.
    Optional(Box<ModelType>),
    /// Enumerable wrapper.
    List(Box<ModelType>),
}

impl ModelType {
    /// Wraps this type as optional.
    #[must_use]
    pub fn optional(self) -> Self {
        Self::Optional(Box::new(self))
    }

    /// Wraps this type as a list.
    #[must_use]
    pub fn list(self) -> Self {
        Self::List(Box::new(self))
    }

    /// Strips every `Optional` and `List` layer.
    #[must_use]
    pub fn base(&self) -> &BaseType {
        match self {
            Self::Base(base) => base,
            Self::Optional(inner) | Self::List(inner) => inner.base(),
        }
    }

    /// Whether values of this type are enumerable.
    ///
    /// JSON tokens count as enumerable because a token iterates its children,
    /// even when it is used as a single composite value.
    #[must_use]
    pub fn is_enumerable(&self) -> bool {
        match self {
            Self::List(_) => true,
            Self::Optional(inner) => inner.is_enumerable(),
            Self::Base(base) => matches!(base, BaseType::Json),
        }
    }
}

impl From<BaseType> for ModelType {
    fn from(base: BaseType) -> Self {
        Self::Base(base)
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Base(base) => write!(f, "{base}"),
            Self::Optional(inner) => write!(f, "{inner}?"),
            Self::List(inner) => write!(f, "[{inner}]"),
        }
    }
}

impl FromStr for ModelType {
    type Err = ContentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ContentError::invalid_model_type(s, "empty type"));
        }
        if let Some(inner) = s.strip_suffix('?') {
            return Ok(inner.parse::<ModelType>()?.optional());
        }
        if let Some(inner) = s.strip_prefix('[') {
            let inner = inner
                .strip_suffix(']')
                .ok_or_else(|| ContentError::invalid_model_type(s, "unterminated list"))?;
            return Ok(inner.parse::<ModelType>()?.list());
        }
        s.parse::<BaseType>().map(Self::Base)
    }
}

impl TryFrom<String> for ModelType {
    type Error = ContentError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ModelType> for String {
    fn from(value: ModelType) -> Self {
        value.to_string()
    }
}

fn is_type_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_wrappers() {
        let ty: ModelType = "[Page@content]?".parse().unwrap();
        assert_eq!(
            ty,
            ModelType::from(BaseType::content("Page")).list().optional()
        );
        assert_eq!(ty.to_string(), "[Page@content]?");
        assert_eq!(ty.base(), &BaseType::content("Page"));
    }

    #[test]
    fn test_parse_keywords() {
        assert_eq!(
            "Integer?".parse::<ModelType>().unwrap(),
            ModelType::from(BaseType::Integer).optional()
        );
        assert_eq!(
            "MediaWithCrops".parse::<ModelType>().unwrap().base(),
            &BaseType::object(MEDIA_WITH_CROPS)
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!("".parse::<ModelType>().is_err());
        assert!("[String".parse::<ModelType>().is_err());
        assert!("Page@widget".parse::<ModelType>().is_err());
        assert!("1Page".parse::<ModelType>().is_err());
    }

    #[test]
    fn test_is_enumerable() {
        assert!("[String]".parse::<ModelType>().unwrap().is_enumerable());
        assert!("[String]?".parse::<ModelType>().unwrap().is_enumerable());
        assert!("Json".parse::<ModelType>().unwrap().is_enumerable());
        assert!(!"String".parse::<ModelType>().unwrap().is_enumerable());
        assert!(!"Page@content".parse::<ModelType>().unwrap().is_enumerable());
    }

    #[test]
    fn test_capability() {
        assert_eq!(BaseType::content("Page").capability(), Capability::Content);
        assert_eq!(BaseType::element("Block").capability(), Capability::Element);
        assert_eq!(BaseType::Json.capability(), Capability::Other);
    }

    #[test]
    fn test_serde_uses_notation() {
        let ty: ModelType = serde_json::from_str("\"[Block@element]\"").unwrap();
        assert_eq!(ty, ModelType::from(BaseType::element("Block")).list());
        assert_eq!(serde_json::to_string(&ty).unwrap(), "\"[Block@element]\"");
    }
}
