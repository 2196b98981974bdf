//! Content type and property descriptors.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ContentError;
use crate::model_type::ModelType;

/// Well-known property editor aliases.
pub mod editors {
    /// Rich grid layout editor. Its value is a single JSON object.
    pub const GRID: &str = "grid";
    /// Plain text box.
    pub const TEXTBOX: &str = "textbox";
    /// Rich text editor.
    pub const RICH_TEXT: &str = "richtext";
    /// Content picker.
    pub const CONTENT_PICKER: &str = "contentpicker";
    /// Media picker with local crops.
    pub const MEDIA_PICKER: &str = "mediapicker";
    /// Block list of elements.
    pub const BLOCK_LIST: &str = "blocklist";
}

/// The kind of items a content type describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// Routable document.
    #[default]
    Document,
    /// Media item.
    Media,
    /// Member.
    Member,
    /// Element type, only used nested inside other content.
    Element,
}

impl ContentKind {
    /// Whether items of this kind are elements rather than published content.
    #[must_use]
    pub fn is_element(self) -> bool {
        matches!(self, Self::Element)
    }
}

/// Metadata for one property of a content type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyType {
    /// Property alias, unique within its content type.
    pub alias: String,

    /// Human-readable description.
    #[serde(default)]
    pub description: Option<String>,

    /// Declared value type.
    pub value_type: ModelType,

    /// Whether the value varies by culture.
    #[serde(default)]
    pub varies_by_culture: bool,

    /// Whether a value is required.
    #[serde(default)]
    pub mandatory: bool,

    /// Alias of the property editor.
    #[serde(default)]
    pub editor_alias: String,
}

impl PropertyType {
    /// Creates an invariant, optional property.
    #[must_use]
    pub fn new(alias: impl Into<String>, value_type: ModelType) -> Self {
        Self {
            alias: alias.into(),
            description: None,
            value_type,
            varies_by_culture: false,
            mandatory: false,
            editor_alias: String::new(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Marks the property as varying by culture.
    #[must_use]
    pub fn varies_by_culture(mut self) -> Self {
        self.varies_by_culture = true;
        self
    }

    /// Marks the property as mandatory.
    #[must_use]
    pub fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }

    /// Sets the editor alias.
    #[must_use]
    pub fn with_editor(mut self, editor_alias: impl Into<String>) -> Self {
        self.editor_alias = editor_alias.into();
        self
    }

    /// Whether the property is edited with the grid editor.
    #[must_use]
    pub fn is_grid(&self) -> bool {
        self.editor_alias.eq_ignore_ascii_case(editors::GRID)
    }
}

/// A class of content items and their properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentType {
    /// Content type alias.
    pub alias: String,

    /// Kind of items this type describes.
    #[serde(default)]
    pub kind: ContentKind,

    /// Human-readable description.
    #[serde(default)]
    pub description: Option<String>,

    /// Ordered property descriptors.
    #[serde(default)]
    pub properties: Vec<PropertyType>,
}

impl ContentType {
    /// Creates a content type without properties.
    #[must_use]
    pub fn new(alias: impl Into<String>, kind: ContentKind) -> Self {
        Self {
            alias: alias.into(),
            kind,
            description: None,
            properties: Vec::new(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Appends a property.
    #[must_use]
    pub fn with_property(mut self, property: PropertyType) -> Self {
        self.properties.push(property);
        self
    }

    /// Looks up a property by alias.
    #[must_use]
    pub fn property(&self, alias: &str) -> Option<&PropertyType> {
        self.properties.iter().find(|p| p.alias == alias)
    }

    /// Checks that property aliases are unique.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::DuplicateProperty` for the first repeated alias.
    pub fn validate(&self) -> Result<(), ContentError> {
        let mut seen = HashSet::new();
        for property in &self.properties {
            if !seen.insert(property.alias.as_str()) {
                return Err(ContentError::DuplicateProperty {
                    content_type: self.alias.clone(),
                    property: property.alias.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model_type::BaseType;

    #[test]
    fn test_property_lookup() {
        let page = ContentType::new("homePage", ContentKind::Document)
            .with_property(PropertyType::new("title", BaseType::String.into()).mandatory())
            .with_property(PropertyType::new("body", BaseType::Json.into()).with_editor(editors::GRID));

        assert!(page.property("title").unwrap().mandatory);
        assert!(page.property("body").unwrap().is_grid());
        assert!(page.property("missing").is_none());
        assert!(page.validate().is_ok());
    }

    #[test]
    fn test_duplicate_alias_rejected() {
        let page = ContentType::new("page", ContentKind::Document)
            .with_property(PropertyType::new("title", BaseType::String.into()))
            .with_property(PropertyType::new("title", BaseType::String.into()));

        assert!(matches!(
            page.validate(),
            Err(ContentError::DuplicateProperty { .. })
        ));
    }

    #[test]
    fn test_deserialize_content_type() {
        let json = r#"{
            "alias": "article",
            "kind": "document",
            "properties": [
                {"alias": "tags", "valueType": "[String]", "variesByCulture": true},
                {"alias": "layout", "valueType": "Json", "editorAlias": "Grid"}
            ]
        }"#;

        let ty: ContentType = serde_json::from_str(json).unwrap();
        assert_eq!(ty.kind, ContentKind::Document);
        assert!(ty.properties[0].varies_by_culture);
        assert!(ty.properties[0].value_type.is_enumerable());
        assert!(ty.properties[1].is_grid());
    }
}
