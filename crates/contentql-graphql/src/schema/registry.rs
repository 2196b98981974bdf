//! Type registry mapping content-model types to GraphQL types.
//!
//! The registry is built once during schema assembly and is immutable
//! afterwards. Field builders receive it by reference.
//!
//! Lookups go through [`RegistryKey::of`], which strips `Optional`/`List`
//! wrapping and collapses every object type with the published-content
//! capability to one key, and every object type with the published-element
//! capability to another. All content and element variants therefore share
//! the two canonical interfaces instead of producing one GraphQL type each.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_graphql::dynamic::TypeRef;
use contentql_model::{BaseType, Capability, IMAGE_CROPPER_VALUE, MEDIA_WITH_CROPS, ModelType};

use super::{
    DATETIME_SCALAR, JSON_SCALAR, LONG_SCALAR, PUBLISHED_CONTENT, PUBLISHED_ELEMENT,
};

/// Kind of a GraphQL named type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphTypeKind {
    Scalar,
    Object,
    Interface,
    Enum,
}

/// A named GraphQL type known to the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphType {
    /// Type name in the schema.
    pub name: String,
    /// Type kind.
    pub kind: GraphTypeKind,
}

impl GraphType {
    /// Creates a type descriptor.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: GraphTypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Creates a scalar type descriptor.
    #[must_use]
    pub fn scalar(name: impl Into<String>) -> Self {
        Self::new(name, GraphTypeKind::Scalar)
    }

    /// Whether values of this type are returned with a concrete object type.
    #[must_use]
    pub fn is_abstract(&self) -> bool {
        self.kind == GraphTypeKind::Interface
    }
}

impl fmt::Display for GraphType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Registry lookup key: a base type after capability collapsing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RegistryKey {
    String,
    Integer,
    Long,
    Decimal,
    Double,
    Boolean,
    DateTime,
    Guid,
    Json,
    /// Every object type with the published-content capability.
    PublishedContent,
    /// Every object type with the published-element capability.
    PublishedElement,
    /// A plain object type, by name.
    Object(String),
}

impl RegistryKey {
    /// Maps a base type to its key.
    #[must_use]
    pub fn of(base: &BaseType) -> Self {
        match base {
            BaseType::String => Self::String,
            BaseType::Integer => Self::Integer,
            BaseType::Long => Self::Long,
            BaseType::Decimal => Self::Decimal,
            BaseType::Double => Self::Double,
            BaseType::Boolean => Self::Boolean,
            BaseType::DateTime => Self::DateTime,
            BaseType::Guid => Self::Guid,
            BaseType::Json => Self::Json,
            BaseType::Object { name, capability } => match capability {
                Capability::Content => Self::PublishedContent,
                Capability::Element => Self::PublishedElement,
                Capability::Other => Self::Object(name.clone()),
            },
        }
    }

    /// Maps a declared property type to its key, stripping all wrapping.
    #[must_use]
    pub fn of_model_type(model_type: &ModelType) -> Self {
        Self::of(model_type.base())
    }
}

/// Immutable mapping from registry keys to GraphQL types.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    types: HashMap<RegistryKey, Arc<GraphType>>,
    fallback: Arc<GraphType>,
}

impl TypeRegistry {
    /// Creates a builder pre-populated with the default mappings.
    #[must_use]
    pub fn builder() -> TypeRegistryBuilder {
        TypeRegistryBuilder::new()
    }

    /// Looks up the GraphQL type of a declared property type.
    ///
    /// Returns `None` when the unwrapped, collapsed type has no mapping.
    #[must_use]
    pub fn get(&self, model_type: &ModelType) -> Option<Arc<GraphType>> {
        self.get_key(&RegistryKey::of_model_type(model_type))
    }

    /// Looks up a registry key.
    #[must_use]
    pub fn get_key(&self, key: &RegistryKey) -> Option<Arc<GraphType>> {
        self.types.get(key).cloned()
    }

    /// Looks up a declared property type, falling back to `String`.
    #[must_use]
    pub fn resolve(&self, model_type: &ModelType) -> Arc<GraphType> {
        self.get(model_type)
            .unwrap_or_else(|| Arc::clone(&self.fallback))
    }

    /// Number of mappings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether the registry holds no mappings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Names of all mapped types.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.values().map(|ty| ty.name.as_str())
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Builder for [`TypeRegistry`].
#[derive(Debug, Clone)]
pub struct TypeRegistryBuilder {
    types: HashMap<RegistryKey, GraphType>,
}

impl TypeRegistryBuilder {
    /// Creates a builder with the default mappings.
    #[must_use]
    pub fn new() -> Self {
        let defaults = [
            (RegistryKey::String, GraphType::scalar(TypeRef::STRING)),
            (RegistryKey::Integer, GraphType::scalar(TypeRef::INT)),
            (RegistryKey::Long, GraphType::scalar(LONG_SCALAR)),
            (RegistryKey::Decimal, GraphType::scalar(TypeRef::FLOAT)),
            (RegistryKey::Double, GraphType::scalar(TypeRef::FLOAT)),
            (RegistryKey::Boolean, GraphType::scalar(TypeRef::BOOLEAN)),
            (RegistryKey::DateTime, GraphType::scalar(DATETIME_SCALAR)),
            (RegistryKey::Guid, GraphType::scalar(TypeRef::ID)),
            (RegistryKey::Json, GraphType::scalar(JSON_SCALAR)),
            (
                RegistryKey::PublishedContent,
                GraphType::new(PUBLISHED_CONTENT, GraphTypeKind::Interface),
            ),
            (
                RegistryKey::PublishedElement,
                GraphType::new(PUBLISHED_ELEMENT, GraphTypeKind::Interface),
            ),
            (
                RegistryKey::Object(MEDIA_WITH_CROPS.to_string()),
                GraphType::new(MEDIA_WITH_CROPS, GraphTypeKind::Object),
            ),
            (
                RegistryKey::Object(IMAGE_CROPPER_VALUE.to_string()),
                GraphType::new(IMAGE_CROPPER_VALUE, GraphTypeKind::Object),
            ),
        ];
        Self {
            types: defaults.into_iter().collect(),
        }
    }

    /// Adds or replaces a mapping.
    ///
    /// Types registered here must also be registered with the schema
    /// builder.
    #[must_use]
    pub fn register(mut self, key: RegistryKey, graph_type: GraphType) -> Self {
        self.types.insert(key, graph_type);
        self
    }

    /// Finishes the registry.
    #[must_use]
    pub fn build(self) -> TypeRegistry {
        TypeRegistry {
            types: self
                .types
                .into_iter()
                .map(|(key, ty)| (key, Arc::new(ty)))
                .collect(),
            fallback: Arc::new(GraphType::scalar(TypeRef::STRING)),
        }
    }
}

impl Default for TypeRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
