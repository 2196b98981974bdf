//! Field generation for content-type properties.

use std::sync::Arc;

use async_graphql::dynamic::{Field, InputValue, TypeRef};
use contentql_model::{ContentType, PropertyType};
use tracing::trace;

use super::content::ContentTypeNames;
use super::naming::to_camel_case;
use super::registry::{GraphType, TypeRegistry};
use crate::resolvers::PropertyResolver;

/// Resolved GraphQL shape of a property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldShape {
    /// Named type after unwrapping and registry lookup.
    pub graph_type: Arc<GraphType>,
    /// Wrapped in a list with nullable items.
    pub list: bool,
    /// Wrapped as non-null.
    pub non_null: bool,
}

impl FieldShape {
    /// Resolves the shape of a property.
    ///
    /// Enumerable declared types become lists, except for the grid editor,
    /// whose JSON value is one composite object. Mandatory properties are
    /// non-null.
    #[must_use]
    pub fn of(property: &PropertyType, registry: &TypeRegistry) -> Self {
        Self {
            graph_type: registry.resolve(&property.value_type),
            list: property.value_type.is_enumerable() && !property.is_grid(),
            non_null: property.mandatory,
        }
    }

    /// The wrapped type reference.
    #[must_use]
    pub fn type_ref(&self) -> TypeRef {
        let name = self.graph_type.name.as_str();
        match (self.list, self.non_null) {
            (true, true) => TypeRef::named_list_nn(name),
            (true, false) => TypeRef::named_list(name),
            (false, true) => TypeRef::named_nn(name),
            (false, false) => TypeRef::named(name),
        }
    }
}

/// Builds the schema field for one property of a content type.
///
/// The field is named by camel-casing the alias. Culture-variant properties
/// accept an optional `culture` argument.
#[must_use]
pub fn build_property_field(
    content_type: &ContentType,
    property: &PropertyType,
    registry: &TypeRegistry,
    names: &Arc<ContentTypeNames>,
) -> Field {
    let shape = FieldShape::of(property, registry);
    let field_name = to_camel_case(&property.alias);
    trace!(
        content_type = %content_type.alias,
        property = %property.alias,
        field = %field_name,
        graph_type = %shape.graph_type,
        list = shape.list,
        non_null = shape.non_null,
        "Adding property field"
    );

    let type_ref = shape.type_ref();
    let resolver = PropertyResolver::resolve(property.alias.clone(), shape, Arc::clone(names));
    let mut field = Field::new(field_name, type_ref, resolver);

    if property.varies_by_culture {
        field = field.argument(InputValue::new("culture", TypeRef::named(TypeRef::STRING)));
    }
    if let Some(description) = &property.description {
        field = field.description(description);
    }
    field
}

#[cfg(test)]
mod tests {
    use super::*;
    use contentql_model::editors;

    fn property(alias: &str, notation: &str) -> PropertyType {
        PropertyType::new(alias, notation.parse().unwrap())
    }

    #[test]
    fn test_scalar_shapes() {
        let registry = TypeRegistry::default();

        let shape = FieldShape::of(&property("title", "String"), &registry);
        assert_eq!(shape.type_ref().to_string(), "String");

        let shape = FieldShape::of(&property("count", "Integer").mandatory(), &registry);
        assert_eq!(shape.type_ref().to_string(), "Int!");

        let shape = FieldShape::of(&property("tags", "[String]").mandatory(), &registry);
        assert_eq!(shape.type_ref().to_string(), "[String]!");

        let shape = FieldShape::of(&property("related", "[Page@content]?"), &registry);
        assert_eq!(shape.type_ref().to_string(), "[PublishedContent]");
    }

    #[test]
    fn test_grid_is_not_list_wrapped() {
        let registry = TypeRegistry::default();

        let json = FieldShape::of(&property("data", "Json"), &registry);
        assert!(json.list);

        let grid = FieldShape::of(
            &property("layout", "Json").with_editor(editors::GRID),
            &registry,
        );
        assert!(!grid.list);
        assert_eq!(grid.type_ref().to_string(), "JSON");
    }

    #[test]
    fn test_unmapped_type_is_string() {
        let registry = TypeRegistry::default();
        let shape = FieldShape::of(&property("widget", "Widget").mandatory(), &registry);
        assert_eq!(shape.type_ref().to_string(), "String!");
    }
}
