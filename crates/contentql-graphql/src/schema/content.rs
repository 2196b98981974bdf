//! Content interfaces and object types.
//!
//! Every content type gets one object type named after its alias. Document,
//! media and member types implement both `PublishedContent` and
//! `PublishedElement`; element types implement `PublishedElement` only.
//! Nodes whose content type has no object type of its own resolve as
//! `UnmappedContent` or `UnmappedElement`.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_graphql::dynamic::{Field, InputValue, Interface, InterfaceField, Object, TypeRef};
use contentql_model::{ContentType, IMAGE_CROPPER_VALUE, MEDIA_WITH_CROPS};
use tracing::{debug, trace, warn};

use super::naming::{is_valid_graphql_name, to_camel_case, to_type_name};
use super::property_field::build_property_field;
use super::registry::TypeRegistry;
use super::{
    DATETIME_SCALAR, IMAGE_CROPPER_CROP, IMAGE_CROPPER_FOCAL_POINT, PUBLISHED_CONTENT,
    PUBLISHED_ELEMENT, UNMAPPED_CONTENT, UNMAPPED_ELEMENT,
};
use crate::resolvers::{MediaResolver, SystemFieldResolver};

/// Object type names assigned to content types, keyed by alias.
#[derive(Debug, Clone, Default)]
pub struct ContentTypeNames {
    names: HashMap<String, String>,
}

impl ContentTypeNames {
    /// Assigns an object type name to each content type.
    ///
    /// Content types whose name is not a valid GraphQL name, is reserved, or
    /// was already taken by an earlier content type get no object type.
    #[must_use]
    pub fn assign(content_types: &[Arc<ContentType>], reserved: &HashSet<&str>) -> Self {
        let mut names = HashMap::new();
        let mut taken: HashSet<String> = HashSet::new();

        for content_type in content_types {
            let name = to_type_name(&content_type.alias);
            if !is_valid_graphql_name(&name) {
                warn!(alias = %content_type.alias, name = %name, "Skipping content type with invalid type name");
                continue;
            }
            if reserved.contains(name.as_str()) || !taken.insert(name.clone()) {
                warn!(alias = %content_type.alias, name = %name, "Skipping content type with conflicting type name");
                continue;
            }
            names.insert(content_type.alias.clone(), name);
        }

        Self { names }
    }

    /// Object type of a node with the given content type.
    #[must_use]
    pub fn object_name<'a>(&'a self, content_type: &ContentType) -> &'a str {
        match self.names.get(&content_type.alias) {
            Some(name) => name,
            None if content_type.kind.is_element() => UNMAPPED_ELEMENT,
            None => UNMAPPED_CONTENT,
        }
    }

    /// Whether the content type has an object type of its own.
    #[must_use]
    pub fn contains(&self, alias: &str) -> bool {
        self.names.contains_key(alias)
    }

    /// Assigned type names.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.names.values().map(String::as_str)
    }

    /// Number of content types with an object type.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether no content type has an object type.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

struct SystemField {
    name: &'static str,
    type_ref: TypeRef,
    culture: bool,
    description: &'static str,
}

impl SystemField {
    fn new(name: &'static str, type_ref: TypeRef, description: &'static str) -> Self {
        Self {
            name,
            type_ref,
            culture: false,
            description,
        }
    }

    fn with_culture(mut self) -> Self {
        self.culture = true;
        self
    }

    fn culture_argument() -> InputValue {
        InputValue::new("culture", TypeRef::named(TypeRef::STRING))
    }

    fn interface_field(self) -> InterfaceField {
        let mut field = InterfaceField::new(self.name, self.type_ref).description(self.description);
        if self.culture {
            field = field.argument(Self::culture_argument());
        }
        field
    }

    fn object_field(self, names: &Arc<ContentTypeNames>) -> Field {
        let resolver = SystemFieldResolver::resolve(self.name, Arc::clone(names));
        let mut field = Field::new(self.name, self.type_ref, resolver).description(self.description);
        if self.culture {
            field = field.argument(Self::culture_argument());
        }
        field
    }
}

fn element_system_fields() -> Vec<SystemField> {
    vec![
        SystemField::new("_key", TypeRef::named_nn(TypeRef::ID), "Unique key"),
        SystemField::new(
            "_contentType",
            TypeRef::named_nn(TypeRef::STRING),
            "Content type alias",
        ),
    ]
}

fn content_system_fields() -> Vec<SystemField> {
    let mut fields = vec![SystemField::new(
        "_id",
        TypeRef::named_nn(TypeRef::INT),
        "Numeric id",
    )];
    fields.extend(element_system_fields());
    fields.extend([
        SystemField::new("_name", TypeRef::named(TypeRef::STRING), "Name in the requested culture")
            .with_culture(),
        SystemField::new("_url", TypeRef::named(TypeRef::STRING), "URL in the requested culture")
            .with_culture(),
        SystemField::new("_level", TypeRef::named_nn(TypeRef::INT), "Depth in the content tree"),
        SystemField::new(
            "_sortOrder",
            TypeRef::named_nn(TypeRef::INT),
            "Position among siblings",
        ),
        SystemField::new("_createDate", TypeRef::named_nn(DATETIME_SCALAR), "Creation time"),
        SystemField::new("_updateDate", TypeRef::named_nn(DATETIME_SCALAR), "Last update time"),
        SystemField::new("_parent", TypeRef::named(PUBLISHED_CONTENT), "Parent node"),
        SystemField::new(
            "_children",
            TypeRef::named_nn_list_nn(PUBLISHED_CONTENT),
            "Published children",
        )
        .with_culture(),
    ]);
    fields
}

/// Builds the `PublishedElement` interface.
pub(crate) fn published_element_interface() -> Interface {
    element_system_fields().into_iter().fold(
        Interface::new(PUBLISHED_ELEMENT).description("A published element"),
        |interface, field| interface.field(field.interface_field()),
    )
}

/// Builds the `PublishedContent` interface.
pub(crate) fn published_content_interface() -> Interface {
    content_system_fields().into_iter().fold(
        Interface::new(PUBLISHED_CONTENT).description("A published content node"),
        |interface, field| interface.field(field.interface_field()),
    )
}

fn node_object(name: &str, element: bool, names: &Arc<ContentTypeNames>) -> Object {
    let mut object = Object::new(name).implement(PUBLISHED_ELEMENT);
    let fields = if element {
        element_system_fields()
    } else {
        object = object.implement(PUBLISHED_CONTENT);
        content_system_fields()
    };
    fields
        .into_iter()
        .fold(object, |object, field| object.field(field.object_field(names)))
}

/// Builds the object type of one content type.
///
/// Property fields whose name is invalid or already used on the object are
/// skipped.
pub(crate) fn content_object(
    content_type: &ContentType,
    registry: &TypeRegistry,
    names: &Arc<ContentTypeNames>,
) -> Option<Object> {
    if !names.contains(&content_type.alias) {
        return None;
    }
    let type_name = names.object_name(content_type);
    let element = content_type.kind.is_element();
    let mut object = node_object(type_name, element, names);

    let field_names: HashSet<&'static str> = if element {
        element_system_fields().iter().map(|f| f.name).collect()
    } else {
        content_system_fields().iter().map(|f| f.name).collect()
    };
    let mut property_names: HashSet<String> = HashSet::new();

    for property in &content_type.properties {
        let field_name = to_camel_case(&property.alias);
        if !is_valid_graphql_name(&field_name) {
            warn!(
                content_type = %content_type.alias,
                property = %property.alias,
                field = %field_name,
                "Skipping property with invalid field name"
            );
            continue;
        }
        if field_names.contains(field_name.as_str()) || !property_names.insert(field_name.clone()) {
            warn!(
                content_type = %content_type.alias,
                property = %property.alias,
                field = %field_name,
                "Skipping property with duplicate field name"
            );
            continue;
        }
        object = object.field(build_property_field(content_type, property, registry, names));
    }

    if let Some(description) = &content_type.description {
        object = object.description(description);
    }
    debug!(
        content_type = %content_type.alias,
        type_name = %type_name,
        properties = property_names.len(),
        "Built content object type"
    );
    Some(object)
}

/// Builds the fallback object types for nodes without an object type.
pub(crate) fn unmapped_objects(names: &Arc<ContentTypeNames>) -> [Object; 2] {
    [
        node_object(UNMAPPED_CONTENT, false, names)
            .description("Content whose content type is not exposed"),
        node_object(UNMAPPED_ELEMENT, true, names)
            .description("An element whose content type is not exposed"),
    ]
}

/// Builds the media object types.
pub(crate) fn media_objects(names: &Arc<ContentTypeNames>) -> Vec<Object> {
    trace!("Building media object types");
    vec![
        Object::new(MEDIA_WITH_CROPS)
            .description("A picked media item with crops local to the picking property")
            .field(Field::new(
                "mediaItem",
                TypeRef::named_nn(PUBLISHED_CONTENT),
                MediaResolver::media_item(Arc::clone(names)),
            ))
            .field(Field::new(
                "localCrops",
                TypeRef::named_nn(IMAGE_CROPPER_VALUE),
                MediaResolver::local_crops,
            )),
        Object::new(IMAGE_CROPPER_VALUE)
            .description("An image with a focal point and named crops")
            .field(Field::new(
                "src",
                TypeRef::named(TypeRef::STRING),
                MediaResolver::src,
            ))
            .field(Field::new(
                "focalPoint",
                TypeRef::named(IMAGE_CROPPER_FOCAL_POINT),
                MediaResolver::focal_point,
            ))
            .field(Field::new(
                "crops",
                TypeRef::named_nn_list_nn(IMAGE_CROPPER_CROP),
                MediaResolver::crops,
            )),
        Object::new(IMAGE_CROPPER_FOCAL_POINT)
            .field(Field::new(
                "left",
                TypeRef::named_nn(TypeRef::FLOAT),
                MediaResolver::focal_coordinate(false),
            ))
            .field(Field::new(
                "top",
                TypeRef::named_nn(TypeRef::FLOAT),
                MediaResolver::focal_coordinate(true),
            )),
        Object::new(IMAGE_CROPPER_CROP)
            .field(Field::new(
                "alias",
                TypeRef::named_nn(TypeRef::STRING),
                MediaResolver::crop_field("alias"),
            ))
            .field(Field::new(
                "width",
                TypeRef::named_nn(TypeRef::INT),
                MediaResolver::crop_field("width"),
            ))
            .field(Field::new(
                "height",
                TypeRef::named_nn(TypeRef::INT),
                MediaResolver::crop_field("height"),
            )),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use contentql_model::ContentKind;

    fn content_type(alias: &str, kind: ContentKind) -> Arc<ContentType> {
        Arc::new(ContentType::new(alias, kind))
    }

    #[test]
    fn test_assign_names() {
        let types = vec![
            content_type("blogPost", ContentKind::Document),
            content_type("quote", ContentKind::Element),
        ];
        let names = ContentTypeNames::assign(&types, &HashSet::new());
        assert_eq!(names.object_name(&types[0]), "BlogPost");
        assert_eq!(names.object_name(&types[1]), "Quote");
        assert_eq!(names.len(), 2);
    }

    #[test]
    fn test_conflicts_fall_back_to_unmapped() {
        let types = vec![
            content_type("blog-post", ContentKind::Document),
            content_type("blogPost", ContentKind::Document),
            content_type("query", ContentKind::Document),
            content_type("9lives", ContentKind::Element),
        ];
        let reserved: HashSet<&str> = ["Query"].into_iter().collect();
        let names = ContentTypeNames::assign(&types, &reserved);

        assert_eq!(names.object_name(&types[0]), "BlogPost");
        assert_eq!(names.object_name(&types[1]), UNMAPPED_CONTENT);
        assert_eq!(names.object_name(&types[2]), UNMAPPED_CONTENT);
        assert_eq!(names.object_name(&types[3]), UNMAPPED_ELEMENT);
        assert!(!names.contains("query"));
    }

    #[test]
    fn test_system_fields() {
        let names: Vec<_> = content_system_fields().iter().map(|f| f.name).collect();
        assert_eq!(names[0], "_id");
        assert!(names.contains(&"_children"));
        assert_eq!(element_system_fields().len(), 2);
    }
}
