//! Content resolvers.
//!
//! Content and element nodes travel through the schema as [`ContentNode`]
//! values tagged with their concrete object type, so interface-typed fields
//! (`PublishedContent`, `PublishedElement`) resolve to the right object.

use std::fmt;
use std::sync::Arc;

use async_graphql::dynamic::{FieldFuture, FieldValue, ResolverContext, TypeRef};
use async_graphql::Value;
use contentql_model::{
    ContentError, ContentType, Fallback, IMAGE_CROPPER_VALUE, MEDIA_WITH_CROPS, MediaWithCrops,
    PropertyValue, PublishedContent, PublishedElement,
};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, trace, warn};
use uuid::Uuid;

use super::{float_value, get_graphql_context, json_to_graphql_value};
use crate::context::GraphQLContext;
use crate::error::GraphQLError;
use crate::schema::{
    ContentTypeNames, DATETIME_SCALAR, FieldShape, GraphType, GraphTypeKind, JSON_SCALAR,
    LONG_SCALAR, PUBLISHED_CONTENT, PUBLISHED_ELEMENT,
};

/// A published node as a GraphQL parent value.
#[derive(Clone)]
pub enum ContentNode {
    /// A routable content node.
    Content(Arc<dyn PublishedContent>),
    /// A nested element.
    Element(Arc<dyn PublishedElement>),
}

impl ContentNode {
    /// Unique key of the node.
    #[must_use]
    pub fn key(&self) -> Uuid {
        match self {
            Self::Content(content) => content.key(),
            Self::Element(element) => element.key(),
        }
    }

    /// Content type of the node.
    #[must_use]
    pub fn content_type(&self) -> &ContentType {
        match self {
            Self::Content(content) => content.content_type(),
            Self::Element(element) => element.content_type(),
        }
    }

    /// Reads a property value.
    ///
    /// # Errors
    ///
    /// Returns the content cache's error unchanged.
    pub fn value(
        &self,
        alias: &str,
        culture: Option<&str>,
        fallback: Fallback,
    ) -> Result<PropertyValue, ContentError> {
        match self {
            Self::Content(content) => content.value(alias, culture, fallback),
            Self::Element(element) => element.value(alias, culture, fallback),
        }
    }

    /// The routable node, if this is content.
    #[must_use]
    pub fn as_content(&self) -> Option<&Arc<dyn PublishedContent>> {
        match self {
            Self::Content(content) => Some(content),
            Self::Element(_) => None,
        }
    }

    /// Wraps the node as a field value tagged with its object type.
    pub(crate) fn into_field_value<'a>(self, names: &ContentTypeNames) -> FieldValue<'a> {
        let type_name = names.object_name(self.content_type()).to_string();
        FieldValue::owned_any(self).with_type(type_name)
    }
}

impl fmt::Debug for ContentNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Content(content) => f.debug_tuple("Content").field(&content.id()).finish(),
            Self::Element(element) => f.debug_tuple("Element").field(&element.key()).finish(),
        }
    }
}

fn content_list<'a>(
    nodes: Vec<Arc<dyn PublishedContent>>,
    names: &ContentTypeNames,
) -> FieldValue<'a> {
    FieldValue::list(
        nodes
            .into_iter()
            .map(|node| ContentNode::Content(node).into_field_value(names)),
    )
}

fn culture_argument(ctx: &ResolverContext<'_>) -> Option<String> {
    ctx.args
        .get("culture")
        .and_then(|v| v.string().ok().map(str::to_string))
}

/// Resolver for content-type property fields.
pub struct PropertyResolver;

impl PropertyResolver {
    /// Creates a resolver reading `alias` from the parent node.
    ///
    /// The value is read in the requested culture (or the request culture)
    /// with fallback to the language chain. Read failures propagate as field
    /// errors with the content cache's message.
    pub fn resolve(
        alias: String,
        shape: FieldShape,
        names: Arc<ContentTypeNames>,
    ) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        move |ctx| {
            let alias = alias.clone();
            let shape = shape.clone();
            let names = Arc::clone(&names);
            FieldFuture::new(async move {
                let node = ctx.parent_value.try_downcast_ref::<ContentNode>()?;
                let argument = culture_argument(&ctx);
                let culture = match ctx.data_opt::<GraphQLContext>() {
                    Some(gql_ctx) => gql_ctx.culture_or(argument.as_deref()).map(str::to_string),
                    None => argument,
                };

                let value = node
                    .value(&alias, culture.as_deref(), Fallback::ToLanguage)
                    .map_err(|e| {
                        warn!(alias = %alias, error = %e, "Property read failed");
                        GraphQLError::from(e).to_field_error()
                    })?;

                Ok(to_field_value(value, &shape, &names))
            })
        }
    }
}

/// Converts a property value to the field's declared shape.
///
/// Values that cannot be represented by the field type resolve to null.
pub(crate) fn to_field_value<'a>(
    value: PropertyValue,
    shape: &FieldShape,
    names: &ContentTypeNames,
) -> Option<FieldValue<'a>> {
    let graph_type = &shape.graph_type;
    if shape.list {
        let items = match value {
            PropertyValue::Null => return None,
            PropertyValue::List(items) => items,
            PropertyValue::Json(serde_json::Value::Array(items)) => {
                items.into_iter().map(PropertyValue::Json).collect()
            }
            single => vec![single],
        };
        return Some(FieldValue::list(items.into_iter().map(|item| {
            to_item(item, graph_type, names).unwrap_or(FieldValue::NULL)
        })));
    }

    match value {
        PropertyValue::List(items) if graph_type.name != JSON_SCALAR => items
            .into_iter()
            .find(|item| !item.is_null())
            .and_then(|item| to_item(item, graph_type, names)),
        other => to_item(other, graph_type, names),
    }
}

fn to_item<'a>(
    value: PropertyValue,
    graph_type: &GraphType,
    names: &ContentTypeNames,
) -> Option<FieldValue<'a>> {
    if value.is_null() {
        return None;
    }

    let converted = match graph_type.name.as_str() {
        TypeRef::STRING => scalar_string(&value).map(|s| FieldValue::value(Value::String(s))),
        TypeRef::ID => match &value {
            PropertyValue::Guid(guid) => Some(FieldValue::value(Value::String(guid.to_string()))),
            PropertyValue::String(s) => Some(FieldValue::value(Value::String(s.clone()))),
            PropertyValue::Integer(n) => Some(FieldValue::value(Value::String(n.to_string()))),
            _ => None,
        },
        // GraphQL Int is 32-bit.
        TypeRef::INT => integer_value(&value)
            .and_then(|n| i32::try_from(n).ok())
            .map(|n| FieldValue::value(Value::from(n))),
        LONG_SCALAR => integer_value(&value).map(|n| FieldValue::value(Value::from(n))),
        TypeRef::FLOAT => match &value {
            PropertyValue::Float(f) => Some(FieldValue::value(float_value(*f))),
            PropertyValue::Integer(n) => Some(FieldValue::value(float_value(*n as f64))),
            PropertyValue::String(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .map(|f| FieldValue::value(float_value(f))),
            _ => None,
        },
        TypeRef::BOOLEAN => match &value {
            PropertyValue::Boolean(b) => Some(FieldValue::value(Value::Boolean(*b))),
            PropertyValue::Integer(n) => Some(FieldValue::value(Value::Boolean(*n != 0))),
            _ => None,
        },
        DATETIME_SCALAR => match &value {
            PropertyValue::DateTime(dt) => {
                format_datetime(*dt).map(|s| FieldValue::value(Value::String(s)))
            }
            PropertyValue::String(s) => Some(FieldValue::value(Value::String(s.clone()))),
            _ => None,
        },
        JSON_SCALAR => Some(FieldValue::value(json_to_graphql_value(property_json(
            &value,
        )))),
        PUBLISHED_CONTENT => match value {
            PropertyValue::Content(content) => {
                Some(ContentNode::Content(content).into_field_value(names))
            }
            PropertyValue::MediaWithCrops(media) => {
                Some(ContentNode::Content(media.media_item).into_field_value(names))
            }
            _ => None,
        },
        PUBLISHED_ELEMENT => match value {
            PropertyValue::Element(element) => {
                Some(ContentNode::Element(element).into_field_value(names))
            }
            PropertyValue::Content(content) => {
                Some(ContentNode::Content(content).into_field_value(names))
            }
            _ => None,
        },
        MEDIA_WITH_CROPS => match value {
            PropertyValue::MediaWithCrops(media) => Some(FieldValue::owned_any(media)),
            PropertyValue::Content(content) => Some(FieldValue::owned_any(MediaWithCrops {
                media_item: content,
                local_crops: Default::default(),
            })),
            _ => None,
        },
        IMAGE_CROPPER_VALUE => match value {
            PropertyValue::ImageCropper(cropper) => Some(FieldValue::owned_any(cropper)),
            PropertyValue::MediaWithCrops(media) => Some(FieldValue::owned_any(media.local_crops)),
            _ => None,
        },
        _ => match graph_type.kind {
            GraphTypeKind::Interface => None,
            _ => Some(FieldValue::value(json_to_graphql_value(property_json(
                &value,
            )))),
        },
    };

    if converted.is_none() {
        trace!(graph_type = %graph_type, "Value does not fit field type");
    }
    converted
}

fn integer_value(value: &PropertyValue) -> Option<i64> {
    match value {
        PropertyValue::Integer(n) => Some(*n),
        PropertyValue::Float(f) if f.is_finite() => Some(f.trunc() as i64),
        PropertyValue::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

pub(crate) fn format_datetime(dt: OffsetDateTime) -> Option<String> {
    dt.format(&Rfc3339).ok()
}

/// Renders a value as a string for `String` fields.
fn scalar_string(value: &PropertyValue) -> Option<String> {
    match value {
        PropertyValue::Null => None,
        PropertyValue::String(s) => Some(s.clone()),
        PropertyValue::Integer(n) => Some(n.to_string()),
        PropertyValue::Float(f) => Some(f.to_string()),
        PropertyValue::Boolean(b) => Some(b.to_string()),
        PropertyValue::DateTime(dt) => format_datetime(*dt),
        PropertyValue::Guid(guid) => Some(guid.to_string()),
        PropertyValue::Json(serde_json::Value::String(s)) => Some(s.clone()),
        PropertyValue::Json(json) => Some(json.to_string()),
        PropertyValue::Content(content) => content.name(None),
        PropertyValue::Element(element) => Some(element.key().to_string()),
        PropertyValue::MediaWithCrops(media) => media.media_item.url(None),
        PropertyValue::ImageCropper(cropper) => cropper.src.clone(),
        PropertyValue::List(items) => {
            let parts: Vec<String> = items.iter().filter_map(scalar_string).collect();
            Some(parts.join(","))
        }
    }
}

/// Renders a value as JSON for `JSON` fields and custom types.
fn property_json(value: &PropertyValue) -> serde_json::Value {
    use serde_json::json;

    match value {
        PropertyValue::Null => serde_json::Value::Null,
        PropertyValue::String(s) => json!(s),
        PropertyValue::Integer(n) => json!(n),
        PropertyValue::Float(f) => json!(f),
        PropertyValue::Boolean(b) => json!(b),
        PropertyValue::DateTime(dt) => json!(format_datetime(*dt)),
        PropertyValue::Guid(guid) => json!(guid.to_string()),
        PropertyValue::Json(json) => json.clone(),
        PropertyValue::Content(content) => json!({
            "id": content.id(),
            "key": content.key().to_string(),
            "name": content.name(None),
            "contentType": content.content_type().alias,
        }),
        PropertyValue::Element(element) => json!({
            "key": element.key().to_string(),
            "contentType": element.content_type().alias,
        }),
        PropertyValue::MediaWithCrops(media) => json!({
            "mediaId": media.media_item.id(),
            "crops": serde_json::to_value(&media.local_crops).unwrap_or_default(),
        }),
        PropertyValue::ImageCropper(cropper) => {
            serde_json::to_value(cropper).unwrap_or_default()
        }
        PropertyValue::List(items) => {
            serde_json::Value::Array(items.iter().map(property_json).collect())
        }
    }
}

/// Resolver for the `_`-prefixed system fields of content and elements.
pub struct SystemFieldResolver;

impl SystemFieldResolver {
    /// Creates a resolver for the named system field.
    pub fn resolve(
        field: &'static str,
        names: Arc<ContentTypeNames>,
    ) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        move |ctx| {
            let names = Arc::clone(&names);
            FieldFuture::new(async move {
                let node = ctx.parent_value.try_downcast_ref::<ContentNode>()?;
                resolve_system_field(field, node, &ctx, &names)
            })
        }
    }
}

fn resolve_system_field<'a>(
    field: &str,
    node: &ContentNode,
    ctx: &ResolverContext<'_>,
    names: &ContentTypeNames,
) -> async_graphql::Result<Option<FieldValue<'a>>> {
    match field {
        "_key" => return Ok(Some(FieldValue::value(Value::String(node.key().to_string())))),
        "_contentType" => {
            return Ok(Some(FieldValue::value(Value::String(
                node.content_type().alias.clone(),
            ))));
        }
        _ => {}
    }

    let Some(content) = node.as_content() else {
        return Ok(None);
    };

    let value = match field {
        "_id" => Value::from(content.id()),
        "_level" => Value::from(content.level()),
        "_sortOrder" => Value::from(content.sort_order()),
        "_createDate" => format_datetime(content.create_date()).map_or(Value::Null, Value::String),
        "_updateDate" => format_datetime(content.update_date()).map_or(Value::Null, Value::String),
        "_name" | "_url" => {
            let argument = culture_argument(ctx);
            let culture = match ctx.data_opt::<GraphQLContext>() {
                Some(gql_ctx) => gql_ctx.culture_or(argument.as_deref()).map(str::to_string),
                None => argument,
            };
            let text = if field == "_name" {
                content.name(culture.as_deref())
            } else {
                content.url(culture.as_deref())
            };
            text.map_or(Value::Null, Value::String)
        }
        "_parent" => {
            let gql_ctx = get_graphql_context(ctx)?;
            return Ok(content
                .parent_id()
                .and_then(|id| gql_ctx.content.get_by_id(id))
                .map(|parent| ContentNode::Content(parent).into_field_value(names)));
        }
        "_children" => {
            let gql_ctx = get_graphql_context(ctx)?;
            let argument = culture_argument(ctx);
            let culture = gql_ctx.culture_or(argument.as_deref());
            let children = gql_ctx.content.get_children(content.id(), culture);
            return Ok(Some(content_list(children, names)));
        }
        other => {
            return Err(async_graphql::Error::new(format!(
                "Unknown system field: {other}"
            )));
        }
    };
    Ok(Some(FieldValue::value(value)))
}

/// Resolvers for the content root fields.
pub struct ContentQueryResolver;

impl ContentQueryResolver {
    /// `content(id: Int, key: ID): PublishedContent`
    pub fn by_id_or_key(
        names: Arc<ContentTypeNames>,
    ) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        move |ctx| {
            let names = Arc::clone(&names);
            FieldFuture::new(async move {
                let gql_ctx = get_graphql_context(&ctx)?;
                let id = ctx.args.get("id").and_then(|v| v.i64().ok());
                let key = ctx
                    .args
                    .get("key")
                    .and_then(|v| v.string().ok().map(str::to_string));

                let node = match (id, key) {
                    (Some(id), _) => {
                        let id = i32::try_from(id).map_err(|_| {
                            GraphQLError::InvalidArgument(format!("id {id} is out of range"))
                                .to_field_error()
                        })?;
                        gql_ctx.content.get_by_id(id)
                    }
                    (None, Some(key)) => {
                        let key = Uuid::parse_str(&key).map_err(|e| {
                            GraphQLError::InvalidArgument(format!("invalid key '{key}': {e}"))
                                .to_field_error()
                        })?;
                        gql_ctx.content.get_by_key(key)
                    }
                    (None, None) => {
                        return Err(GraphQLError::InvalidArgument(
                            "either id or key must be provided".to_string(),
                        )
                        .to_field_error());
                    }
                };

                debug!(request_id = %gql_ctx.request_id, found = node.is_some(), "Resolved content");
                Ok(node.map(|node| ContentNode::Content(node).into_field_value(&names)))
            })
        }
    }

    /// `contentAtRoot(culture: String): [PublishedContent!]!`
    pub fn at_root(
        names: Arc<ContentTypeNames>,
    ) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        move |ctx| {
            let names = Arc::clone(&names);
            FieldFuture::new(async move {
                let gql_ctx = get_graphql_context(&ctx)?;
                let argument = culture_argument(&ctx);
                let nodes = gql_ctx
                    .content
                    .get_at_root(gql_ctx.culture_or(argument.as_deref()));
                Ok(Some(content_list(nodes, &names)))
            })
        }
    }

    /// `contentByType(contentType: String!): [PublishedContent!]!`
    pub fn by_type(
        names: Arc<ContentTypeNames>,
    ) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        move |ctx| {
            let names = Arc::clone(&names);
            FieldFuture::new(async move {
                let gql_ctx = get_graphql_context(&ctx)?;
                let alias = ctx.args.try_get("contentType")?.string()?.to_string();
                let nodes = gql_ctx.content.get_by_content_type(&alias);
                Ok(Some(content_list(nodes, &names)))
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::TypeRegistry;

    fn shape(notation: &str) -> FieldShape {
        let property = contentql_model::PropertyType::new("p", notation.parse().unwrap());
        FieldShape::of(&property, &TypeRegistry::default())
    }

    #[test]
    fn test_scalar_string_rendering() {
        assert_eq!(scalar_string(&PropertyValue::from(42_i64)).as_deref(), Some("42"));
        assert_eq!(
            scalar_string(&PropertyValue::List(vec!["a".into(), PropertyValue::Null, "b".into()]))
                .as_deref(),
            Some("a,b")
        );
        assert_eq!(scalar_string(&PropertyValue::Null), None);
    }

    #[test]
    fn test_property_json() {
        let value = PropertyValue::List(vec![PropertyValue::from(true), PropertyValue::Null]);
        assert_eq!(property_json(&value), serde_json::json!([true, null]));
    }

    #[test]
    fn test_null_and_mismatch_resolve_to_none() {
        let names = ContentTypeNames::default();
        assert!(to_field_value(PropertyValue::Null, &shape("Integer"), &names).is_none());
        assert!(to_field_value(PropertyValue::from("abc"), &shape("Integer"), &names).is_none());
        assert!(to_field_value(PropertyValue::from("12"), &shape("Integer"), &names).is_some());
        assert!(to_field_value(PropertyValue::Null, &shape("[String]"), &names).is_none());
    }
}
