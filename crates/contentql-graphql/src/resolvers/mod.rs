//! GraphQL resolvers.
//!
//! - `content`: property fields, system fields and root content queries
//! - `search`: the searcher `query` and `search` fields, including the
//!   translation of GraphQL arguments into a [`contentql_search::SearchQuery`]
//! - `media`: media-with-crops and image cropper objects

mod content;
mod media;
mod search;

pub use content::{ContentNode, ContentQueryResolver, PropertyResolver, SystemFieldResolver};
pub use media::MediaResolver;
pub use search::{
    DEFAULT_MAX_RESULTS, QueryArguments, SearchResultResolver, SearcherResolver,
    parse_sort_fields,
};

use async_graphql::dynamic::ResolverContext;
use async_graphql::{Error as GraphQLError, Name, Number, Value};

use crate::context::GraphQLContext;

/// Helper to extract GraphQL context from resolver context.
pub(crate) fn get_graphql_context<'a>(
    ctx: &'a ResolverContext<'_>,
) -> Result<&'a GraphQLContext, GraphQLError> {
    ctx.data::<GraphQLContext>()
        .map_err(|_| GraphQLError::new("GraphQL context not available"))
}

/// Reads a field from a parent that was resolved as an object value.
pub(crate) fn extract_field(ctx: &ResolverContext<'_>, name: &str) -> Option<Value> {
    match ctx.parent_value.as_value() {
        Some(Value::Object(obj)) => obj.get(name).cloned(),
        _ => None,
    }
}

/// Convert a serde_json::Value to async_graphql::Value.
pub(crate) fn json_to_graphql_value(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(b),
        serde_json::Value::Number(n) => Value::Number(n),
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(arr) => {
            Value::List(arr.into_iter().map(json_to_graphql_value).collect())
        }
        serde_json::Value::Object(obj) => Value::Object(
            obj.into_iter()
                .map(|(k, v)| (Name::new(k), json_to_graphql_value(v)))
                .collect(),
        ),
    }
}

/// Converts a float to a GraphQL number; NaN and infinities become null.
pub(crate) fn float_value(value: f64) -> Value {
    Number::from_f64(value).map_or(Value::Null, Value::Number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_to_graphql_value() {
        let value = json_to_graphql_value(json!({
            "name": "Home",
            "level": 1,
            "tags": ["a", "b"],
            "visible": true,
            "parent": null
        }));

        let Value::Object(obj) = value else {
            panic!("expected an object");
        };
        assert_eq!(obj.get("name"), Some(&Value::String("Home".into())));
        assert_eq!(obj.get("level"), Some(&Value::Number(1.into())));
        assert_eq!(obj.get("parent"), Some(&Value::Null));
        assert_eq!(obj.get("visible"), Some(&Value::Boolean(true)));
        assert!(matches!(obj.get("tags"), Some(Value::List(items)) if items.len() == 2));
    }

    #[test]
    fn test_float_value() {
        assert_eq!(float_value(f64::NAN), Value::Null);
        assert!(matches!(float_value(1.5), Value::Number(_)));
    }
}
