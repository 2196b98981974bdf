//! Search resolvers.
//!
//! The `query` field translates its arguments into a [`SearchQuery`]: the raw
//! text is passed to the index verbatim, the category scopes the query, and
//! `sortFields` is a comma-separated list of `name` or `name|type` entries
//! sorted in `sortDir`. The `search` field forwards its text to the index's
//! natural-language search.

use async_graphql::dynamic::{FieldFuture, FieldValue, ResolverContext};
use async_graphql::{Name, Number, Value};
use contentql_search::{
    BooleanOperation, DynSearcher, SearchQuery, SearchResult, SearchResults, SortDirection,
    SortType, SortableField,
};
use tracing::{debug, warn};

use super::{extract_field, float_value, get_graphql_context};
use crate::error::GraphQLError;

/// Result cap applied when `maxResults` is omitted.
pub const DEFAULT_MAX_RESULTS: i64 = 500;

/// Parses a `sortFields` argument.
///
/// Entries are separated by commas and trimmed; empty entries are dropped.
/// An entry is `name` or `name|type`, where `type` is a [`SortType`] tag
/// matched case-insensitively. An unknown tag leaves the field untyped.
/// Entry order is preserved.
#[must_use]
pub fn parse_sort_fields(raw: &str) -> Vec<SortableField> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let mut parts = entry.split('|');
            let name = parts.next().unwrap_or_default().trim();
            match parts.next().map(|tag| tag.trim().parse::<SortType>()) {
                Some(Ok(sort_type)) => SortableField::typed(name, sort_type),
                _ => SortableField::new(name),
            }
        })
        .collect()
}

/// Arguments of a searcher's `query` field with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryArguments {
    pub query: Option<String>,
    pub category: Option<String>,
    pub default_operation: BooleanOperation,
    pub sort_fields: Vec<SortableField>,
    pub sort_direction: SortDirection,
    pub max_results: usize,
}

impl Default for QueryArguments {
    fn default() -> Self {
        Self {
            query: None,
            category: None,
            default_operation: BooleanOperation::And,
            sort_fields: Vec::new(),
            sort_direction: SortDirection::Asc,
            max_results: max_results_from(DEFAULT_MAX_RESULTS),
        }
    }
}

impl QueryArguments {
    /// Reads the arguments of the current field.
    ///
    /// # Errors
    ///
    /// Returns an error if an enum argument carries an unknown item.
    pub fn from_context(ctx: &ResolverContext<'_>) -> async_graphql::Result<Self> {
        let default_operation = match ctx.args.get("defaultOperation") {
            Some(value) => value
                .enum_name()?
                .parse::<BooleanOperation>()
                .map_err(|e| GraphQLError::InvalidArgument(e).to_field_error())?,
            None => BooleanOperation::And,
        };
        let sort_direction = match ctx.args.get("sortDir") {
            Some(value) => value
                .enum_name()?
                .parse::<SortDirection>()
                .map_err(|e| GraphQLError::InvalidArgument(e).to_field_error())?,
            None => SortDirection::Asc,
        };

        Ok(Self {
            query: string_argument(ctx, "query"),
            category: string_argument(ctx, "category"),
            default_operation,
            sort_fields: string_argument(ctx, "sortFields")
                .map(|raw| parse_sort_fields(&raw))
                .unwrap_or_default(),
            sort_direction,
            max_results: max_results_argument(ctx),
        })
    }

    /// Builds the structured query.
    ///
    /// The ordering is only applied when at least one sort field parsed.
    #[must_use]
    pub fn to_search_query(&self) -> SearchQuery {
        let mut query = SearchQuery::new(self.category.as_deref(), self.default_operation);
        if let Some(raw) = &self.query {
            query = query.native_query(raw.clone());
        }
        if !self.sort_fields.is_empty() {
            query = query.ordered(self.sort_direction, self.sort_fields.clone());
        }
        query
    }
}

fn string_argument(ctx: &ResolverContext<'_>, name: &str) -> Option<String> {
    ctx.args
        .get(name)
        .and_then(|v| v.string().ok().map(str::to_string))
}

fn max_results_argument(ctx: &ResolverContext<'_>) -> usize {
    let requested = ctx
        .args
        .get("maxResults")
        .and_then(|v| v.i64().ok())
        .unwrap_or(DEFAULT_MAX_RESULTS);
    max_results_from(requested)
}

fn max_results_from(requested: i64) -> usize {
    usize::try_from(requested.max(0)).unwrap_or(usize::MAX)
}

fn request_id(ctx: &ResolverContext<'_>) -> String {
    get_graphql_context(ctx)
        .map(|gql_ctx| gql_ctx.request_id.clone())
        .unwrap_or_default()
}

/// Resolvers for the `<Index>Searcher` fields.
pub struct SearcherResolver;

impl SearcherResolver {
    /// `query(query, category, defaultOperation, maxResults, sortFields, sortDir)`
    pub fn query(
        searcher: DynSearcher,
    ) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        move |ctx| {
            let searcher = searcher.clone();
            FieldFuture::new(async move {
                let arguments = QueryArguments::from_context(&ctx)?;
                let query = arguments.to_search_query();

                debug!(
                    request_id = %request_id(&ctx),
                    index = %searcher.name(),
                    query = ?arguments.query,
                    category = ?arguments.category,
                    default_operation = %arguments.default_operation,
                    sort_fields = ?arguments.sort_fields,
                    sort_direction = %arguments.sort_direction,
                    max_results = arguments.max_results,
                    native_query = %query,
                    "Executing search query"
                );

                let results = searcher
                    .execute(&query, arguments.max_results)
                    .await
                    .map_err(|e| {
                        warn!(index = %searcher.name(), error = %e, "Search query failed");
                        GraphQLError::from(e).to_field_error()
                    })?;

                Ok(Some(FieldValue::owned_any(results)))
            })
        }
    }

    /// `search(query, maxResults)`
    pub fn search(
        searcher: DynSearcher,
    ) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        move |ctx| {
            let searcher = searcher.clone();
            FieldFuture::new(async move {
                let text = string_argument(&ctx, "query").unwrap_or_default();
                let max_results = max_results_argument(&ctx);

                debug!(
                    request_id = %request_id(&ctx),
                    index = %searcher.name(),
                    text = %text,
                    max_results,
                    "Executing search"
                );

                let results = searcher.search(&text, max_results).await.map_err(|e| {
                    warn!(index = %searcher.name(), error = %e, "Search failed");
                    GraphQLError::from(e).to_field_error()
                })?;

                Ok(Some(FieldValue::owned_any(results)))
            })
        }
    }

    /// A searcher object under the root `searchers` field.
    pub fn searcher_object(_ctx: ResolverContext<'_>) -> FieldFuture<'_> {
        FieldFuture::new(async move { Ok(Some(Value::Object(Default::default()))) })
    }
}

/// Resolvers for search result objects.
pub struct SearchResultResolver;

impl SearchResultResolver {
    /// `SearchResults.totalItemCount`
    pub fn total_item_count(ctx: ResolverContext<'_>) -> FieldFuture<'_> {
        FieldFuture::new(async move {
            let results = ctx.parent_value.try_downcast_ref::<SearchResults>()?;
            Ok(Some(Value::Number(Number::from(results.total_item_count))))
        })
    }

    /// `SearchResults.items`, tagged with the per-index item type.
    pub fn items(
        item_type: String,
    ) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        move |ctx| {
            let item_type = item_type.clone();
            FieldFuture::new(async move {
                let results = ctx.parent_value.try_downcast_ref::<SearchResults>()?;
                Ok(Some(FieldValue::list(results.results.iter().map(
                    |result| FieldValue::owned_any(result.clone()).with_type(item_type.clone()),
                ))))
            })
        }
    }

    /// `SearchResult.id`
    pub fn id(ctx: ResolverContext<'_>) -> FieldFuture<'_> {
        FieldFuture::new(async move {
            let result = ctx.parent_value.try_downcast_ref::<SearchResult>()?;
            Ok(Some(Value::String(result.id.clone())))
        })
    }

    /// `SearchResult.score`
    pub fn score(ctx: ResolverContext<'_>) -> FieldFuture<'_> {
        FieldFuture::new(async move {
            let result = ctx.parent_value.try_downcast_ref::<SearchResult>()?;
            Ok(Some(float_value(f64::from(result.score))))
        })
    }

    /// `SearchResult.category`
    pub fn category(ctx: ResolverContext<'_>) -> FieldFuture<'_> {
        FieldFuture::new(async move {
            let result = ctx.parent_value.try_downcast_ref::<SearchResult>()?;
            Ok(result.category.clone().map(Value::String))
        })
    }

    /// `SearchResult.values`, one `SearchResultField` per stored field.
    pub fn values(ctx: ResolverContext<'_>) -> FieldFuture<'_> {
        FieldFuture::new(async move {
            let result = ctx.parent_value.try_downcast_ref::<SearchResult>()?;
            let fields = result.values.iter().map(|(name, values)| {
                let object = [
                    (Name::new("name"), Value::String(name.clone())),
                    (
                        Name::new("values"),
                        Value::List(values.iter().cloned().map(Value::String).collect()),
                    ),
                ];
                FieldValue::value(Value::Object(object.into_iter().collect()))
            });
            Ok(Some(FieldValue::list(fields)))
        })
    }

    /// `<Index>SearchResult.fields`
    pub fn fields(ctx: ResolverContext<'_>) -> FieldFuture<'_> {
        FieldFuture::new(async move {
            let result = ctx.parent_value.try_downcast_ref::<SearchResult>()?;
            Ok(Some(FieldValue::owned_any(result.clone())))
        })
    }

    /// One field of `<Index>SearchResultFields`, reading the first stored
    /// value of `index_field`.
    pub fn field_value(
        index_field: String,
    ) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        move |ctx| {
            let index_field = index_field.clone();
            FieldFuture::new(async move {
                let result = ctx.parent_value.try_downcast_ref::<SearchResult>()?;
                Ok(result
                    .value(&index_field)
                    .map(|value| Value::String(value.to_string())))
            })
        }
    }

    /// `SearchResultField.name` and `.values`
    pub fn result_field(
        name: &'static str,
    ) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        move |ctx| FieldFuture::new(async move { Ok(extract_field(&ctx, name)) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sort_fields() {
        let fields = parse_sort_fields("name, date|date,  ,title|bogus");
        assert_eq!(
            fields,
            vec![
                SortableField::new("name"),
                SortableField::typed("date", SortType::Date),
                SortableField::new("title"),
            ]
        );
    }

    #[test]
    fn test_parse_sort_fields_case_insensitive_tag() {
        let fields = parse_sort_fields("price|DOUBLE,rank|Int");
        assert_eq!(fields[0].sort_type, Some(SortType::Double));
        assert_eq!(fields[1].sort_type, Some(SortType::Int));
    }

    #[test]
    fn test_parse_sort_fields_empty() {
        assert!(parse_sort_fields("").is_empty());
        assert!(parse_sort_fields(" , ,").is_empty());
    }

    #[test]
    fn test_default_arguments() {
        let arguments = QueryArguments::default();
        assert_eq!(arguments.max_results, 500);
        assert_eq!(arguments.default_operation, BooleanOperation::And);
        assert_eq!(arguments.sort_direction, SortDirection::Asc);
    }

    #[test]
    fn test_to_search_query_without_sort_fields() {
        let arguments = QueryArguments {
            query: Some("+title:home".to_string()),
            category: Some("content".to_string()),
            sort_direction: SortDirection::Desc,
            ..QueryArguments::default()
        };
        let query = arguments.to_search_query();
        assert_eq!(query.native_query.as_deref(), Some("+title:home"));
        assert_eq!(query.category.as_deref(), Some("content"));
        assert!(query.ordering.is_none());
    }

    #[test]
    fn test_to_search_query_descending() {
        let arguments = QueryArguments {
            query: Some("*".to_string()),
            sort_fields: parse_sort_fields("a,b|string"),
            sort_direction: SortDirection::Desc,
            ..QueryArguments::default()
        };
        let ordering = arguments.to_search_query().ordering.unwrap();
        assert_eq!(ordering.direction, SortDirection::Desc);
        assert_eq!(
            ordering.fields,
            vec![
                SortableField::new("a"),
                SortableField::typed("b", SortType::String)
            ]
        );
    }

    #[test]
    fn test_negative_max_results_clamps_to_zero() {
        assert_eq!(max_results_from(-3), 0);
        assert_eq!(max_results_from(20), 20);
    }
}
