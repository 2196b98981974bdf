//! Search index types.
//!
//! Each index `<Name>` gets four types:
//!
//! - `<Name>Searcher` with the `query` and `search` fields
//! - `<Name>SearchResults` implementing `SearchResults`
//! - `<Name>SearchResult` implementing `SearchResult`
//! - `<Name>SearchResultFields` with one `String` field per indexed field,
//!   only when the index reports any

use std::collections::HashSet;

use async_graphql::dynamic::{
    Enum, Field, InputValue, Interface, InterfaceField, Object, TypeRef,
};
use async_graphql::{Name, Value};
use contentql_search::{BooleanOperation, DynSearcher, SortDirection};
use tracing::{debug, trace, warn};

use super::naming::{is_valid_graphql_name, sanitize_field_name, to_camel_case, to_type_name};
use super::{BOOLEAN_OPERATION, SEARCH_RESULT, SEARCH_RESULT_FIELD, SEARCH_RESULTS, SORT_DIRECTION};
use crate::resolvers::{DEFAULT_MAX_RESULTS, SearchResultResolver, SearcherResolver};

/// Names of the types and root field generated for one index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SearcherNames {
    /// Field under the root `searchers` object.
    pub field: String,
    pub searcher: String,
    pub results: String,
    pub result: String,
    pub result_fields: String,
}

impl SearcherNames {
    /// Derives names from an index name, or `None` if the name cannot be
    /// turned into valid GraphQL names.
    pub fn of(index_name: &str) -> Option<Self> {
        let safe = to_type_name(index_name);
        let field = to_camel_case(index_name);
        if !is_valid_graphql_name(&safe) || !is_valid_graphql_name(&field) {
            return None;
        }
        Some(Self {
            field,
            searcher: format!("{safe}Searcher"),
            results: format!("{safe}SearchResults"),
            result: format!("{safe}SearchResult"),
            result_fields: format!("{safe}SearchResultFields"),
        })
    }

    /// All generated type names.
    pub fn type_names(&self) -> [&str; 4] {
        [
            &self.searcher,
            &self.results,
            &self.result,
            &self.result_fields,
        ]
    }
}

/// Builds the `BooleanOperation` and `SortDirection` enums.
pub(crate) fn search_enums() -> [Enum; 2] {
    [
        Enum::new(BOOLEAN_OPERATION)
            .description("How unprefixed query clauses are combined")
            .item(BooleanOperation::And.as_str())
            .item(BooleanOperation::Or.as_str()),
        Enum::new(SORT_DIRECTION)
            .description("Sort direction")
            .item(SortDirection::Asc.as_str())
            .item(SortDirection::Desc.as_str()),
    ]
}

/// Builds the shared `SearchResults` and `SearchResult` interfaces.
pub(crate) fn search_interfaces() -> [Interface; 2] {
    [
        Interface::new(SEARCH_RESULTS)
            .description("A page of search results")
            .field(InterfaceField::new(
                "totalItemCount",
                TypeRef::named_nn(TypeRef::INT),
            ))
            .field(InterfaceField::new(
                "items",
                TypeRef::named_nn_list_nn(SEARCH_RESULT),
            )),
        Interface::new(SEARCH_RESULT)
            .description("One search match")
            .field(InterfaceField::new("id", TypeRef::named_nn(TypeRef::STRING)))
            .field(InterfaceField::new("score", TypeRef::named_nn(TypeRef::FLOAT)))
            .field(InterfaceField::new("category", TypeRef::named(TypeRef::STRING)))
            .field(InterfaceField::new(
                "values",
                TypeRef::named_nn_list_nn(SEARCH_RESULT_FIELD),
            )),
    ]
}

/// Builds the `SearchResultField` object.
pub(crate) fn search_result_field_object() -> Object {
    Object::new(SEARCH_RESULT_FIELD)
        .description("A stored field of a search match")
        .field(Field::new(
            "name",
            TypeRef::named_nn(TypeRef::STRING),
            SearchResultResolver::result_field("name"),
        ))
        .field(Field::new(
            "values",
            TypeRef::named_nn_list_nn(TypeRef::STRING),
            SearchResultResolver::result_field("values"),
        ))
}

/// Builds the types of one index.
pub(crate) fn searcher_objects(searcher: &DynSearcher, names: &SearcherNames) -> Vec<Object> {
    let fields = indexed_fields(searcher);
    let mut objects = Vec::with_capacity(4);

    let mut result = Object::new(&names.result)
        .implement(SEARCH_RESULT)
        .field(Field::new(
            "id",
            TypeRef::named_nn(TypeRef::STRING),
            SearchResultResolver::id,
        ))
        .field(Field::new(
            "score",
            TypeRef::named_nn(TypeRef::FLOAT),
            SearchResultResolver::score,
        ))
        .field(Field::new(
            "category",
            TypeRef::named(TypeRef::STRING),
            SearchResultResolver::category,
        ))
        .field(Field::new(
            "values",
            TypeRef::named_nn_list_nn(SEARCH_RESULT_FIELD),
            SearchResultResolver::values,
        ));

    if !fields.is_empty() {
        let fields_object = fields.into_iter().fold(
            Object::new(&names.result_fields)
                .description(format!("Indexed fields of {}", searcher.name())),
            |object, (field_name, index_field)| {
                trace!(index = %searcher.name(), field = %field_name, "Adding indexed field");
                object.field(Field::new(
                    field_name,
                    TypeRef::named(TypeRef::STRING),
                    SearchResultResolver::field_value(index_field),
                ))
            },
        );
        result = result.field(Field::new(
            "fields",
            TypeRef::named(&names.result_fields),
            SearchResultResolver::fields,
        ));
        objects.push(fields_object);
    }
    objects.push(result);

    objects.push(
        Object::new(&names.results)
            .implement(SEARCH_RESULTS)
            .field(Field::new(
                "totalItemCount",
                TypeRef::named_nn(TypeRef::INT),
                SearchResultResolver::total_item_count,
            ))
            .field(Field::new(
                "items",
                TypeRef::named_nn_list_nn(SEARCH_RESULT),
                SearchResultResolver::items(names.result.clone()),
            )),
    );

    objects.push(
        Object::new(&names.searcher)
            .description(format!("Search index {}", searcher.name()))
            .field(
                Field::new(
                    "query",
                    TypeRef::named_nn(&names.results),
                    SearcherResolver::query(searcher.clone()),
                )
                .description("Runs a query in the index's native syntax")
                .argument(InputValue::new("query", TypeRef::named(TypeRef::STRING)))
                .argument(InputValue::new("category", TypeRef::named(TypeRef::STRING)))
                .argument(
                    InputValue::new("defaultOperation", TypeRef::named(BOOLEAN_OPERATION))
                        .default_value(Value::Enum(Name::new(BooleanOperation::And.as_str()))),
                )
                .argument(max_results_argument())
                .argument(
                    InputValue::new("sortFields", TypeRef::named(TypeRef::STRING))
                        .description("Comma-separated `name` or `name|type` entries"),
                )
                .argument(
                    InputValue::new("sortDir", TypeRef::named(SORT_DIRECTION))
                        .default_value(Value::Enum(Name::new(SortDirection::Asc.as_str()))),
                ),
            )
            .field(
                Field::new(
                    "search",
                    TypeRef::named_nn(&names.results),
                    SearcherResolver::search(searcher.clone()),
                )
                .description("Runs a natural-language search")
                .argument(InputValue::new("query", TypeRef::named(TypeRef::STRING)))
                .argument(max_results_argument()),
            ),
    );

    debug!(index = %searcher.name(), type_name = %names.searcher, "Built searcher types");
    objects
}

/// Builds the root `Searchers` object with one field per index.
pub(crate) fn searchers_object(name: &str, entries: &[SearcherNames]) -> Object {
    entries.iter().fold(
        Object::new(name).description("Configured search indexes"),
        |object, names| {
            object.field(Field::new(
                names.field.clone(),
                TypeRef::named_nn(&names.searcher),
                SearcherResolver::searcher_object,
            ))
        },
    )
}

fn max_results_argument() -> InputValue {
    InputValue::new("maxResults", TypeRef::named(TypeRef::INT))
        .default_value(Value::Number(DEFAULT_MAX_RESULTS.into()))
}

/// Sanitized field names paired with the index field they read.
///
/// Field discovery is best effort: a failing index yields no fields.
fn indexed_fields(searcher: &DynSearcher) -> Vec<(String, String)> {
    let discovered = match searcher.indexed_field_names() {
        Ok(names) => names,
        Err(e) => {
            warn!(index = %searcher.name(), error = %e, "Could not read indexed field names");
            return Vec::new();
        }
    };

    let mut seen = HashSet::new();
    discovered
        .into_iter()
        .filter_map(|index_field| {
            let field_name = sanitize_field_name(&index_field);
            if !is_valid_graphql_name(&field_name) || !seen.insert(field_name.clone()) {
                trace!(index = %searcher.name(), field = %index_field, "Skipping indexed field");
                return None;
            }
            Some((field_name, index_field))
        })
        .collect()
}
