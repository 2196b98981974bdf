//! Axum HTTP handlers for GraphQL endpoints.
//!
//! - `POST /graphql` - GraphQL endpoint
//! - `GET /graphql` - GraphQL (query via URL param)
//!
//! The request culture is taken from the first `Accept-Language` tag and
//! applies to culture-variant fields queried without a `culture` argument.

use std::sync::Arc;

use async_graphql::{Request, Response, Variables};
use axum::Json;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response as HttpResponse};
use contentql_model::DynContentCache;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::context::{ContextBuilderError, GraphQLContext};
use crate::error::GraphQLError;
use crate::schema::LazySchema;

/// State shared across GraphQL handlers.
#[derive(Clone)]
pub struct GraphQLState {
    /// Lazy-loaded GraphQL schema.
    pub lazy_schema: Arc<LazySchema>,

    /// Shared dependencies for per-request contexts.
    pub context_template: GraphQLContextTemplate,
}

/// Template for building per-request GraphQL context.
#[derive(Clone)]
pub struct GraphQLContextTemplate {
    pub content: DynContentCache,
}

/// GraphQL request body.
#[derive(Debug, Deserialize)]
pub struct GraphQLRequest {
    /// The GraphQL query string.
    pub query: String,

    /// Optional operation name for multi-operation documents.
    #[serde(rename = "operationName")]
    pub operation_name: Option<String>,

    /// Optional variables for the query.
    pub variables: Option<serde_json::Value>,
}

/// Query parameters for GET requests.
#[derive(Debug, Deserialize)]
pub struct GraphQLQueryParams {
    /// The GraphQL query string.
    pub query: Option<String>,

    /// Optional operation name.
    #[serde(rename = "operationName")]
    pub operation_name: Option<String>,

    /// Optional variables (JSON string).
    pub variables: Option<String>,
}

/// GraphQL response body.
#[derive(Debug, Serialize)]
pub struct GraphQLResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<serde_json::Value>,
}

impl From<Response> for GraphQLResponse {
    fn from(resp: Response) -> Self {
        let data_json = serde_json::to_value(&resp.data).unwrap_or(serde_json::Value::Null);
        let data = if data_json.is_null() {
            None
        } else {
            Some(data_json)
        };

        // ServerError serializes as message/locations/path/extensions
        let errors = resp
            .errors
            .iter()
            .map(|e| {
                serde_json::to_value(e)
                    .unwrap_or_else(|_| serde_json::json!({ "message": e.message }))
            })
            .collect();

        Self {
            data,
            errors,
            extensions: if resp.extensions.is_empty() {
                None
            } else {
                Some(serde_json::to_value(&resp.extensions).unwrap_or(serde_json::Value::Null))
            },
        }
    }
}

/// Handles POST requests to /graphql.
pub async fn graphql_handler(
    State(state): State<GraphQLState>,
    headers: HeaderMap,
    Json(request): Json<GraphQLRequest>,
) -> impl IntoResponse {
    debug!("Processing GraphQL request");
    execute_graphql(state, headers, request).await
}

/// Handles GET requests to /graphql.
pub async fn graphql_handler_get(
    State(state): State<GraphQLState>,
    headers: HeaderMap,
    Query(params): Query<GraphQLQueryParams>,
) -> impl IntoResponse {
    let request = match params_to_request(params) {
        Ok(req) => req,
        Err(e) => {
            return error_response(&GraphQLError::InvalidQuery(e.to_string()));
        }
    };

    debug!("Processing GraphQL GET request");
    execute_graphql(state, headers, request).await
}

/// Checks if a GraphQL query is an introspection query.
fn is_introspection_query(query: &str) -> bool {
    let trimmed = query.trim();
    trimmed.contains("__schema")
        || trimmed.contains("__type")
        || trimmed.contains("IntrospectionQuery")
}

/// Executes a GraphQL request.
async fn execute_graphql(
    state: GraphQLState,
    headers: HeaderMap,
    request: GraphQLRequest,
) -> HttpResponse {
    // Introspection waits for an in-progress build; other queries fail fast
    let schema = if is_introspection_query(&request.query) {
        debug!("Introspection query detected, waiting for schema build if needed");
        state.lazy_schema.get_or_build_wait().await
    } else {
        state.lazy_schema.get_or_build().await
    };
    let schema = match schema {
        Ok(schema) => schema,
        Err(e) => {
            if !matches!(e, GraphQLError::SchemaInitializing) {
                warn!(error = %e, "Schema build failed");
            }
            return error_response(&e);
        }
    };

    let request_id = headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    let culture = headers
        .get(header::ACCEPT_LANGUAGE)
        .and_then(|v| v.to_str().ok())
        .and_then(preferred_culture);

    let context = match build_context(&state.context_template, request_id, culture) {
        Ok(ctx) => ctx,
        Err(e) => {
            return error_response(&GraphQLError::Internal(e.to_string()));
        }
    };

    let mut gql_request = Request::new(&request.query);

    if let Some(op_name) = request.operation_name {
        gql_request = gql_request.operation_name(op_name);
    }

    if let Some(vars) = request.variables {
        gql_request = gql_request.variables(Variables::from_json(vars));
    }

    gql_request = gql_request.data(context);

    debug!(query = %request.query, "Executing GraphQL query");
    let response = schema.execute(gql_request).await;

    // GraphQL errors are reported in the body with 200 OK
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        Json(GraphQLResponse::from(response)),
    )
        .into_response()
}

/// Builds a GraphQL context from the template.
fn build_context(
    template: &GraphQLContextTemplate,
    request_id: String,
    culture: Option<String>,
) -> Result<GraphQLContext, ContextBuilderError> {
    GraphQLContext::builder()
        .with_content(template.content.clone())
        .with_request_id(request_id)
        .with_culture(culture)
        .build()
}

/// First language tag of an `Accept-Language` header, ignoring weights.
fn preferred_culture(header_value: &str) -> Option<String> {
    header_value
        .split(',')
        .filter_map(|entry| entry.split(';').next())
        .map(str::trim)
        .find(|tag| !tag.is_empty() && *tag != "*")
        .map(str::to_string)
}

/// Converts GET query params to a GraphQL request.
fn params_to_request(params: GraphQLQueryParams) -> Result<GraphQLRequest, serde_json::Error> {
    let variables = match params.variables {
        Some(vars_str) => Some(serde_json::from_str(&vars_str)?),
        None => None,
    };

    Ok(GraphQLRequest {
        query: params.query.unwrap_or_default(),
        operation_name: params.operation_name,
        variables,
    })
}

/// Returns an error response with `extensions.code`, and `Retry-After`
/// while the schema is initializing.
fn error_response(error: &GraphQLError) -> HttpResponse {
    let status =
        StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let body = serde_json::json!({
        "errors": [{
            "message": error.to_string(),
            "extensions": {
                "code": error.error_code()
            }
        }]
    });

    let mut response = (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response();
    if let Some(seconds) = error.retry_after() {
        response
            .headers_mut()
            .insert(header::RETRY_AFTER, HeaderValue::from(seconds));
    }
    response
}
