use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use contentql_graphql::{GraphQLState, SchemaState};
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse<'a> {
    status: &'a str,
    schema: &'a str,
    version: &'a str,
}

fn schema_state_name(state: SchemaState) -> &'static str {
    match state {
        SchemaState::Uninitialized => "uninitialized",
        SchemaState::Building => "building",
        SchemaState::Ready => "ready",
        SchemaState::Failed => "failed",
    }
}

/// Liveness plus the GraphQL schema state. A failed schema build reports 503.
pub async fn health(State(state): State<GraphQLState>) -> impl IntoResponse {
    let schema_state = state.lazy_schema.state().await;
    let (status_code, status) = match schema_state {
        SchemaState::Failed => (StatusCode::SERVICE_UNAVAILABLE, "degraded"),
        _ => (StatusCode::OK, "ok"),
    };
    (
        status_code,
        Json(HealthResponse {
            status,
            schema: schema_state_name(schema_state),
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}
