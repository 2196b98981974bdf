use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router, middleware,
    routing::{get, post},
};
use contentql_graphql::{
    ContentSchemaBuilder, GraphQLContextTemplate, GraphQLState, LazySchema, graphql_handler,
    graphql_handler_get,
};
use contentql_memory::MemoryContentStore;
use contentql_model::DynContentCache;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::{config::AppConfig, fixture::ContentPackage, handlers, middleware as app_middleware};

pub struct ContentqlServer {
    addr: SocketAddr,
    app: Router,
}

pub fn build_app(cfg: &AppConfig, state: GraphQLState) -> Router {
    let body_limit = cfg.server.body_limit_bytes;
    let mut router = Router::new().route("/health", get(handlers::health));
    if cfg.graphql.enabled {
        router = router.route("/graphql", post(graphql_handler).get(graphql_handler_get));
    }

    router
        .with_state(state)
        // Middleware stack (order: trace -> compression/cors -> request id -> body limit, innermost first)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    use tracing::field::Empty;
                    let req_id = req
                        .extensions()
                        .get::<axum::http::HeaderValue>()
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("")
                        .to_string();
                    tracing::info_span!(
                        "http.request",
                        http.method = %req.method(),
                        http.target = %req.uri(),
                        http.status_code = Empty,
                        request_id = %req_id
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        span.record(
                            "http.status_code",
                            tracing::field::display(res.status().as_u16()),
                        );
                        tracing::info!(
                            http.status = %res.status().as_u16(),
                            elapsed_ms = %latency.as_millis(),
                            "request handled"
                        );
                    },
                ),
        )
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(middleware::from_fn(app_middleware::request_id))
        .layer(axum::extract::DefaultBodyLimit::max(body_limit))
}

pub struct ServerBuilder {
    config: AppConfig,
    package: Option<ContentPackage>,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
            package: None,
        }
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.config = cfg;
        self
    }

    /// Seeds from `package` instead of the configured fixture file.
    pub fn with_package(mut self, package: ContentPackage) -> Self {
        self.package = Some(package);
        self
    }

    pub async fn build(self) -> anyhow::Result<ContentqlServer> {
        let cfg = self.config;
        let package = match (self.package, &cfg.content.fixture) {
            (Some(package), _) => package,
            (None, Some(path)) => ContentPackage::from_path(path)
                .with_context(|| format!("loading content fixture {}", path.display()))?,
            (None, None) => {
                tracing::warn!("No content fixture configured, starting with an empty store");
                ContentPackage::default()
            }
        };

        let store = Arc::new(MemoryContentStore::new(&cfg.content.default_culture));
        let searchers = package.seed(&store).context("seeding content store")?;
        let content: DynContentCache = store;

        let schema_builder = ContentSchemaBuilder::new(
            content.clone(),
            searchers,
            cfg.graphql.to_schema_builder_config(),
        );
        let lazy_schema = Arc::new(LazySchema::new(schema_builder));
        if cfg.graphql.eager_build {
            lazy_schema
                .get_or_build_wait()
                .await
                .context("building GraphQL schema")?;
        }

        let state = GraphQLState {
            lazy_schema,
            context_template: GraphQLContextTemplate { content },
        };

        Ok(ContentqlServer {
            addr: cfg.addr(),
            app: build_app(&cfg, state),
        })
    }
}

impl ContentqlServer {
    /// The application router, for serving or in-process requests.
    pub fn router(&self) -> Router {
        self.app.clone()
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
