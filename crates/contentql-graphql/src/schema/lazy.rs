//! Lazy schema loading.
//!
//! `LazySchema` defers schema building until first access, so the server
//! starts without waiting for the content model to be walked.

use std::sync::Arc;

use async_graphql::dynamic::Schema;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use super::ContentSchemaBuilder;
use crate::error::GraphQLError;

/// State of the lazy schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaState {
    /// Schema has not been built yet.
    Uninitialized,
    /// Schema is currently being built.
    Building,
    /// Schema is ready for use.
    Ready,
    /// Schema build failed.
    Failed,
}

/// Thread-safe lazy schema holder.
///
/// Handles concurrent access during the build and supports rebuilding
/// after the content model changes through [`LazySchema::invalidate`].
///
/// # Example
///
/// ```ignore
/// let lazy_schema = LazySchema::new(schema_builder);
///
/// // First access triggers build
/// let schema = lazy_schema.get_or_build().await?;
///
/// // Force rebuild on next access
/// lazy_schema.invalidate().await;
/// ```
pub struct LazySchema {
    schema: RwLock<Option<Arc<Schema>>>,

    /// Held for the duration of a build.
    build_lock: Mutex<()>,

    state: RwLock<SchemaState>,

    builder: Arc<ContentSchemaBuilder>,

    /// Last build error message, kept for diagnostics.
    last_error: RwLock<Option<String>>,
}

impl LazySchema {
    /// Creates a new lazy schema with the given builder.
    #[must_use]
    pub fn new(builder: ContentSchemaBuilder) -> Self {
        Self {
            schema: RwLock::new(None),
            build_lock: Mutex::new(()),
            state: RwLock::new(SchemaState::Uninitialized),
            builder: Arc::new(builder),
            last_error: RwLock::new(None),
        }
    }

    /// Returns the current state of the schema.
    pub async fn state(&self) -> SchemaState {
        *self.state.read().await
    }

    /// Gets the schema, building it if necessary.
    ///
    /// Concurrent callers get `SchemaInitializing` while a build is in
    /// progress. Use [`LazySchema::get_or_build_wait`] to wait instead.
    ///
    /// # Errors
    ///
    /// Returns `GraphQLError::SchemaInitializing` if another build is in progress.
    /// Returns `GraphQLError::SchemaBuildFailed` if the build fails.
    pub async fn get_or_build(&self) -> Result<Arc<Schema>, GraphQLError> {
        if let Some(schema) = self.get().await {
            return Ok(schema);
        }

        if *self.state.read().await == SchemaState::Building {
            return Err(GraphQLError::SchemaInitializing);
        }

        let Ok(_guard) = self.build_lock.try_lock() else {
            return Err(GraphQLError::SchemaInitializing);
        };

        // Double-check after acquiring lock
        if let Some(schema) = self.get().await {
            return Ok(schema);
        }

        self.build_locked("fail-fast").await
    }

    /// Gets the schema, building it if necessary, and waits for an
    /// in-progress build to complete.
    ///
    /// A previous failed build is reported without rebuilding; call
    /// [`LazySchema::invalidate`] to retry.
    ///
    /// # Errors
    ///
    /// Returns `GraphQLError::SchemaBuildFailed` if the build fails.
    pub async fn get_or_build_wait(&self) -> Result<Arc<Schema>, GraphQLError> {
        if let Some(schema) = self.get().await {
            return Ok(schema);
        }

        let _guard = self.build_lock.lock().await;

        if let Some(schema) = self.get().await {
            return Ok(schema);
        }

        if *self.state.read().await == SchemaState::Failed {
            if let Some(err) = self.last_error.read().await.as_ref() {
                return Err(GraphQLError::SchemaBuildFailed(err.clone()));
            }
        }

        self.build_locked("wait").await
    }

    /// Runs the build. The caller must hold `build_lock`.
    async fn build_locked(&self, mode: &'static str) -> Result<Arc<Schema>, GraphQLError> {
        *self.state.write().await = SchemaState::Building;
        info!(mode, "Building GraphQL schema");

        match self.builder.build().await {
            Ok(schema) => {
                let schema = Arc::new(schema);
                *self.schema.write().await = Some(Arc::clone(&schema));
                *self.state.write().await = SchemaState::Ready;
                *self.last_error.write().await = None;
                info!(mode, "GraphQL schema built successfully");
                Ok(schema)
            }
            Err(e) => {
                let error_msg = e.to_string();
                warn!(mode, error = %error_msg, "Failed to build GraphQL schema");
                *self.state.write().await = SchemaState::Failed;
                *self.last_error.write().await = Some(error_msg.clone());
                Err(GraphQLError::SchemaBuildFailed(error_msg))
            }
        }
    }

    /// Gets the schema if it's already built, without triggering a build.
    pub async fn get(&self) -> Option<Arc<Schema>> {
        self.schema.read().await.clone()
    }

    /// Invalidates the cached schema, causing the next access to rebuild it.
    pub async fn invalidate(&self) {
        let _guard = self.build_lock.lock().await;

        *self.schema.write().await = None;
        *self.state.write().await = SchemaState::Uninitialized;
        *self.last_error.write().await = None;

        info!("GraphQL schema invalidated - will rebuild on next request");
    }

    /// Returns the last build error, if any.
    pub async fn last_error(&self) -> Option<String> {
        self.last_error.read().await.clone()
    }

    /// Returns whether the schema is ready for use.
    pub async fn is_ready(&self) -> bool {
        *self.state.read().await == SchemaState::Ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaBuilderConfig;
    use contentql_memory::MemoryContentStore;

    fn lazy_schema() -> LazySchema {
        let content = Arc::new(MemoryContentStore::new("en-US"));
        LazySchema::new(ContentSchemaBuilder::new(
            content,
            Vec::new(),
            SchemaBuilderConfig::default(),
        ))
    }

    #[test]
    fn test_schema_state_enum() {
        assert_ne!(SchemaState::Uninitialized, SchemaState::Building);
        assert_ne!(SchemaState::Building, SchemaState::Ready);
        assert_ne!(SchemaState::Ready, SchemaState::Failed);
    }

    #[tokio::test]
    async fn test_build_once_and_reuse() {
        let lazy = lazy_schema();
        assert!(lazy.get().await.is_none());
        assert_eq!(lazy.state().await, SchemaState::Uninitialized);

        let first = lazy.get_or_build().await.unwrap();
        let second = lazy.get_or_build_wait().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(lazy.is_ready().await);
        assert!(lazy.last_error().await.is_none());
    }

    #[tokio::test]
    async fn test_invalidate_forces_rebuild() {
        let lazy = lazy_schema();
        let first = lazy.get_or_build().await.unwrap();

        lazy.invalidate().await;
        assert_eq!(lazy.state().await, SchemaState::Uninitialized);
        assert!(lazy.get().await.is_none());

        let rebuilt = lazy.get_or_build().await.unwrap();
        assert!(!Arc::ptr_eq(&first, &rebuilt));
    }
}
