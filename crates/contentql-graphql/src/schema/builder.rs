//! Content GraphQL schema builder.
//!
//! This module provides `ContentSchemaBuilder`, which generates a GraphQL
//! schema from the content cache's content types and the configured search
//! indexes. The builder uses async-graphql's dynamic schema API to construct
//! the schema at runtime.

use std::collections::HashSet;
use std::sync::Arc;

use async_graphql::dynamic::{
    Field, FieldFuture, InputValue, Object, Scalar, Schema, SchemaBuilder, TypeRef,
};
use async_graphql::Value;
use contentql_model::{DynContentCache, IMAGE_CROPPER_VALUE, MEDIA_WITH_CROPS};
use contentql_search::DynSearcher;
use tracing::{debug, trace, warn};

use super::content::{
    ContentTypeNames, content_object, media_objects, published_content_interface,
    published_element_interface, unmapped_objects,
};
use super::registry::TypeRegistry;
use super::searcher::{
    SearcherNames, search_enums, search_interfaces, search_result_field_object,
    searcher_objects, searchers_object,
};
use super::{
    BOOLEAN_OPERATION, DATETIME_SCALAR, IMAGE_CROPPER_CROP, IMAGE_CROPPER_FOCAL_POINT,
    JSON_SCALAR, LONG_SCALAR, PUBLISHED_CONTENT, PUBLISHED_ELEMENT, SEARCH_RESULT,
    SEARCH_RESULT_FIELD, SEARCH_RESULTS, SEARCHERS, SORT_DIRECTION, UNMAPPED_CONTENT,
    UNMAPPED_ELEMENT,
};
use crate::error::GraphQLError;
use crate::resolvers::{ContentQueryResolver, SearcherResolver};

const QUERY: &str = "Query";

/// Configuration for the schema builder.
#[derive(Debug, Clone)]
pub struct SchemaBuilderConfig {
    /// Maximum query depth allowed.
    pub max_depth: usize,

    /// Maximum query complexity allowed.
    pub max_complexity: usize,

    /// Whether to enable introspection queries.
    pub introspection_enabled: bool,
}

impl Default for SchemaBuilderConfig {
    fn default() -> Self {
        Self {
            max_depth: 15,
            max_complexity: 500,
            introspection_enabled: true,
        }
    }
}

/// Builds the GraphQL schema from the content model and search indexes.
///
/// The generated schema contains:
/// - the `DateTime` and `JSON` scalars, plus any custom scalars
/// - the `PublishedContent` and `PublishedElement` interfaces and one
///   object type per content type
/// - one `<Index>Searcher` object per search index under `Query.searchers`
/// - root fields reading content by id, key, type or tree position
///
/// # Example
///
/// ```ignore
/// let builder = ContentSchemaBuilder::new(
///     content_cache,
///     vec![external_index],
///     SchemaBuilderConfig::default(),
/// );
///
/// let schema = builder.build().await?;
/// ```
pub struct ContentSchemaBuilder {
    /// Source of the content types, and of content at query time.
    content: DynContentCache,

    /// Search indexes exposed under `Query.searchers`.
    searchers: Vec<DynSearcher>,

    /// Property type mappings.
    registry: Arc<TypeRegistry>,

    /// Custom scalars backing custom registry mappings.
    scalars: Vec<(String, Option<String>)>,

    /// Configuration options.
    config: SchemaBuilderConfig,
}

impl ContentSchemaBuilder {
    /// Creates a new schema builder with the default type registry.
    #[must_use]
    pub fn new(
        content: DynContentCache,
        searchers: Vec<DynSearcher>,
        config: SchemaBuilderConfig,
    ) -> Self {
        Self {
            content,
            searchers,
            registry: Arc::new(TypeRegistry::default()),
            scalars: Vec::new(),
            config,
        }
    }

    /// Replaces the type registry.
    #[must_use]
    pub fn with_registry(mut self, registry: TypeRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    /// Registers a custom scalar, typically the target of a custom registry
    /// mapping.
    #[must_use]
    pub fn with_scalar(mut self, name: impl Into<String>, description: Option<&str>) -> Self {
        self.scalars
            .push((name.into(), description.map(str::to_string)));
        self
    }

    /// The type registry used for property fields.
    #[must_use]
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Builds the GraphQL schema.
    ///
    /// Content types and searchers that cannot be named in GraphQL are
    /// skipped with a warning rather than failing the build.
    ///
    /// # Errors
    ///
    /// Returns `GraphQLError::SchemaBuildFailed` if schema construction fails.
    pub async fn build(&self) -> Result<Schema, GraphQLError> {
        debug!("Starting GraphQL schema build");

        let mut schema_builder = Schema::build(QUERY, None, None);
        schema_builder = self.register_scalars(schema_builder);

        let mut reserved: HashSet<&str> = builtin_type_names();
        reserved.extend(self.scalars.iter().map(|(name, _)| name.as_str()));

        let mut content_types = self.content.content_types();
        content_types.sort_by(|a, b| a.alias.cmp(&b.alias));
        let names = Arc::new(ContentTypeNames::assign(&content_types, &reserved));
        debug!(
            content_types = content_types.len(),
            mapped = names.len(),
            "Assigned content type names"
        );

        schema_builder = schema_builder
            .register(published_element_interface())
            .register(published_content_interface());
        for object in unmapped_objects(&names) {
            schema_builder = schema_builder.register(object);
        }
        for object in media_objects(&names) {
            schema_builder = schema_builder.register(object);
        }
        for content_type in &content_types {
            if let Some(object) = content_object(content_type, &self.registry, &names) {
                schema_builder = schema_builder.register(object);
            }
        }

        let mut taken: HashSet<String> = reserved.iter().map(|name| (*name).to_string()).collect();
        taken.extend(names.type_names().map(str::to_string));
        let (schema_builder, searchers) = self.register_searchers(schema_builder, &mut taken);

        let query = self.build_query_type(&names, !searchers.is_empty());
        let mut schema_builder = schema_builder.register(query);

        // Configure limits
        schema_builder = schema_builder
            .limit_depth(self.config.max_depth)
            .limit_complexity(self.config.max_complexity);

        if !self.config.introspection_enabled {
            schema_builder = schema_builder.disable_introspection();
        }

        let schema = schema_builder
            .finish()
            .map_err(|e| GraphQLError::SchemaBuildFailed(e.to_string()))?;

        debug!(searchers = searchers.len(), "GraphQL schema build complete");
        Ok(schema)
    }

    /// Registers the built-in and custom scalar types.
    fn register_scalars(&self, builder: SchemaBuilder) -> SchemaBuilder {
        let builtin = [
            (DATETIME_SCALAR, "An RFC 3339 date and time"),
            (LONG_SCALAR, "A 64-bit signed integer"),
            (JSON_SCALAR, "An arbitrary JSON value"),
        ];

        let mut builder = builder;
        for (name, description) in builtin {
            builder = builder.register(Scalar::new(name).description(description));
        }
        for (name, description) in &self.scalars {
            let mut scalar = Scalar::new(name);
            if let Some(description) = description {
                scalar = scalar.description(description);
            }
            trace!(scalar = %name, "Registering custom scalar");
            builder = builder.register(scalar);
        }
        builder
    }

    /// Registers the search types, returning the indexes that got types.
    ///
    /// Indexes whose names are invalid or collide with other types are
    /// skipped. Nothing is registered when no index remains.
    fn register_searchers(
        &self,
        mut builder: SchemaBuilder,
        taken: &mut HashSet<String>,
    ) -> (SchemaBuilder, Vec<SearcherNames>) {
        let mut fields: HashSet<String> = HashSet::new();
        let mut accepted = Vec::new();

        for searcher in &self.searchers {
            let Some(names) = SearcherNames::of(searcher.name()) else {
                warn!(index = %searcher.name(), "Skipping search index with invalid name");
                continue;
            };
            let conflict = names.type_names().iter().any(|name| taken.contains(*name))
                || fields.contains(&names.field);
            if conflict {
                warn!(index = %searcher.name(), "Skipping search index with conflicting name");
                continue;
            }

            taken.extend(names.type_names().iter().map(|name| (*name).to_string()));
            fields.insert(names.field.clone());
            for object in searcher_objects(searcher, &names) {
                builder = builder.register(object);
            }
            accepted.push(names);
        }

        if accepted.is_empty() {
            return (builder, accepted);
        }

        for search_enum in search_enums() {
            builder = builder.register(search_enum);
        }
        for interface in search_interfaces() {
            builder = builder.register(interface);
        }
        builder = builder
            .register(search_result_field_object())
            .register(searchers_object(SEARCHERS, &accepted));
        (builder, accepted)
    }

    /// Builds the Query root type.
    fn build_query_type(&self, names: &Arc<ContentTypeNames>, has_searchers: bool) -> Object {
        let mut query = Object::new(QUERY).description("Published content and search root");

        // Add health check field
        query = query.field(
            Field::new("_health", TypeRef::named_nn(TypeRef::STRING), |_| {
                FieldFuture::new(async { Ok(Some(Value::String("ok".to_string()))) })
            })
            .description("Health check endpoint"),
        );

        // Add version field
        query = query.field(
            Field::new("_version", TypeRef::named_nn(TypeRef::STRING), |_| {
                FieldFuture::new(async {
                    Ok(Some(Value::String(env!("CARGO_PKG_VERSION").to_string())))
                })
            })
            .description("API version"),
        );

        query = query
            .field(
                Field::new(
                    "content",
                    TypeRef::named(PUBLISHED_CONTENT),
                    ContentQueryResolver::by_id_or_key(Arc::clone(names)),
                )
                .argument(InputValue::new("id", TypeRef::named(TypeRef::INT)))
                .argument(InputValue::new("key", TypeRef::named(TypeRef::ID)))
                .description("Reads one content node by id or key"),
            )
            .field(
                Field::new(
                    "contentAtRoot",
                    TypeRef::named_nn_list_nn(PUBLISHED_CONTENT),
                    ContentQueryResolver::at_root(Arc::clone(names)),
                )
                .argument(InputValue::new("culture", TypeRef::named(TypeRef::STRING)))
                .description("Content at the root of the tree"),
            )
            .field(
                Field::new(
                    "contentByType",
                    TypeRef::named_nn_list_nn(PUBLISHED_CONTENT),
                    ContentQueryResolver::by_type(Arc::clone(names)),
                )
                .argument(InputValue::new(
                    "contentType",
                    TypeRef::named_nn(TypeRef::STRING),
                ))
                .description("All content of one content type"),
            );

        if has_searchers {
            query = query.field(
                Field::new(
                    "searchers",
                    TypeRef::named(SEARCHERS),
                    SearcherResolver::searcher_object,
                )
                .description("Configured search indexes"),
            );
        }

        query
    }
}

/// Type names the schema defines regardless of content and indexes.
fn builtin_type_names() -> HashSet<&'static str> {
    [
        QUERY,
        TypeRef::STRING,
        TypeRef::INT,
        TypeRef::FLOAT,
        TypeRef::BOOLEAN,
        TypeRef::ID,
        DATETIME_SCALAR,
        LONG_SCALAR,
        JSON_SCALAR,
        PUBLISHED_CONTENT,
        PUBLISHED_ELEMENT,
        UNMAPPED_CONTENT,
        UNMAPPED_ELEMENT,
        MEDIA_WITH_CROPS,
        IMAGE_CROPPER_VALUE,
        IMAGE_CROPPER_FOCAL_POINT,
        IMAGE_CROPPER_CROP,
        BOOLEAN_OPERATION,
        SORT_DIRECTION,
        SEARCH_RESULTS,
        SEARCH_RESULT,
        SEARCH_RESULT_FIELD,
        SEARCHERS,
    ]
    .into_iter()
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use contentql_model::{
        ContentCache, ContentKind, ContentType, PropertyType, PublishedContent, editors,
    };
    use uuid::Uuid;

    struct TypesOnlyCache(Vec<Arc<ContentType>>);

    impl ContentCache for TypesOnlyCache {
        fn content_types(&self) -> Vec<Arc<ContentType>> {
            self.0.clone()
        }

        fn get_by_id(&self, _id: i32) -> Option<Arc<dyn PublishedContent>> {
            None
        }

        fn get_by_key(&self, _key: Uuid) -> Option<Arc<dyn PublishedContent>> {
            None
        }

        fn get_at_root(&self, _culture: Option<&str>) -> Vec<Arc<dyn PublishedContent>> {
            Vec::new()
        }

        fn get_children(&self, _id: i32, _culture: Option<&str>) -> Vec<Arc<dyn PublishedContent>> {
            Vec::new()
        }

        fn get_by_content_type(&self, _alias: &str) -> Vec<Arc<dyn PublishedContent>> {
            Vec::new()
        }
    }

    fn cache(types: Vec<ContentType>) -> DynContentCache {
        Arc::new(TypesOnlyCache(types.into_iter().map(Arc::new).collect()))
    }

    fn blog_post() -> ContentType {
        ContentType::new("blogPost", ContentKind::Document)
            .with_property(PropertyType::new("title", "String".parse().unwrap()).mandatory())
            .with_property(PropertyType::new("tags", "[String]".parse().unwrap()))
            .with_property(
                PropertyType::new("layout", "Json".parse().unwrap()).with_editor(editors::GRID),
            )
    }

    #[test]
    fn test_default_config() {
        let config = SchemaBuilderConfig::default();
        assert_eq!(config.max_depth, 15);
        assert_eq!(config.max_complexity, 500);
        assert!(config.introspection_enabled);
    }

    #[tokio::test]
    async fn test_schema_builder_creates_valid_schema() {
        let builder = ContentSchemaBuilder::new(
            cache(vec![blog_post()]),
            Vec::new(),
            SchemaBuilderConfig::default(),
        );

        let result = builder.build().await;
        assert!(result.is_ok(), "Schema should build successfully");

        let sdl = result.unwrap().sdl();
        assert!(sdl.contains("type Query"), "Schema should have Query type");
        assert!(sdl.contains("scalar DateTime"));
        assert!(sdl.contains("scalar JSON"));
        assert!(sdl.contains("scalar Long"));
        assert!(sdl.contains("interface PublishedContent"));
        assert!(sdl.contains("interface PublishedElement"));
        assert!(sdl.contains("type BlogPost implements"));
        assert!(sdl.contains("type UnmappedContent implements"));
        assert!(sdl.contains("type MediaWithCrops"));
    }

    #[tokio::test]
    async fn test_schema_has_health_field() {
        let builder =
            ContentSchemaBuilder::new(cache(Vec::new()), Vec::new(), SchemaBuilderConfig::default());

        let schema = builder.build().await.unwrap();
        let sdl = schema.sdl();

        assert!(sdl.contains("_health"), "Schema should have _health field on Query");
        assert!(sdl.contains("_version"), "Schema should have _version field on Query");
        assert!(sdl.contains("contentAtRoot"));

        let response = schema.execute("{ _health }").await;
        assert!(response.errors.is_empty());
        assert_eq!(
            response.data.into_json().unwrap(),
            serde_json::json!({ "_health": "ok" })
        );
    }

    #[tokio::test]
    async fn test_search_types_omitted_without_searchers() {
        let builder =
            ContentSchemaBuilder::new(cache(Vec::new()), Vec::new(), SchemaBuilderConfig::default());
        let sdl = builder.build().await.unwrap().sdl();

        assert!(!sdl.contains("type Searchers"));
        assert!(!sdl.contains("interface SearchResults"));
    }

    #[tokio::test]
    async fn test_conflicting_content_type_is_skipped() {
        let builder = ContentSchemaBuilder::new(
            cache(vec![
                ContentType::new("query", ContentKind::Document),
                ContentType::new("mediaWithCrops", ContentKind::Media),
                blog_post(),
            ]),
            Vec::new(),
            SchemaBuilderConfig::default(),
        );

        let sdl = builder.build().await.unwrap().sdl();
        assert!(sdl.contains("type BlogPost implements"));
    }

    #[tokio::test]
    async fn test_custom_scalar_mapping() {
        use crate::schema::{GraphType, RegistryKey};

        let registry = TypeRegistry::builder()
            .register(
                RegistryKey::Object("Markdown".to_string()),
                GraphType::scalar("Markdown"),
            )
            .build();
        let article = ContentType::new("article", ContentKind::Document)
            .with_property(PropertyType::new("body", "Markdown".parse().unwrap()));

        let builder = ContentSchemaBuilder::new(
            cache(vec![article]),
            Vec::new(),
            SchemaBuilderConfig::default(),
        )
        .with_registry(registry)
        .with_scalar("Markdown", Some("Markdown text"));

        let sdl = builder.build().await.unwrap().sdl();
        assert!(sdl.contains("scalar Markdown"));
        assert!(sdl.contains("body: Markdown"));
    }

    #[tokio::test]
    async fn test_schema_with_disabled_introspection() {
        let config = SchemaBuilderConfig {
            introspection_enabled: false,
            ..Default::default()
        };

        let builder = ContentSchemaBuilder::new(cache(Vec::new()), Vec::new(), config);
        let result = builder.build().await;

        assert!(
            result.is_ok(),
            "Schema should build with introspection disabled"
        );
    }
}
