//! Integration tests for the searcher schema and query translation.

use std::sync::{Arc, Mutex};

use async_graphql::Request;
use async_graphql::dynamic::Schema;
use async_trait::async_trait;
use contentql_graphql::{ContentSchemaBuilder, GraphQLContext, SchemaBuilderConfig};
use contentql_memory::MemoryContentStore;
use contentql_model::DynContentCache;
use contentql_search::{
    BooleanOperation, DynSearcher, SearchError, SearchQuery, SearchResult, SearchResults,
    Searcher, SortDirection, SortType, SortableField,
};
use serde_json::json;
use tracing_subscriber::fmt::MakeWriter;

/// Searcher that records its calls and returns canned results.
struct RecordingSearcher {
    name: String,
    fields: Result<Vec<String>, String>,
    failure: Option<String>,
    results: SearchResults,
    queries: Mutex<Vec<(SearchQuery, usize)>>,
    searches: Mutex<Vec<(String, usize)>>,
}

impl RecordingSearcher {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fields: Ok(Vec::new()),
            failure: None,
            results: SearchResults::default(),
            queries: Mutex::new(Vec::new()),
            searches: Mutex::new(Vec::new()),
        }
    }

    fn with_fields(mut self, fields: &[&str]) -> Self {
        self.fields = Ok(fields.iter().map(|f| (*f).to_string()).collect());
        self
    }

    fn with_broken_fields(mut self) -> Self {
        self.fields = Err("index locked".to_string());
        self
    }

    fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    fn with_results(mut self, results: SearchResults) -> Self {
        self.results = results;
        self
    }

    fn last_query(&self) -> (SearchQuery, usize) {
        self.queries.lock().unwrap().last().cloned().unwrap()
    }

    fn last_search(&self) -> (String, usize) {
        self.searches.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl Searcher for RecordingSearcher {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(
        &self,
        query: &SearchQuery,
        max_results: usize,
    ) -> Result<SearchResults, SearchError> {
        self.queries
            .lock()
            .unwrap()
            .push((query.clone(), max_results));
        match &self.failure {
            Some(message) => Err(SearchError::invalid_query(message.clone())),
            None => Ok(self.results.clone()),
        }
    }

    async fn search(&self, text: &str, max_results: usize) -> Result<SearchResults, SearchError> {
        self.searches
            .lock()
            .unwrap()
            .push((text.to_string(), max_results));
        Ok(self.results.clone())
    }

    fn indexed_field_names(&self) -> Result<Vec<String>, SearchError> {
        self.fields
            .clone()
            .map_err(|_| SearchError::index_unavailable(self.name.clone()))
    }
}

/// Log sink shared with a test subscriber.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn content() -> DynContentCache {
    Arc::new(MemoryContentStore::new("en-US"))
}

async fn build_schema(searchers: Vec<DynSearcher>) -> Schema {
    ContentSchemaBuilder::new(content(), searchers, SchemaBuilderConfig::default())
        .build()
        .await
        .unwrap()
}

async fn execute(schema: &Schema, query: &str) -> async_graphql::Response {
    let context = GraphQLContext::builder()
        .with_content(content())
        .with_request_id("test")
        .build()
        .unwrap();
    schema.execute(Request::new(query).data(context)).await
}

#[tokio::test]
async fn test_query_sort_fields_and_direction() {
    let searcher = Arc::new(RecordingSearcher::new("External"));
    let schema = build_schema(vec![searcher.clone()]).await;

    let response = execute(
        &schema,
        r#"{ searchers { external { query(query: "+title:home", sortFields: "name, date|date,  ,title|bogus", sortDir: DESC) { totalItemCount } } } }"#,
    )
    .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);

    let (query, max_results) = searcher.last_query();
    assert_eq!(query.native_query.as_deref(), Some("+title:home"));
    assert_eq!(max_results, 500);

    let ordering = query.ordering.unwrap();
    assert_eq!(ordering.direction, SortDirection::Desc);
    assert_eq!(
        ordering.fields,
        vec![
            SortableField::new("name"),
            SortableField::typed("date", SortType::Date),
            SortableField::new("title"),
        ]
    );
}

#[tokio::test]
async fn test_query_defaults_and_pass_through() {
    let searcher = Arc::new(RecordingSearcher::new("External"));
    let schema = build_schema(vec![searcher.clone()]).await;

    let response = execute(
        &schema,
        r#"{ searchers { external { query(query: "a b") { totalItemCount } } } }"#,
    )
    .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);

    let (query, max_results) = searcher.last_query();
    assert_eq!(max_results, 500);
    assert_eq!(query.default_operation, BooleanOperation::And);
    assert_eq!(query.category, None);
    assert!(query.ordering.is_none());

    let response = execute(
        &schema,
        r#"{ searchers { external { query(query: "a b", category: "content", defaultOperation: OR, maxResults: 10) { totalItemCount } } } }"#,
    )
    .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);

    let (query, max_results) = searcher.last_query();
    assert_eq!(max_results, 10);
    assert_eq!(query.default_operation, BooleanOperation::Or);
    assert_eq!(query.category.as_deref(), Some("content"));
    assert_eq!(query.native_query.as_deref(), Some("a b"));
}

#[tokio::test]
async fn test_search_forwards_text_and_cap() {
    let searcher = Arc::new(RecordingSearcher::new("External"));
    let schema = build_schema(vec![searcher.clone()]).await;

    let response = execute(
        &schema,
        r#"{ searchers { external { search(query: "red shoes") { totalItemCount } } } }"#,
    )
    .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    assert_eq!(searcher.last_search(), ("red shoes".to_string(), 500));

    execute(
        &schema,
        r#"{ searchers { external { search(query: "red shoes", maxResults: 3) { totalItemCount } } } }"#,
    )
    .await;
    assert_eq!(searcher.last_search(), ("red shoes".to_string(), 3));
}

#[tokio::test]
async fn test_search_field_arguments() {
    let schema = build_schema(vec![Arc::new(RecordingSearcher::new("External"))]).await;

    let response = execute(
        &schema,
        r#"{ __type(name: "ExternalSearcher") { fields { name args { name defaultValue } } } }"#,
    )
    .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);

    let data = response.data.into_json().unwrap();
    let fields = data["__type"]["fields"].as_array().unwrap();

    let search = fields.iter().find(|f| f["name"] == "search").unwrap();
    assert_eq!(
        search["args"],
        json!([
            { "name": "query", "defaultValue": null },
            { "name": "maxResults", "defaultValue": "500" }
        ])
    );

    let query = fields.iter().find(|f| f["name"] == "query").unwrap();
    let names: Vec<&str> = query["args"]
        .as_array()
        .unwrap()
        .iter()
        .map(|arg| arg["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec!["query", "category", "defaultOperation", "maxResults", "sortFields", "sortDir"]
    );
}

#[tokio::test]
async fn test_introspection_failure_still_builds_index_types() {
    let searcher = Arc::new(RecordingSearcher::new("External").with_broken_fields());
    let schema = build_schema(vec![searcher]).await;
    let sdl = schema.sdl();

    assert!(sdl.contains("type ExternalSearcher"));
    assert!(sdl.contains("type ExternalSearchResults implements SearchResults"));
    assert!(sdl.contains("type ExternalSearchResult implements SearchResult"));
    assert!(!sdl.contains("ExternalSearchResultFields"));
}

#[tokio::test]
async fn test_results_with_indexed_fields() {
    let results = SearchResults::new(
        7,
        vec![
            SearchResult::new("1001", 1.5)
                .with_category("content")
                .with_value("nodeName", "Home")
                .with_value("__NodeId", "1001"),
        ],
    );
    let searcher = Arc::new(
        RecordingSearcher::new("External")
            .with_fields(&["nodeName", "__NodeId"])
            .with_results(results),
    );
    let schema = build_schema(vec![searcher]).await;

    let response = execute(
        &schema,
        r#"{
            searchers {
                external {
                    query(query: "home") {
                        totalItemCount
                        items {
                            id
                            score
                            category
                            values { name values }
                            ... on ExternalSearchResult { fields { nodeName _NodeId } }
                        }
                    }
                }
            }
        }"#,
    )
    .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);

    assert_eq!(
        response.data.into_json().unwrap(),
        json!({
            "searchers": { "external": { "query": {
                "totalItemCount": 7,
                "items": [{
                    "id": "1001",
                    "score": 1.5,
                    "category": "content",
                    "values": [
                        { "name": "__NodeId", "values": ["1001"] },
                        { "name": "nodeName", "values": ["Home"] }
                    ],
                    "fields": { "nodeName": "Home", "_NodeId": "1001" }
                }]
            } } }
        })
    );
}

#[tokio::test]
async fn test_search_error_propagates_unchanged() {
    let searcher = Arc::new(RecordingSearcher::new("External").failing("unbalanced quote"));
    let schema = build_schema(vec![searcher]).await;

    let response = execute(
        &schema,
        r#"{ searchers { external { query(query: "\"oops") { totalItemCount } } } }"#,
    )
    .await;

    assert_eq!(response.errors.len(), 1);
    let error = serde_json::to_value(&response.errors[0]).unwrap();
    assert_eq!(error["message"], "Invalid query: unbalanced quote");
    assert_eq!(error["extensions"]["code"], "SEARCH_ERROR");
}

#[tokio::test]
async fn test_conflicting_searcher_names_are_skipped() {
    let schema = build_schema(vec![
        Arc::new(RecordingSearcher::new("External")),
        Arc::new(RecordingSearcher::new("external")),
        Arc::new(RecordingSearcher::new("Published")),
        Arc::new(RecordingSearcher::new("")),
    ])
    .await;
    let sdl = schema.sdl();

    assert!(sdl.contains("type ExternalSearcher"));
    assert!(sdl.contains("type PublishedSearcher"));

    let response = execute(&schema, "{ searchers { external { __typename } published { __typename } } }").await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
}

#[tokio::test]
async fn test_query_logs_sort_field_inputs() {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(logs.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let searcher = Arc::new(RecordingSearcher::new("External"));
    let schema = build_schema(vec![searcher]).await;
    let response = execute(
        &schema,
        r#"{ searchers { external { query(query: "home", sortFields: "updated|date,title") { totalItemCount } } } }"#,
    )
    .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);

    let output = logs.contents();
    assert!(output.contains("Executing search query"), "{output}");
    assert!(
        output.contains(r#"name: "updated", sort_type: Some(Date)"#),
        "{output}"
    );
    assert!(output.contains(r#"name: "title", sort_type: None"#), "{output}");
}
