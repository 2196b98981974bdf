//! # contentql-search
//!
//! Search engine abstractions for contentql.
//!
//! This crate defines the query model and the [`Searcher`] trait that search
//! backends implement. The GraphQL layer builds a [`SearchQuery`] from request
//! arguments and hands it to a searcher; backends own parsing, execution and
//! ranking.
//!
//! ## Example
//!
//! ```ignore
//! use contentql_search::{
//!     BooleanOperation, SearchError, SearchQuery, Searcher, SortType, SortableField,
//! };
//!
//! async fn newest_articles(searcher: &dyn Searcher) -> Result<(), SearchError> {
//!     let query = SearchQuery::new(Some("article"), BooleanOperation::And)
//!         .native_query("+published:1")
//!         .order_by_descending(vec![SortableField::typed("updateDate", SortType::Date)]);
//!
//!     let results = searcher.execute(&query, 10).await?;
//!     println!("{} matches", results.total_item_count);
//!     Ok(())
//! }
//! ```

mod error;
mod query;
mod results;
mod searcher;

pub use error::SearchError;
pub use query::{
    BooleanOperation, Ordering, SearchQuery, SortDirection, SortType, SortableField,
};
pub use results::{SearchResult, SearchResults};
pub use searcher::Searcher;

/// Type alias for a shareable searcher.
pub type DynSearcher = std::sync::Arc<dyn Searcher>;
