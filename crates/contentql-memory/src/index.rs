//! In-memory search index.

use std::cmp::Ordering as CmpOrdering;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use contentql_model::{ContentKind, Fallback, PublishedContent};
use contentql_search::{
    SearchError, SearchQuery, SearchResult, SearchResults, Searcher, SortDirection, SortType,
    SortableField,
};
use papaya::HashMap as PapayaHashMap;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::query_parser::{self, Clause, Matcher, Occur};

/// A document to index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub values: BTreeMap<String, Vec<String>>,
}

impl Document {
    /// Creates a document without values.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            category: None,
            values: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Appends a value to a field.
    #[must_use]
    pub fn with_value(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.entry(field.into()).or_default().push(value.into());
        self
    }

    /// Builds a document from a published node.
    ///
    /// Besides the node's system fields, every string-valued property is
    /// indexed under its alias.
    pub fn from_content(content: &dyn PublishedContent, culture: Option<&str>) -> Self {
        let content_type = content.content_type();
        let category = match content_type.kind {
            ContentKind::Media => "media",
            ContentKind::Member => "member",
            ContentKind::Document | ContentKind::Element => "content",
        };
        let mut document = Self::new(content.id().to_string())
            .with_category(category)
            .with_value("id", content.id().to_string())
            .with_value("key", content.key().to_string())
            .with_value("contentType", content_type.alias.clone())
            .with_value("level", content.level().to_string())
            .with_value("sortOrder", content.sort_order().to_string());
        if let Some(parent_id) = content.parent_id() {
            document = document.with_value("parentId", parent_id.to_string());
        }
        if let Some(name) = content.name(culture) {
            document = document.with_value("nodeName", name);
        }
        for (field, date) in [
            ("createDate", content.create_date()),
            ("updateDate", content.update_date()),
        ] {
            if let Ok(formatted) = date.format(&Rfc3339) {
                document = document.with_value(field, formatted);
            }
        }
        for property in &content_type.properties {
            let Ok(value) = content.value(&property.alias, culture, Fallback::None) else {
                continue;
            };
            if let Some(text) = value.as_str() {
                document = document.with_value(property.alias.clone(), text);
            }
        }
        document
    }
}

#[derive(Debug)]
struct IndexedDocument {
    seq: u64,
    document: Document,
}

/// In-memory search index using a papaya lock-free HashMap.
#[derive(Debug)]
pub struct MemorySearchIndex {
    name: String,
    documents: PapayaHashMap<String, IndexedDocument>,
    seq: AtomicU64,
}

impl MemorySearchIndex {
    /// Creates an empty index.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            documents: PapayaHashMap::new(),
            seq: AtomicU64::new(0),
        }
    }

    /// Adds or replaces a document.
    pub fn index(&self, document: Document) {
        let seq = self.seq.fetch_add(1, Ordering::SeqCst);
        self.documents
            .pin()
            .insert(document.id.clone(), IndexedDocument { seq, document });
    }

    /// Removes a document.
    pub fn remove(&self, id: &str) -> bool {
        self.documents.pin().remove(id).is_some()
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn collect(
        &self,
        category: Option<&str>,
        score: impl Fn(&Document) -> Option<f32>,
    ) -> Vec<Hit> {
        let guard = self.documents.pin();
        guard
            .iter()
            .filter(|(_, indexed)| {
                category.is_none_or(|category| {
                    indexed
                        .document
                        .category
                        .as_deref()
                        .is_some_and(|c| c.eq_ignore_ascii_case(category))
                })
            })
            .filter_map(|(_, indexed)| {
                score(&indexed.document).map(|score| Hit {
                    seq: indexed.seq,
                    score,
                    document: indexed.document.clone(),
                })
            })
            .collect()
    }
}

struct Hit {
    seq: u64,
    score: f32,
    document: Document,
}

impl Hit {
    fn into_result(self) -> SearchResult {
        SearchResult {
            id: self.document.id,
            score: self.score,
            category: self.document.category,
            values: self.document.values,
        }
    }
}

fn finish(mut hits: Vec<Hit>, max_results: usize) -> SearchResults {
    let total = hits.len() as u64;
    hits.truncate(max_results);
    SearchResults::new(total, hits.into_iter().map(Hit::into_result).collect())
}

/// Default ranking: best score first, then index order.
fn by_relevance(a: &Hit, b: &Hit) -> CmpOrdering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.seq.cmp(&b.seq))
}

fn by_fields(a: &Hit, b: &Hit, fields: &[SortableField]) -> CmpOrdering {
    fields
        .iter()
        .map(|field| compare_field(a, b, field))
        .find(|ordering| ordering.is_ne())
        .unwrap_or(CmpOrdering::Equal)
}

fn compare_field(a: &Hit, b: &Hit, field: &SortableField) -> CmpOrdering {
    let first = |hit: &Hit| {
        hit.document
            .values
            .get(&field.name)
            .and_then(|values| values.first())
            .cloned()
    };
    match field.sort_type {
        Some(SortType::Score) => a.score.total_cmp(&b.score),
        Some(SortType::DocumentOrder) => a.seq.cmp(&b.seq),
        Some(SortType::Int | SortType::Long) => {
            compare_missing_last(first(a), first(b), |v| v.trim().parse::<i64>().ok())
        }
        Some(SortType::Float | SortType::Double) => {
            compare_missing_last(first(a), first(b), |v| v.trim().parse::<f64>().ok().map(OrdF64))
        }
        Some(SortType::Date) => compare_missing_last(first(a), first(b), parse_date),
        Some(SortType::String) | None => {
            compare_missing_last(first(a), first(b), |v| Some(v.to_lowercase()))
        }
    }
}

fn compare_missing_last<T: Ord>(
    a: Option<String>,
    b: Option<String>,
    key: impl Fn(&str) -> Option<T>,
) -> CmpOrdering {
    match (a.as_deref().and_then(&key), b.as_deref().and_then(&key)) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => CmpOrdering::Less,
        (None, Some(_)) => CmpOrdering::Greater,
        (None, None) => CmpOrdering::Equal,
    }
}

fn parse_date(value: &str) -> Option<i128> {
    OffsetDateTime::parse(value, &Rfc3339)
        .map(OffsetDateTime::unix_timestamp_nanos)
        .ok()
        .or_else(|| value.trim().parse::<i64>().ok().map(i128::from))
}

struct OrdF64(f64);

impl PartialEq for OrdF64 {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_eq()
    }
}

impl Eq for OrdF64 {}

impl PartialOrd for OrdF64 {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrdF64 {
    fn cmp(&self, other: &Self) -> CmpOrdering {
        self.0.total_cmp(&other.0)
    }
}

fn clause_matches(document: &Document, clause: &Clause) -> bool {
    let matches_values = |values: &[String]| -> bool {
        values.iter().any(|value| match &clause.matcher {
            Matcher::Any => true,
            Matcher::Term(term) => query_parser::tokenize(value).iter().any(|t| t == term),
            Matcher::Prefix(prefix) => query_parser::tokenize(value)
                .iter()
                .any(|t| t.starts_with(prefix.as_str())),
            Matcher::Phrase(phrase) => query_parser::tokenize(value)
                .windows(phrase.len())
                .any(|window| window == phrase.as_slice()),
        })
    };

    match (&clause.field, &clause.matcher) {
        (None, Matcher::Any) => true,
        (Some(field), _) => document
            .values
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(field))
            .is_some_and(|(_, values)| matches_values(values)),
        (None, _) => document.values.values().any(|values| matches_values(values)),
    }
}

/// Scores a document against parsed clauses, `None` when it does not match.
fn score(document: &Document, clauses: &[Clause]) -> Option<f32> {
    let mut score = 0.0_f32;
    let mut has_must = false;
    let mut should_total = 0;
    let mut should_matched = 0;

    for clause in clauses {
        let matched = clause_matches(document, clause);
        match clause.occur {
            Occur::MustNot if matched => return None,
            Occur::MustNot => {}
            Occur::Must if !matched => return None,
            Occur::Must => {
                has_must = true;
                score += 1.0;
            }
            Occur::Should => {
                should_total += 1;
                if matched {
                    should_matched += 1;
                    score += 1.0;
                }
            }
        }
    }

    if !has_must && should_total > 0 && should_matched == 0 {
        return None;
    }
    Some(score.max(1.0))
}

#[async_trait]
impl Searcher for MemorySearchIndex {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(
        &self,
        query: &SearchQuery,
        max_results: usize,
    ) -> Result<SearchResults, SearchError> {
        let text = query.native_query.as_deref().unwrap_or("*");
        let clauses = query_parser::parse(text, query.default_operation)?;
        tracing::debug!(index = %self.name, query = %query, max_results, "Executing query");

        let mut hits = self.collect(query.category.as_deref(), |document| {
            score(document, &clauses)
        });
        match &query.ordering {
            Some(ordering) => {
                hits.sort_by(|a, b| {
                    let by_sort_fields = by_fields(a, b, &ordering.fields);
                    let directed = match ordering.direction {
                        SortDirection::Asc => by_sort_fields,
                        SortDirection::Desc => by_sort_fields.reverse(),
                    };
                    directed.then_with(|| a.seq.cmp(&b.seq))
                });
            }
            None => hits.sort_by(by_relevance),
        }
        Ok(finish(hits, max_results))
    }

    async fn search(&self, text: &str, max_results: usize) -> Result<SearchResults, SearchError> {
        let terms = query_parser::tokenize(text);
        tracing::debug!(index = %self.name, text, max_results, "Executing search");
        if terms.is_empty() {
            return Ok(SearchResults::default());
        }

        let clauses: Vec<Clause> = terms
            .into_iter()
            .map(|term| Clause {
                occur: Occur::Should,
                field: None,
                matcher: Matcher::Term(term),
            })
            .collect();
        let mut hits = self.collect(None, |document| score(document, &clauses));
        hits.sort_by(by_relevance);
        Ok(finish(hits, max_results))
    }

    fn indexed_field_names(&self) -> Result<Vec<String>, SearchError> {
        let guard = self.documents.pin();
        let names: BTreeSet<String> = guard
            .iter()
            .flat_map(|(_, indexed)| indexed.document.values.keys().cloned())
            .collect();
        Ok(names.into_iter().collect())
    }
}
