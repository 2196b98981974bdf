//! Engine-neutral query model.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How unprefixed clauses of a native query are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BooleanOperation {
    #[default]
    And,
    Or,
}

impl BooleanOperation {
    /// GraphQL enum item name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

impl fmt::Display for BooleanOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BooleanOperation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "AND" => Ok(Self::And),
            "OR" => Ok(Self::Or),
            other => Err(format!("unknown boolean operation '{other}'")),
        }
    }
}

/// Direction of an ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// GraphQL enum item name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ASC" => Ok(Self::Asc),
            "DESC" => Ok(Self::Desc),
            other => Err(format!("unknown sort direction '{other}'")),
        }
    }
}

/// How a sort field's values are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortType {
    /// Relevance score.
    Score,
    /// Index insertion order.
    DocumentOrder,
    String,
    Int,
    Long,
    Float,
    Double,
    Date,
}

impl SortType {
    fn name(self) -> &'static str {
        match self {
            Self::Score => "Score",
            Self::DocumentOrder => "DocumentOrder",
            Self::String => "String",
            Self::Int => "Int",
            Self::Long => "Long",
            Self::Float => "Float",
            Self::Double => "Double",
            Self::Date => "Date",
        }
    }
}

impl fmt::Display for SortType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SortType {
    type Err = String;

    /// Parses a sort type tag, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let sort_type = match s.to_ascii_lowercase().as_str() {
            "score" => Self::Score,
            "documentorder" => Self::DocumentOrder,
            "string" => Self::String,
            "int" => Self::Int,
            "long" => Self::Long,
            "float" => Self::Float,
            "double" => Self::Double,
            "date" => Self::Date,
            _ => return Err(format!("unknown sort type '{s}'")),
        };
        Ok(sort_type)
    }
}

/// A named, optionally typed sort key.
///
/// Untyped fields use the backend's default comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortableField {
    pub name: String,
    pub sort_type: Option<SortType>,
}

impl SortableField {
    /// Creates an untyped sort field.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sort_type: None,
        }
    }

    /// Creates a typed sort field.
    #[must_use]
    pub fn typed(name: impl Into<String>, sort_type: SortType) -> Self {
        Self {
            name: name.into(),
            sort_type: Some(sort_type),
        }
    }
}

impl fmt::Display for SortableField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.sort_type {
            Some(sort_type) => write!(f, "{}:{sort_type}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// A composite ordering: every field sorted in one direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ordering {
    pub direction: SortDirection,
    pub fields: Vec<SortableField>,
}

/// A query against one search index.
///
/// Built in three steps: scope (`new`), native query text, then an optional
/// ordering. The native text is never interpreted here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub category: Option<String>,
    pub default_operation: BooleanOperation,
    pub native_query: Option<String>,
    pub ordering: Option<Ordering>,
}

impl SearchQuery {
    /// Creates a query scoped to `category` (all categories when `None`).
    #[must_use]
    pub fn new(category: Option<&str>, default_operation: BooleanOperation) -> Self {
        Self {
            category: category.map(str::to_string),
            default_operation,
            native_query: None,
            ordering: None,
        }
    }

    /// Sets the raw query text in the backend's native syntax.
    #[must_use]
    pub fn native_query(mut self, raw: impl Into<String>) -> Self {
        self.native_query = Some(raw.into());
        self
    }

    /// Orders ascending by `fields`, in the given order.
    #[must_use]
    pub fn order_by(self, fields: Vec<SortableField>) -> Self {
        self.ordered(SortDirection::Asc, fields)
    }

    /// Orders descending by `fields`, in the given order.
    #[must_use]
    pub fn order_by_descending(self, fields: Vec<SortableField>) -> Self {
        self.ordered(SortDirection::Desc, fields)
    }

    /// Orders by `fields` in `direction`.
    #[must_use]
    pub fn ordered(mut self, direction: SortDirection, fields: Vec<SortableField>) -> Self {
        self.ordering = Some(Ordering { direction, fields });
        self
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ Category: {}, DefaultOperation: {}, Query: {}",
            self.category.as_deref().unwrap_or("*"),
            self.default_operation,
            self.native_query.as_deref().unwrap_or(""),
        )?;
        if let Some(ordering) = &self.ordering {
            f.write_str(", Sort: ")?;
            for (i, field) in ordering.fields.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{field} {}", ordering.direction)?;
            }
        }
        f.write_str(" }")
    }
}
