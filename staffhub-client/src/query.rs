//! Table query building
//!
//! A small builder for the hosted service's relational query surface.
//! Requests are plain data so both the HTTP client and the in-memory
//! backend can execute them with identical semantics.

use serde_json::Value;

/// Comparison operator for a column filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    /// Column equals value
    Eq,
    /// Column >= value
    Gte,
    /// Column <= value
    Lte,
    /// Case-insensitive substring match; the value is the bare term
    Ilike,
}

impl FilterOp {
    /// Wire name used in query parameters
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Gte => "gte",
            Self::Lte => "lte",
            Self::Ilike => "ilike",
        }
    }
}

/// One column filter
#[derive(Debug, Clone)]
pub struct Filter {
    pub column: String,
    pub op: FilterOp,
    pub value: Value,
}

impl Filter {
    pub fn new(column: impl Into<String>, op: FilterOp, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            op,
            value: value.into(),
        }
    }

    /// Render the filter value as a bare literal for a query parameter
    pub fn value_literal(&self) -> String {
        match &self.value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Result ordering
#[derive(Debug, Clone)]
pub struct OrderBy {
    pub column: String,
    pub ascending: bool,
}

/// A select over one table
#[derive(Debug, Clone)]
pub struct SelectRequest {
    pub table: String,
    /// AND-ed column filters
    pub filters: Vec<Filter>,
    /// One OR-ed group of filters (used for multi-column substring search)
    pub or_filters: Vec<Filter>,
    pub order: Option<OrderBy>,
    pub limit: Option<usize>,
}

impl SelectRequest {
    /// Start a select over `table`
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            filters: Vec::new(),
            or_filters: Vec::new(),
            order: None,
            limit: None,
        }
    }

    /// Add an equality filter
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::new(column, FilterOp::Eq, value));
        self
    }

    /// Add a >= filter
    pub fn gte(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::new(column, FilterOp::Gte, value));
        self
    }

    /// Add a <= filter
    pub fn lte(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::new(column, FilterOp::Lte, value));
        self
    }

    /// Add a case-insensitive substring condition over several columns,
    /// matching rows where ANY of them contains `term`
    pub fn search(mut self, columns: &[&str], term: impl Into<String>) -> Self {
        let term = term.into();
        for column in columns {
            self.or_filters
                .push(Filter::new(*column, FilterOp::Ilike, term.clone()));
        }
        self
    }

    /// Order results by `column`
    pub fn order(mut self, column: impl Into<String>, ascending: bool) -> Self {
        self.order = Some(OrderBy {
            column: column.into(),
            ascending,
        });
        self
    }

    /// Cap the number of returned rows
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Deserialize raw rows into a typed collection
///
/// Malformed rows surface as `InvalidResponse` rather than panicking.
pub fn rows_to<T: serde::de::DeserializeOwned>(
    rows: Vec<Value>,
) -> crate::ClientResult<Vec<T>> {
    rows.into_iter()
        .map(|row| {
            serde_json::from_value(row.clone()).map_err(|e| {
                crate::ClientError::InvalidResponse(format!("malformed row: {} ({})", row, e))
            })
        })
        .collect()
}
