//! Row query builder for the PostgREST data API.
//!
//! A [`QueryBuilder`] collects a table name, selected columns, embedded
//! relations, filters, ordering and pagination, and produces an immutable
//! [`Query`]. The same `Query` is rendered to URL parameters by the HTTP store
//! and evaluated directly by the in-process store. Builder methods return
//! `&mut Self` for chaining.
//!
//! # Example
//!
//! ```rust
//! use fintrack_sdk::QueryBuilder;
//! let query = QueryBuilder::new("expenses")
//!     .embed("categories", &["name", "color", "icon"])
//!     .eq("user_id", "3f1c")
//!     .gte("expense_date", "2024-05-01")
//!     .order_desc("expense_date")
//!     .limit(50)
//!     .build();
//! let params = query.to_params();
//! assert_eq!(params[0], ("select".to_string(), "*,categories(name,color,icon)".to_string()));
//! ```

use std::fmt;

/// Comparison operator of a single filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    /// Case-insensitive pattern match; `*` is the wildcard.
    ILike,
    In,
    /// `IS` comparison against `null`, `true` or `false`.
    Is,
}

impl Op {
    pub fn as_str(&self) -> &'static str {
        match self {
            Op::Eq => "eq",
            Op::Neq => "neq",
            Op::Gt => "gt",
            Op::Gte => "gte",
            Op::Lt => "lt",
            Op::Lte => "lte",
            Op::ILike => "ilike",
            Op::In => "in",
            Op::Is => "is",
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single `column op value` condition. All filters of a query are AND-ed.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub op: Op,
    /// One value for scalar operators, any number for [`Op::In`].
    pub values: Vec<String>,
}

impl Filter {
    /// The first (for scalar operators, the only) value.
    pub fn value(&self) -> &str {
        self.values.first().map(String::as_str).unwrap_or("")
    }

    /// Render the right-hand side of a PostgREST filter, e.g. `gte.2024-01-01`.
    pub fn render(&self) -> String {
        match self.op {
            Op::In => {
                let items: Vec<String> = self.values.iter().map(|v| quote_list_item(v)).collect();
                format!("in.({})", items.join(","))
            }
            op => format!("{}.{}", op, self.value()),
        }
    }
}

/// A related table requested alongside each row, e.g. `categories(name,color)`.
///
/// The relation is resolved through the `<singular>_id` foreign key of the
/// parent row (`categories` -> `category_id`).
#[derive(Debug, Clone, PartialEq)]
pub struct Embed {
    pub relation: String,
    pub columns: Vec<String>,
}

impl Embed {
    pub fn render(&self) -> String {
        let cols = if self.columns.is_empty() {
            "*".to_string()
        } else {
            self.columns.join(",")
        };
        format!("{}({})", self.relation, cols)
    }

    /// Foreign-key column on the parent table that points at this relation.
    pub fn foreign_key(&self) -> String {
        let singular = if let Some(stem) = self.relation.strip_suffix("ies") {
            format!("{}y", stem)
        } else if let Some(stem) = self.relation.strip_suffix('s') {
            stem.to_string()
        } else {
            self.relation.clone()
        };
        format!("{}_id", singular)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

/// An immutable, fully described row query.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub table: String,
    pub columns: Vec<String>,
    pub embeds: Vec<Embed>,
    pub filters: Vec<Filter>,
    pub order: Vec<Order>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl Query {
    /// The `select` parameter: plain columns followed by embedded relations.
    pub fn select_clause(&self) -> String {
        let mut parts: Vec<String> = self.columns.clone();
        parts.extend(self.embeds.iter().map(Embed::render));
        parts.join(",")
    }

    /// Render the query as PostgREST URL parameters.
    ///
    /// `select` comes first, then filters in insertion order, then `order`,
    /// `limit` and `offset`.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("select".to_string(), self.select_clause())];
        params.extend(self.filter_params());

        if !self.order.is_empty() {
            let order: Vec<String> = self
                .order
                .iter()
                .map(|o| format!("{}.{}", o.column, if o.ascending { "asc" } else { "desc" }))
                .collect();
            params.push(("order".to_string(), order.join(",")));
        }
        if let Some(n) = self.limit {
            params.push(("limit".to_string(), n.to_string()));
        }
        if let Some(n) = self.offset {
            params.push(("offset".to_string(), n.to_string()));
        }
        params
    }

    /// Only the filter parameters (used for `PATCH` and `DELETE`).
    pub fn filter_params(&self) -> Vec<(String, String)> {
        self.filters
            .iter()
            .map(|f| (f.column.clone(), f.render()))
            .collect()
    }
}

/// Builds [`Query`] values. Methods return `&mut Self` for chaining.
pub struct QueryBuilder {
    table: String,
    columns: Vec<String>,
    embeds: Vec<Embed>,
    filters: Vec<Filter>,
    order: Vec<Order>,
    limit_val: Option<usize>,
    offset_val: Option<usize>,
}

impl QueryBuilder {
    /// Create a builder targeting the given table, selecting `*`.
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            columns: vec!["*".to_string()],
            embeds: Vec::new(),
            filters: Vec::new(),
            order: Vec::new(),
            limit_val: None,
            offset_val: None,
        }
    }

    /// Set the columns to select (replaces the default `*`).
    pub fn select(&mut self, cols: &[&str]) -> &mut Self {
        self.columns = cols.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Embed a related table through its foreign key.
    pub fn embed(&mut self, relation: &str, cols: &[&str]) -> &mut Self {
        self.embeds.push(Embed {
            relation: relation.to_string(),
            columns: cols.iter().map(|c| c.to_string()).collect(),
        });
        self
    }

    fn push(&mut self, column: &str, op: Op, value: &str) -> &mut Self {
        self.filters.push(Filter {
            column: column.to_string(),
            op,
            values: vec![value.to_string()],
        });
        self
    }

    /// `{column} = value`
    pub fn eq(&mut self, column: &str, value: &str) -> &mut Self {
        self.push(column, Op::Eq, value)
    }

    /// `{column} <> value`
    pub fn neq(&mut self, column: &str, value: &str) -> &mut Self {
        self.push(column, Op::Neq, value)
    }

    /// `{column} > value`
    pub fn gt(&mut self, column: &str, value: &str) -> &mut Self {
        self.push(column, Op::Gt, value)
    }

    /// `{column} >= value`
    pub fn gte(&mut self, column: &str, value: &str) -> &mut Self {
        self.push(column, Op::Gte, value)
    }

    /// `{column} < value`
    pub fn lt(&mut self, column: &str, value: &str) -> &mut Self {
        self.push(column, Op::Lt, value)
    }

    /// `{column} <= value`
    pub fn lte(&mut self, column: &str, value: &str) -> &mut Self {
        self.push(column, Op::Lte, value)
    }

    /// Case-insensitive pattern match; `*` matches any run of characters.
    pub fn ilike(&mut self, column: &str, pattern: &str) -> &mut Self {
        self.push(column, Op::ILike, pattern)
    }

    /// `IS null` / `IS true` / `IS false`.
    pub fn is(&mut self, column: &str, value: &str) -> &mut Self {
        self.push(column, Op::Is, value)
    }

    /// `{column} IN (values...)`. An empty list matches nothing.
    pub fn in_list(&mut self, column: &str, values: &[&str]) -> &mut Self {
        self.filters.push(Filter {
            column: column.to_string(),
            op: Op::In,
            values: values.iter().map(|v| v.to_string()).collect(),
        });
        self
    }

    /// Add an ascending sort key.
    pub fn order_asc(&mut self, column: &str) -> &mut Self {
        self.order.push(Order {
            column: column.to_string(),
            ascending: true,
        });
        self
    }

    /// Add a descending sort key.
    pub fn order_desc(&mut self, column: &str) -> &mut Self {
        self.order.push(Order {
            column: column.to_string(),
            ascending: false,
        });
        self
    }

    /// Set the maximum number of rows to return.
    pub fn limit(&mut self, n: usize) -> &mut Self {
        self.limit_val = Some(n);
        self
    }

    /// Set the number of rows to skip before returning results.
    pub fn offset(&mut self, n: usize) -> &mut Self {
        self.offset_val = Some(n);
        self
    }

    pub fn build(&self) -> Query {
        Query {
            table: self.table.clone(),
            columns: self.columns.clone(),
            embeds: self.embeds.clone(),
            filters: self.filters.clone(),
            order: self.order.clone(),
            limit: self.limit_val,
            offset: self.offset_val,
        }
    }
}

/// Quote an `in.(...)` list item when it contains reserved characters.
fn quote_list_item(value: &str) -> String {
    if value.contains([',', '(', ')', '"', ' ']) {
        format!("\"{}\"", value.replace('"', "\\\""))
    } else {
        value.to_string()
    }
}
