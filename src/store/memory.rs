//! In-process data store with the subset of PostgREST semantics the SDK uses.
//!
//! Tables hold JSON objects. Filters, ordering, limits, projections and
//! relation embedding are evaluated the way the data API evaluates them, and
//! the same error codes are returned for unknown columns and relations, so the
//! query accessors run unchanged against either backend.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{NaiveDate, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::RemoteStore;
use crate::config::DEFAULT_ALERT_THRESHOLD;
use crate::error::{FinTrackError, Result};
use crate::query::{Embed, Filter, Op, Query};

type Row = Map<String, Value>;

/// Handler for a registered stored procedure.
pub type RpcHandler = Arc<dyn Fn(&MemoryStore, &Value) -> Result<Value> + Send + Sync>;

const CATEGORY_COLUMNS: &[&str] = &["id", "user_id", "name", "color", "icon", "created_at"];
const EXPENSE_COLUMNS: &[&str] = &[
    "id",
    "user_id",
    "category_id",
    "amount",
    "description",
    "expense_date",
    "created_at",
];
const BUDGET_COLUMNS: &[&str] = &[
    "id",
    "user_id",
    "category_id",
    "amount",
    "alert_threshold",
    "year",
    "month",
    "created_at",
];

pub struct MemoryStore {
    tables: RwLock<HashMap<String, Vec<Row>>>,
    schema: HashMap<String, Vec<String>>,
    period_columns: bool,
    rpcs: RwLock<HashMap<String, RpcHandler>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// A store with the `categories`, `expenses` and `budgets` tables.
    pub fn new() -> Self {
        Self::build(false)
    }

    /// Like [`new`](Self::new), but `expenses` also carries the generated
    /// `year` and `month` columns derived from `expense_date`.
    pub fn with_period_columns() -> Self {
        Self::build(true)
    }

    fn build(period_columns: bool) -> Self {
        let mut schema = HashMap::new();
        let owned = |cols: &[&str]| cols.iter().map(|c| c.to_string()).collect::<Vec<_>>();
        schema.insert("categories".to_string(), owned(CATEGORY_COLUMNS));
        let mut expense_cols = owned(EXPENSE_COLUMNS);
        if period_columns {
            expense_cols.push("year".to_string());
            expense_cols.push("month".to_string());
        }
        schema.insert("expenses".to_string(), expense_cols);
        schema.insert("budgets".to_string(), owned(BUDGET_COLUMNS));

        let tables = schema.keys().map(|t| (t.clone(), Vec::new())).collect();
        Self {
            tables: RwLock::new(tables),
            schema,
            period_columns,
            rpcs: RwLock::new(HashMap::new()),
        }
    }

    /// Register a stored procedure callable through [`RemoteStore::rpc`].
    pub fn register_rpc<F>(&self, name: &str, handler: F) -> Result<()>
    where
        F: Fn(&MemoryStore, &Value) -> Result<Value> + Send + Sync + 'static,
    {
        self.rpcs
            .write()
            .map_err(|_| poisoned())?
            .insert(name.to_string(), Arc::new(handler));
        Ok(())
    }

    /// Snapshot of every row in a table, in insertion order.
    pub fn rows(&self, table: &str) -> Result<Vec<Value>> {
        let tables = self.read()?;
        let rows = tables.get(table).ok_or_else(|| unknown_table(table))?;
        Ok(rows.iter().cloned().map(Value::Object).collect())
    }

    /// Insert fixture rows, returning them as stored.
    pub fn seed(&self, table: &str, rows: Vec<Value>) -> Result<Vec<Value>> {
        let query = Query {
            table: table.to_string(),
            columns: vec!["*".to_string()],
            embeds: Vec::new(),
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
            offset: None,
        };
        self.insert(&query, rows)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, Vec<Row>>>> {
        self.tables.read().map_err(|_| poisoned())
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, Vec<Row>>>> {
        self.tables.write().map_err(|_| poisoned())
    }

    fn columns(&self, table: &str) -> Result<&[String]> {
        self.schema
            .get(table)
            .map(Vec::as_slice)
            .ok_or_else(|| unknown_table(table))
    }

    fn check_column(&self, table: &str, column: &str) -> Result<()> {
        if self.columns(table)?.iter().any(|c| c == column) {
            Ok(())
        } else {
            Err(FinTrackError::remote(
                400,
                Some("42703".into()),
                format!("column {}.{} does not exist", table, column),
            ))
        }
    }

    fn check_payload(&self, table: &str, row: &Row) -> Result<()> {
        let columns = self.columns(table)?;
        for key in row.keys() {
            if !columns.iter().any(|c| c == key) {
                return Err(FinTrackError::remote(
                    400,
                    Some("PGRST204".into()),
                    format!("Could not find the '{}' column of '{}' in the schema cache", key, table),
                ));
            }
        }
        Ok(())
    }

    fn check_query(&self, query: &Query) -> Result<()> {
        for filter in &query.filters {
            self.check_column(&query.table, &filter.column)?;
        }
        for order in &query.order {
            self.check_column(&query.table, &order.column)?;
        }
        for col in query.columns.iter().filter(|c| c.as_str() != "*") {
            self.check_column(&query.table, col)?;
        }
        for embed in &query.embeds {
            self.columns(&embed.relation).map_err(|_| {
                FinTrackError::remote(
                    400,
                    Some("PGRST200".into()),
                    format!(
                        "Could not find a relationship between '{}' and '{}'",
                        query.table, embed.relation
                    ),
                )
            })?;
            self.check_column(&query.table, &embed.foreign_key())?;
        }
        Ok(())
    }

    /// Fill ids, timestamps, defaults and generated columns.
    fn complete(&self, table: &str, row: &mut Row) {
        if !row.get("id").is_some_and(|v| !v.is_null()) {
            row.insert("id".into(), Value::String(Uuid::new_v4().to_string()));
        }
        if !row.get("created_at").is_some_and(|v| !v.is_null()) {
            row.insert("created_at".into(), Value::String(Utc::now().to_rfc3339()));
        }
        match table {
            "budgets" => {
                if row.get("alert_threshold").map_or(true, Value::is_null) {
                    row.insert("alert_threshold".into(), Value::from(DEFAULT_ALERT_THRESHOLD));
                }
            }
            "expenses" if self.period_columns => {
                let date = row
                    .get("expense_date")
                    .and_then(Value::as_str)
                    .and_then(|s| NaiveDate::parse_from_str(s.get(..10).unwrap_or(s), "%Y-%m-%d").ok());
                if let Some(date) = date {
                    use chrono::Datelike;
                    row.insert("year".into(), Value::from(date.year()));
                    row.insert("month".into(), Value::from(date.month()));
                }
            }
            _ => {}
        }
    }

    fn project(&self, tables: &HashMap<String, Vec<Row>>, query: &Query, row: &Row) -> Value {
        let mut out = if query.columns.iter().any(|c| c == "*") {
            row.clone()
        } else {
            pick(row, &query.columns)
        };
        for embed in &query.embeds {
            out.insert(embed.relation.clone(), resolve_embed(tables, embed, row));
        }
        Value::Object(out)
    }
}

impl RemoteStore for MemoryStore {
    fn fetch(&self, query: &Query) -> Result<Vec<Value>> {
        self.check_query(query)?;
        let tables = self.read()?;
        let rows = tables
            .get(&query.table)
            .ok_or_else(|| unknown_table(&query.table))?;

        let mut matched: Vec<&Row> = rows
            .iter()
            .filter(|row| query.filters.iter().all(|f| matches(row, f)))
            .collect();

        if !query.order.is_empty() {
            matched.sort_by(|a, b| {
                for order in &query.order {
                    let ord = compare_values(a.get(&order.column), b.get(&order.column));
                    let ord = if order.ascending { ord } else { ord.reverse() };
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                Ordering::Equal
            });
        }

        let offset = query.offset.unwrap_or(0);
        let limit = query.limit.unwrap_or(usize::MAX);
        Ok(matched
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|row| self.project(&tables, query, row))
            .collect())
    }

    fn insert(&self, query: &Query, rows: Vec<Value>) -> Result<Vec<Value>> {
        self.check_query(query)?;
        let mut prepared = Vec::with_capacity(rows.len());
        for value in rows {
            let Value::Object(mut row) = value else {
                return Err(FinTrackError::InvalidArgument(
                    "inserted rows must be JSON objects".into(),
                ));
            };
            self.check_payload(&query.table, &row)?;
            self.complete(&query.table, &mut row);
            prepared.push(row);
        }

        let mut tables = self.write()?;
        tables
            .get_mut(&query.table)
            .ok_or_else(|| unknown_table(&query.table))?
            .extend(prepared.iter().cloned());
        Ok(prepared
            .iter()
            .map(|row| self.project(&tables, query, row))
            .collect())
    }

    fn update(&self, query: &Query, patch: Value) -> Result<Vec<Value>> {
        self.check_query(query)?;
        let Value::Object(patch) = patch else {
            return Err(FinTrackError::InvalidArgument(
                "update payload must be a JSON object".into(),
            ));
        };
        self.check_payload(&query.table, &patch)?;

        let mut tables = self.write()?;
        let rows = tables
            .get_mut(&query.table)
            .ok_or_else(|| unknown_table(&query.table))?;
        let mut updated = Vec::new();
        for row in rows.iter_mut() {
            if query.filters.iter().all(|f| matches(row, f)) {
                for (key, value) in &patch {
                    row.insert(key.clone(), value.clone());
                }
                self.complete(&query.table, row);
                updated.push(row.clone());
            }
        }
        Ok(updated
            .iter()
            .map(|row| self.project(&tables, query, row))
            .collect())
    }

    fn delete(&self, query: &Query) -> Result<usize> {
        self.check_query(query)?;
        let mut tables = self.write()?;
        let rows = tables
            .get_mut(&query.table)
            .ok_or_else(|| unknown_table(&query.table))?;
        let before = rows.len();
        rows.retain(|row| !query.filters.iter().all(|f| matches(row, f)));
        Ok(before - rows.len())
    }

    fn rpc(&self, function: &str, args: Value) -> Result<Value> {
        let handler = self
            .rpcs
            .read()
            .map_err(|_| poisoned())?
            .get(function)
            .cloned()
            .ok_or_else(|| {
                FinTrackError::remote(
                    404,
                    Some("PGRST202".into()),
                    format!("Could not find the function public.{}", function),
                )
            })?;
        handler(self, &args)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn poisoned() -> FinTrackError {
    FinTrackError::InvalidArgument("memory store lock poisoned".into())
}

fn unknown_table(table: &str) -> FinTrackError {
    FinTrackError::remote(
        404,
        Some("42P01".into()),
        format!("relation \"public.{}\" does not exist", table),
    )
}

fn pick(row: &Row, columns: &[String]) -> Row {
    columns
        .iter()
        .filter(|c| c.as_str() != "*")
        .map(|c| (c.clone(), row.get(c).cloned().unwrap_or(Value::Null)))
        .collect()
}

fn resolve_embed(tables: &HashMap<String, Vec<Row>>, embed: &Embed, row: &Row) -> Value {
    let Some(key) = row.get(&embed.foreign_key()) else {
        return Value::Null;
    };
    tables
        .get(&embed.relation)
        .and_then(|related| related.iter().find(|r| r.get("id") == Some(key)))
        .map(|related| {
            if embed.columns.is_empty() || embed.columns.iter().any(|c| c == "*") {
                Value::Object(related.clone())
            } else {
                Value::Object(pick(related, &embed.columns))
            }
        })
        .unwrap_or(Value::Null)
}

fn matches(row: &Row, filter: &Filter) -> bool {
    let value = row.get(&filter.column).unwrap_or(&Value::Null);
    match filter.op {
        Op::Is => match filter.value() {
            "null" => value.is_null(),
            "true" => value.as_bool() == Some(true),
            "false" => value.as_bool() == Some(false),
            _ => false,
        },
        Op::In => filter
            .values
            .iter()
            .any(|v| compare_to_literal(value, v) == Some(Ordering::Equal)),
        Op::ILike => value
            .as_str()
            .map(|s| glob_match(&s.to_lowercase(), &filter.value().to_lowercase()))
            .unwrap_or(false),
        op => {
            let Some(ord) = compare_to_literal(value, filter.value()) else {
                return false;
            };
            match op {
                Op::Eq => ord == Ordering::Equal,
                Op::Neq => ord != Ordering::Equal,
                Op::Gt => ord == Ordering::Greater,
                Op::Gte => ord != Ordering::Less,
                Op::Lt => ord == Ordering::Less,
                Op::Lte => ord != Ordering::Greater,
                _ => false,
            }
        }
    }
}

/// Compare a stored value with a filter literal. `None` when incomparable
/// (nulls never match, as in SQL).
fn compare_to_literal(value: &Value, literal: &str) -> Option<Ordering> {
    match value {
        Value::Number(n) => {
            let lhs = n.as_f64()?;
            let rhs: f64 = literal.parse().ok()?;
            lhs.partial_cmp(&rhs)
        }
        Value::String(s) => Some(s.as_str().cmp(literal)),
        Value::Bool(b) => {
            let rhs: bool = literal.parse().ok()?;
            Some(b.cmp(&rhs))
        }
        _ => None,
    }
}

/// Ordering used for `order=`; nulls sort last.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.total_cmp(&y)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.to_lowercase().cmp(&y.to_lowercase()),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}

/// Match `text` against a pattern where `*` stands for any run of characters.
fn glob_match(text: &str, pattern: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();
    if parts.len() == 1 {
        return text == pattern;
    }

    let mut rest = text;
    for (i, part) in parts.iter().enumerate() {
        if part.is_empty() {
            continue;
        }
        if i == 0 {
            match rest.strip_prefix(part) {
                Some(r) => rest = r,
                None => return false,
            }
        } else if i == parts.len() - 1 {
            return rest.ends_with(part);
        } else {
            match rest.find(part) {
                Some(pos) => rest = &rest[pos + part.len()..],
                None => return false,
            }
        }
    }
    true
}
