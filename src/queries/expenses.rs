//! Expense queries.

use chrono::NaiveDate;
use tracing::debug;
use uuid::Uuid;

use super::categories::ensure_owned;
use crate::config::DEFAULT_EXPENSE_LIMIT;
use crate::error::{FinTrackError, Result};
use crate::models::{Expense, NewExpense, Period, Record};
use crate::query::QueryBuilder;
use crate::store::{decode_one, decode_rows, RemoteStore};

const CATEGORY_EMBED: &[&str] = &["name", "color", "icon"];

/// Query interface for the `expenses` table.
///
/// Reads embed the expense's category name, color and icon and return the
/// newest expenses first.
pub struct ExpenseQuery<'a> {
    store: &'a dyn RemoteStore,
}

impl<'a> ExpenseQuery<'a> {
    pub fn new(store: &'a dyn RemoteStore) -> Self {
        Self { store }
    }

    fn base(user_id: Uuid) -> QueryBuilder {
        let mut qb = QueryBuilder::new(Expense::TABLE);
        qb.embed("categories", CATEGORY_EMBED)
            .eq("user_id", &user_id.to_string())
            .order_desc("expense_date")
            .order_desc("created_at");
        qb
    }

    /// The most recent expenses, `limit` rows at most (50 when `None`).
    pub fn list(&self, user_id: Uuid, limit: Option<usize>) -> Result<Vec<Expense>> {
        let query = Self::base(user_id)
            .limit(limit.unwrap_or(DEFAULT_EXPENSE_LIMIT))
            .build();
        decode_rows(self.store.fetch(&query)?)
    }

    /// Every expense of the user, without a row limit.
    pub fn list_all(&self, user_id: Uuid) -> Result<Vec<Expense>> {
        decode_rows(self.store.fetch(&Self::base(user_id).build())?)
    }

    /// Expenses dated `from` through `to`, both inclusive.
    pub fn list_between(&self, user_id: Uuid, from: NaiveDate, to: NaiveDate) -> Result<Vec<Expense>> {
        if from > to {
            return Err(FinTrackError::InvalidArgument(format!(
                "date range starts after it ends ({} > {})",
                from, to
            )));
        }
        let query = Self::base(user_id)
            .gte("expense_date", &from.to_string())
            .lte("expense_date", &to.to_string())
            .build();
        decode_rows(self.store.fetch(&query)?)
    }

    /// Expenses of one calendar month.
    ///
    /// Filters on the `year`/`month` columns when the schema has them and
    /// falls back to an `expense_date` range when it does not.
    pub fn list_for_month(&self, user_id: Uuid, period: Period) -> Result<Vec<Expense>> {
        let query = Self::base(user_id)
            .eq("year", &period.year().to_string())
            .eq("month", &period.month().to_string())
            .build();
        match self.store.fetch(&query) {
            Ok(rows) => decode_rows(rows),
            Err(e) if e.is_undefined_column() => {
                debug!(%period, "no year/month columns, filtering by date range");
                self.list_between(user_id, period.first_day(), period.last_day())
            }
            Err(e) => Err(e),
        }
    }

    pub fn create(&self, expense: &NewExpense) -> Result<Expense> {
        expense.validate()?;
        ensure_owned(self.store, expense.category_id, expense.user_id)?;
        let query = QueryBuilder::new(Expense::TABLE)
            .embed("categories", CATEGORY_EMBED)
            .build();
        let rows = self
            .store
            .insert(&query, vec![serde_json::to_value(expense)?])?;
        decode_one(rows, "created expense")
    }

    /// Replace every editable field of an existing expense.
    pub fn update(&self, id: Uuid, expense: &NewExpense) -> Result<Expense> {
        expense.validate()?;
        ensure_owned(self.store, expense.category_id, expense.user_id)?;
        let query = QueryBuilder::new(Expense::TABLE)
            .embed("categories", CATEGORY_EMBED)
            .eq("id", &id.to_string())
            .eq("user_id", &expense.user_id.to_string())
            .build();
        let rows = self.store.update(&query, serde_json::to_value(expense)?)?;
        decode_one(rows, &format!("expense {}", id))
    }

    pub fn delete(&self, id: Uuid, user_id: Uuid) -> Result<()> {
        let query = QueryBuilder::new(Expense::TABLE)
            .eq("id", &id.to_string())
            .eq("user_id", &user_id.to_string())
            .build();
        match self.store.delete(&query)? {
            0 => Err(FinTrackError::NotFound(format!("expense {}", id))),
            _ => Ok(()),
        }
    }
}

/// Narrow a fetched expense list by category and by a case-insensitive
/// description search. An empty search matches everything.
pub fn filter_expenses<'e>(
    expenses: &'e [Expense],
    category_id: Option<Uuid>,
    search: &str,
) -> Vec<&'e Expense> {
    let needle = search.trim().to_lowercase();
    expenses
        .iter()
        .filter(|e| category_id.map_or(true, |id| e.category_id == id))
        .filter(|e| needle.is_empty() || e.description.to_lowercase().contains(&needle))
        .collect()
}
