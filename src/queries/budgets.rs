//! Budget queries.

use uuid::Uuid;

use super::categories::ensure_owned;
use crate::error::{FinTrackError, Result};
use crate::models::{Budget, NewBudget, Period, Record};
use crate::query::QueryBuilder;
use crate::store::{decode_one, decode_rows, RemoteStore};

const CATEGORY_EMBED: &[&str] = &["name", "color", "icon"];

/// Query interface for the `budgets` table.
pub struct BudgetQuery<'a> {
    store: &'a dyn RemoteStore,
}

impl<'a> BudgetQuery<'a> {
    pub fn new(store: &'a dyn RemoteStore) -> Self {
        Self { store }
    }

    /// Budgets of one month, with their category embedded.
    pub fn list_for_period(&self, user_id: Uuid, period: Period) -> Result<Vec<Budget>> {
        let query = QueryBuilder::new(Budget::TABLE)
            .embed("categories", CATEGORY_EMBED)
            .eq("user_id", &user_id.to_string())
            .eq("year", &period.year().to_string())
            .eq("month", &period.month().to_string())
            .order_asc("created_at")
            .build();
        decode_rows(self.store.fetch(&query)?)
    }

    /// Every budget of the user, most recent month first.
    pub fn list_all(&self, user_id: Uuid) -> Result<Vec<Budget>> {
        let query = QueryBuilder::new(Budget::TABLE)
            .embed("categories", CATEGORY_EMBED)
            .eq("user_id", &user_id.to_string())
            .order_desc("year")
            .order_desc("month")
            .build();
        decode_rows(self.store.fetch(&query)?)
    }

    pub fn create(&self, budget: &NewBudget) -> Result<Budget> {
        budget.validate()?;
        ensure_owned(self.store, budget.category_id, budget.user_id)?;
        let query = QueryBuilder::new(Budget::TABLE)
            .embed("categories", CATEGORY_EMBED)
            .build();
        let rows = self
            .store
            .insert(&query, vec![serde_json::to_value(budget)?])?;
        decode_one(rows, "created budget")
    }

    pub fn update(&self, id: Uuid, budget: &NewBudget) -> Result<Budget> {
        budget.validate()?;
        ensure_owned(self.store, budget.category_id, budget.user_id)?;
        let query = QueryBuilder::new(Budget::TABLE)
            .embed("categories", CATEGORY_EMBED)
            .eq("id", &id.to_string())
            .eq("user_id", &budget.user_id.to_string())
            .build();
        let rows = self.store.update(&query, serde_json::to_value(budget)?)?;
        decode_one(rows, &format!("budget {}", id))
    }

    pub fn delete(&self, id: Uuid, user_id: Uuid) -> Result<()> {
        let query = QueryBuilder::new(Budget::TABLE)
            .eq("id", &id.to_string())
            .eq("user_id", &user_id.to_string())
            .build();
        if self.store.delete(&query)? == 0 {
            return Err(FinTrackError::NotFound(format!("budget {}", id)));
        }
        Ok(())
    }
}
