//! Category queries.

use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{FinTrackError, Result};
use crate::models::{Category, NewCategory, Record, DEFAULT_CATEGORIES};
use crate::query::QueryBuilder;
use crate::store::{decode_one, decode_rows, RemoteStore};

/// Query interface for the `categories` table.
pub struct CategoryQuery<'a> {
    store: &'a dyn RemoteStore,
}

impl<'a> CategoryQuery<'a> {
    pub fn new(store: &'a dyn RemoteStore) -> Self {
        Self { store }
    }

    /// The user's categories ordered by name.
    pub fn list(&self, user_id: Uuid) -> Result<Vec<Category>> {
        let query = QueryBuilder::new(Category::TABLE)
            .eq("user_id", &user_id.to_string())
            .order_asc("name")
            .build();
        decode_rows(self.store.fetch(&query)?)
    }

    pub fn get(&self, id: Uuid, user_id: Uuid) -> Result<Category> {
        let query = QueryBuilder::new(Category::TABLE)
            .eq("id", &id.to_string())
            .eq("user_id", &user_id.to_string())
            .limit(1)
            .build();
        decode_one(self.store.fetch(&query)?, &format!("category {}", id))
    }

    pub fn create(&self, category: &NewCategory) -> Result<Category> {
        category.validate()?;
        let query = QueryBuilder::new(Category::TABLE).build();
        let rows = self
            .store
            .insert(&query, vec![serde_json::to_value(category)?])?;
        decode_one(rows, "created category")
    }

    /// The user's categories, seeding the default set first when the user
    /// has none.
    ///
    /// The emptiness check and the batch insert are separate requests, so two
    /// concurrent first visits can both seed.
    pub fn ensure_defaults(&self, user_id: Uuid) -> Result<Vec<Category>> {
        let existing = self.list(user_id)?;
        if !existing.is_empty() {
            debug!(count = existing.len(), "categories present");
            return Ok(existing);
        }

        info!(user = %user_id, "seeding default categories");
        let rows = DEFAULT_CATEGORIES
            .iter()
            .map(|d| serde_json::to_value(d.for_user(user_id)))
            .collect::<std::result::Result<Vec<Value>, _>>()?;
        let query = QueryBuilder::new(Category::TABLE).build();
        let mut created: Vec<Category> = decode_rows(self.store.insert(&query, rows)?)?;
        created.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(created)
    }
}

/// Fail unless `category_id` names one of the user's categories.
pub(crate) fn ensure_owned(store: &dyn RemoteStore, category_id: Uuid, user_id: Uuid) -> Result<()> {
    let query = QueryBuilder::new(Category::TABLE)
        .select(&["id"])
        .eq("id", &category_id.to_string())
        .eq("user_id", &user_id.to_string())
        .limit(1)
        .build();
    if store.fetch(&query)?.is_empty() {
        return Err(FinTrackError::Validation(format!(
            "category {} does not belong to this user",
            category_id
        )));
    }
    Ok(())
}
