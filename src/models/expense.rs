use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{de_amount, de_date, de_text, CategoryRef, Period, Record};
use crate::error::{FinTrackError, Result};

// ---------------------------------------------------------------------------
// Expense
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category_id: Uuid,
    #[serde(deserialize_with = "de_amount")]
    pub amount: f64,
    #[serde(default, deserialize_with = "de_text")]
    pub description: String,
    #[serde(deserialize_with = "de_date")]
    pub expense_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Embedded category columns, present when the query requested them.
    #[serde(rename = "categories", default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryRef>,
}

impl Expense {
    pub fn period(&self) -> Period {
        Period::of(self.expense_date)
    }
}

impl Record for Expense {
    const TABLE: &'static str = "expenses";
}

// ---------------------------------------------------------------------------
// NewExpense: insert and full-record update payload
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewExpense {
    pub user_id: Uuid,
    pub category_id: Uuid,
    pub amount: f64,
    pub description: String,
    pub expense_date: NaiveDate,
}

impl NewExpense {
    pub fn new(user_id: Uuid, category_id: Uuid, amount: f64, expense_date: NaiveDate) -> Self {
        Self {
            user_id,
            category_id,
            amount,
            description: String::new(),
            expense_date,
        }
    }

    pub fn description(mut self, text: &str) -> Self {
        self.description = text.to_string();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(FinTrackError::Validation(format!(
                "expense amount must be a non-negative number, got {}",
                self.amount
            )));
        }
        Ok(())
    }
}

/// Parse an amount typed into a form field (`"12.50"`, `"12,50"`).
pub fn parse_amount(input: &str) -> Result<f64> {
    let normalized = input.trim().replace(',', ".");
    if normalized.is_empty() {
        return Err(FinTrackError::Validation("amount is required".into()));
    }
    normalized
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| FinTrackError::Validation(format!("{:?} is not a valid amount", input)))
}
