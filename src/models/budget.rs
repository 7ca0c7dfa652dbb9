use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{de_amount, de_opt_number, CategoryRef, Period, Record};
use crate::config::DEFAULT_ALERT_THRESHOLD;
use crate::error::{FinTrackError, Result};

// ---------------------------------------------------------------------------
// Budget
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category_id: Uuid,
    #[serde(deserialize_with = "de_amount")]
    pub amount: f64,
    /// Percentage of `amount` above which spending is flagged.
    #[serde(default, deserialize_with = "de_opt_number")]
    pub alert_threshold: Option<f64>,
    pub year: i32,
    pub month: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "categories", default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryRef>,
}

impl Budget {
    /// The alert threshold, defaulting to 80 %.
    pub fn threshold(&self) -> f64 {
        self.alert_threshold.unwrap_or(DEFAULT_ALERT_THRESHOLD)
    }

    pub fn period(&self) -> Result<Period> {
        Period::new(self.year, self.month)
    }
}

impl Record for Budget {
    const TABLE: &'static str = "budgets";

    fn check(&self) -> std::result::Result<(), String> {
        if !(1..=12).contains(&self.month) {
            return Err(format!("budget {} has month {}", self.id, self.month));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// NewBudget: insert and full-record update payload
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewBudget {
    pub user_id: Uuid,
    pub category_id: Uuid,
    pub amount: f64,
    pub alert_threshold: f64,
    pub year: i32,
    pub month: u32,
}

impl NewBudget {
    pub fn new(user_id: Uuid, category_id: Uuid, amount: f64, period: Period) -> Self {
        Self {
            user_id,
            category_id,
            amount,
            alert_threshold: DEFAULT_ALERT_THRESHOLD,
            year: period.year(),
            month: period.month(),
        }
    }

    pub fn alert_threshold(mut self, percent: f64) -> Self {
        self.alert_threshold = percent;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(FinTrackError::Validation(format!(
                "budget amount must be greater than zero, got {}",
                self.amount
            )));
        }
        if !(0.0..=100.0).contains(&self.alert_threshold) {
            return Err(FinTrackError::Validation(format!(
                "alert threshold must be between 0 and 100, got {}",
                self.alert_threshold
            )));
        }
        Period::new(self.year, self.month)
            .map(|_| ())
            .map_err(|e| FinTrackError::Validation(e.to_string()))
    }
}
