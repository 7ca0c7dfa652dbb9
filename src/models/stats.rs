use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Budget, Period};
use crate::config::ATTENTION_LEVEL;

// ---------------------------------------------------------------------------
// MonthlyStats: aggregate figures for one period
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyStats {
    pub total_expenses: f64,
    pub transaction_count: usize,
    pub average_expense: f64,
    pub expenses_by_category: Vec<CategoryTotal>,
    pub monthly_evolution: Vec<MonthlyPoint>,
}

impl MonthlyStats {
    /// The category with the largest total, if any expense was recorded.
    pub fn top_category(&self) -> Option<&CategoryTotal> {
        self.expenses_by_category
            .iter()
            .fold(None, |best: Option<&CategoryTotal>, cat| match best {
                Some(b) if b.total >= cat.total => Some(b),
                _ => Some(cat),
            })
    }

    /// Categories sorted by descending total.
    pub fn ranked_categories(&self) -> Vec<&CategoryTotal> {
        let mut ranked: Vec<&CategoryTotal> = self.expenses_by_category.iter().collect();
        ranked.sort_by(|a, b| b.total.total_cmp(&a.total));
        ranked
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    pub category_id: Uuid,
    pub name: String,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub total: f64,
    pub count: usize,
}

/// One point of the monthly evolution series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyPoint {
    pub year: i32,
    pub month: u32,
    /// `MM/YY`
    pub label: String,
    pub total: f64,
}

/// Spending totals of a single month, used for month-over-month comparisons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthSummary {
    pub year: i32,
    pub month: u32,
    pub total_expenses: f64,
    pub transaction_count: usize,
}

impl MonthSummary {
    pub fn empty(period: Period) -> Self {
        Self {
            year: period.year(),
            month: period.month(),
            total_expenses: 0.0,
            transaction_count: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// BudgetStatus: spending measured against one budget
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetStatus {
    pub total_spent: f64,
    pub remaining: f64,
    pub percentage_used: f64,
    pub is_over_budget: bool,
    pub is_exceeded: bool,
}

impl BudgetStatus {
    /// Display state; the first matching state wins.
    pub fn state(&self) -> BudgetState {
        if self.is_exceeded {
            BudgetState::Exceeded
        } else if self.is_over_budget {
            BudgetState::Alert
        } else if self.percentage_used >= ATTENTION_LEVEL {
            BudgetState::Attention
        } else {
            BudgetState::Normal
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetState {
    Exceeded,
    Alert,
    Attention,
    Normal,
}

/// A budget together with its evaluated status.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetReport {
    pub budget: Budget,
    pub status: BudgetStatus,
    pub state: BudgetState,
}

/// Totals across all budgets of a period.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetOverview {
    pub total_budget: f64,
    pub total_spent: f64,
    pub remaining: f64,
    pub percentage_used: f64,
}

// ---------------------------------------------------------------------------
// Trend: change between two consecutive periods
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trend {
    /// Magnitude of the change in percent; the sign lives in `direction`.
    pub percentage: f64,
    pub direction: TrendDirection,
    pub label: String,
}
