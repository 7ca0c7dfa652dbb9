use tracing::warn;

use crate::error::{FinTrackError, Result};
use crate::models::{Budget, BudgetOverview, BudgetReport, BudgetStatus, Expense};

/// Measure spending against one budget.
///
/// Only expenses of the budget's user, category and month are counted, so
/// callers may pass the whole month (or more) of expenses.
///
/// A budget with a zero amount has no meaningful percentage and is rejected
/// with [`FinTrackError::InvalidArgument`].
pub fn evaluate(budget: &Budget, expenses: &[Expense]) -> Result<BudgetStatus> {
    if budget.amount <= 0.0 || budget.amount.is_nan() {
        return Err(FinTrackError::InvalidArgument(format!(
            "budget {} has amount {}; a budget must be greater than zero",
            budget.id, budget.amount
        )));
    }
    let period = budget.period()?;

    let total_spent: f64 = expenses
        .iter()
        .filter(|e| {
            e.user_id == budget.user_id
                && e.category_id == budget.category_id
                && period.contains(e.expense_date)
        })
        .map(|e| e.amount)
        .sum();

    let percentage_used = total_spent / budget.amount * 100.0;
    Ok(BudgetStatus {
        total_spent,
        remaining: budget.amount - total_spent,
        percentage_used,
        is_over_budget: percentage_used > budget.threshold(),
        is_exceeded: total_spent > budget.amount,
    })
}

/// Evaluate every budget, skipping (and logging) degenerate ones.
pub fn evaluate_all(budgets: &[Budget], expenses: &[Expense]) -> Vec<BudgetReport> {
    budgets
        .iter()
        .filter_map(|budget| match evaluate(budget, expenses) {
            Ok(status) => Some(BudgetReport {
                budget: budget.clone(),
                state: status.state(),
                status,
            }),
            Err(e) => {
                warn!(budget = %budget.id, error = %e, "skipping budget");
                None
            }
        })
        .collect()
}

/// Totals across a set of evaluated budgets.
pub fn overview(reports: &[BudgetReport]) -> BudgetOverview {
    let total_budget: f64 = reports.iter().map(|r| r.budget.amount).sum();
    let total_spent: f64 = reports.iter().map(|r| r.status.total_spent).sum();
    let percentage_used = if total_budget > 0.0 {
        total_spent / total_budget * 100.0
    } else {
        0.0
    };
    BudgetOverview {
        total_budget,
        total_spent,
        remaining: total_budget - total_spent,
        percentage_used,
    }
}
