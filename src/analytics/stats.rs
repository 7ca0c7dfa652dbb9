use std::collections::{BTreeMap, HashMap};

use uuid::Uuid;

use crate::config::EVOLUTION_WINDOW;
use crate::models::{
    Category, CategoryTotal, Expense, MonthSummary, MonthlyPoint, MonthlyStats, Period,
};

/// Aggregate a period's expenses.
///
/// `expenses` must already be restricted to the period of interest; the
/// evolution series is computed over whatever months they span. Expenses
/// whose category is not in `categories` count towards the totals but not
/// towards the per-category breakdown.
pub fn compute_stats(expenses: &[Expense], categories: &[Category]) -> MonthlyStats {
    let total_expenses: f64 = expenses.iter().map(|e| e.amount).sum();
    let transaction_count = expenses.len();
    let average_expense = if transaction_count > 0 {
        total_expenses / transaction_count as f64
    } else {
        0.0
    };

    let mut per_category: HashMap<Uuid, (f64, usize)> = HashMap::new();
    for expense in expenses {
        let entry = per_category.entry(expense.category_id).or_insert((0.0, 0));
        entry.0 += expense.amount;
        entry.1 += 1;
    }

    let expenses_by_category = categories
        .iter()
        .filter_map(|cat| {
            let &(total, count) = per_category.get(&cat.id)?;
            Some(CategoryTotal {
                category_id: cat.id,
                name: cat.name.clone(),
                color: cat.color.clone(),
                icon: cat.icon.clone(),
                total,
                count,
            })
        })
        .collect();

    MonthlyStats {
        total_expenses,
        transaction_count,
        average_expense,
        expenses_by_category,
        monthly_evolution: monthly_evolution(expenses),
    }
}

/// Per-month totals, oldest first, limited to the most recent months.
pub fn monthly_evolution(expenses: &[Expense]) -> Vec<MonthlyPoint> {
    let mut by_month: BTreeMap<Period, f64> = BTreeMap::new();
    for expense in expenses {
        *by_month.entry(expense.period()).or_insert(0.0) += expense.amount;
    }

    let skip = by_month.len().saturating_sub(EVOLUTION_WINDOW);
    by_month
        .into_iter()
        .skip(skip)
        .map(|(period, total)| MonthlyPoint {
            year: period.year(),
            month: period.month(),
            label: period.label(),
            total,
        })
        .collect()
}

/// One summary per requested period, in the order given; months without
/// expenses report zero.
pub fn month_summaries(expenses: &[Expense], periods: &[Period]) -> Vec<MonthSummary> {
    let mut by_month: HashMap<Period, (f64, usize)> = HashMap::new();
    for expense in expenses {
        let entry = by_month.entry(expense.period()).or_insert((0.0, 0));
        entry.0 += expense.amount;
        entry.1 += 1;
    }

    periods
        .iter()
        .map(|&period| match by_month.get(&period) {
            Some(&(total, count)) => MonthSummary {
                year: period.year(),
                month: period.month(),
                total_expenses: total,
                transaction_count: count,
            },
            None => MonthSummary::empty(period),
        })
        .collect()
}
