//! Screen-level loaders that combine several queries with the aggregators.

use std::panic;
use std::thread::{self, ScopedJoinHandle};

use chrono::{Datelike, NaiveDate};
use uuid::Uuid;

use super::{BudgetQuery, CategoryQuery, ExpenseQuery};
use crate::analytics::{self, compute_stats, month_summaries};
use crate::config::{ALL_TIME_EXPENSE_LIMIT, MAX_TREND_MONTHS};
use crate::error::{FinTrackError, Result};
use crate::models::{
    Budget, BudgetOverview, BudgetReport, Category, Expense, MonthSummary, MonthlyStats, Period,
};
use crate::store::RemoteStore;

/// Window analysed by [`StatsQuery::analyze`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRange {
    /// The calendar month containing the reference date.
    Month,
    /// The calendar year containing the reference date.
    Year,
    /// The whole history, capped at the most recent 1000 expenses.
    All,
}

impl TimeRange {
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "month" => Ok(TimeRange::Month),
            "year" => Ok(TimeRange::Year),
            "all" => Ok(TimeRange::All),
            other => Err(FinTrackError::InvalidArgument(format!(
                "unknown time range {:?} (expected month, year or all)",
                other
            ))),
        }
    }
}

/// Everything a month view needs, fetched in one round of parallel requests.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodData {
    pub period: Period,
    pub categories: Vec<Category>,
    pub budgets: Vec<Budget>,
    pub expenses: Vec<Expense>,
}

impl PeriodData {
    pub fn stats(&self) -> MonthlyStats {
        compute_stats(&self.expenses, &self.categories)
    }

    pub fn budget_reports(&self) -> Vec<BudgetReport> {
        analytics::evaluate_all(&self.budgets, &self.expenses)
    }

    pub fn budget_overview(&self) -> BudgetOverview {
        analytics::overview(&self.budget_reports())
    }
}

pub struct StatsQuery<'a> {
    store: &'a dyn RemoteStore,
}

impl<'a> StatsQuery<'a> {
    pub fn new(store: &'a dyn RemoteStore) -> Self {
        Self { store }
    }

    /// Statistics for one month.
    pub fn monthly_stats(&self, user_id: Uuid, period: Period) -> Result<MonthlyStats> {
        let store = self.store;
        let (categories, expenses) = thread::scope(|s| {
            let categories = s.spawn(move || CategoryQuery::new(store).list(user_id));
            let expenses = ExpenseQuery::new(store).list_for_month(user_id, period);
            (join(categories), expenses)
        });
        Ok(compute_stats(&expenses?, &categories?))
    }

    /// Statistics over a month, a year or the whole history, relative to
    /// `today`.
    pub fn analyze(&self, user_id: Uuid, range: TimeRange, today: NaiveDate) -> Result<MonthlyStats> {
        let store = self.store;
        let (categories, expenses) = thread::scope(|s| {
            let categories = s.spawn(move || CategoryQuery::new(store).list(user_id));
            let expenses = self.expenses_in(user_id, range, today);
            (join(categories), expenses)
        });
        Ok(compute_stats(&expenses?, &categories?))
    }

    fn expenses_in(&self, user_id: Uuid, range: TimeRange, today: NaiveDate) -> Result<Vec<Expense>> {
        let expenses = ExpenseQuery::new(self.store);
        match range {
            TimeRange::Month => expenses.list_for_month(user_id, Period::of(today)),
            TimeRange::Year => {
                let first = Period::new(today.year(), 1)?.first_day();
                let last = Period::new(today.year(), 12)?.last_day();
                expenses.list_between(user_id, first, last)
            }
            TimeRange::All => expenses.list(user_id, Some(ALL_TIME_EXPENSE_LIMIT)),
        }
    }

    /// One summary per month for the `months` months ending with the month
    /// of `today`, oldest first. Months without expenses report zero.
    ///
    /// At most [`MAX_TREND_MONTHS`] months can be requested.
    pub fn monthly_trends(
        &self,
        user_id: Uuid,
        months: usize,
        today: NaiveDate,
    ) -> Result<Vec<MonthSummary>> {
        if months == 0 {
            return Ok(Vec::new());
        }
        if months > MAX_TREND_MONTHS {
            return Err(FinTrackError::InvalidArgument(format!(
                "at most {} months of trends can be requested, got {}",
                MAX_TREND_MONTHS, months
            )));
        }
        let mut periods: Vec<Period> =
            std::iter::successors(Some(Period::of(today)), |p| Some(p.previous()))
                .take(months)
                .collect();
        periods.reverse();

        let first = periods[0].first_day();
        let last = periods[periods.len() - 1].last_day();
        let expenses = ExpenseQuery::new(self.store).list_between(user_id, first, last)?;
        Ok(month_summaries(&expenses, &periods))
    }

    /// Fetch categories (seeding defaults for new users), the month's budgets
    /// and the month's expenses in parallel.
    pub fn load_period(&self, user_id: Uuid, period: Period) -> Result<PeriodData> {
        let store = self.store;
        let (categories, budgets, expenses) = thread::scope(|s| {
            let categories = s.spawn(move || CategoryQuery::new(store).ensure_defaults(user_id));
            let budgets = s.spawn(move || BudgetQuery::new(store).list_for_period(user_id, period));
            let expenses = ExpenseQuery::new(store).list_for_month(user_id, period);
            (join(categories), join(budgets), expenses)
        });
        Ok(PeriodData {
            period,
            categories: categories?,
            budgets: budgets?,
            expenses: expenses?,
        })
    }
}

/// Join a scoped worker, re-raising its panic on the calling thread.
fn join<T>(handle: ScopedJoinHandle<'_, T>) -> T {
    handle.join().unwrap_or_else(|p| panic::resume_unwind(p))
}
