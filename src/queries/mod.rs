pub mod budgets;
pub mod categories;
pub mod expenses;
pub mod stats;

pub use budgets::BudgetQuery;
pub use categories::CategoryQuery;
pub use expenses::{filter_expenses, ExpenseQuery};
pub use stats::{PeriodData, StatsQuery, TimeRange};
