//! Pure aggregation over rows already fetched from the data API.
//!
//! Nothing here performs I/O; the query accessors feed these functions and
//! the results go straight to the presentation layer.

pub mod budget;
pub mod stats;
pub mod trend;

pub use budget::{evaluate, evaluate_all, overview};
pub use stats::{compute_stats, month_summaries, monthly_evolution};
pub use trend::trend;
