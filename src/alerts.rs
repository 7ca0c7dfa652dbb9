//! Contextual alerts shown above the dashboard.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;

use crate::analytics::trend;
use crate::models::{MonthSummary, MonthlyStats, Period, TrendDirection};

/// Month-over-month increase (percent) above which spending is flagged.
pub const WORRYING_INCREASE: f64 = 20.0;
/// Average expense above which transactions count as large.
pub const HIGH_AVERAGE_EXPENSE: f64 = 10_000.0;
/// Days before month end at which the reminder starts.
pub const MONTH_END_DAYS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SmartAlert {
    /// Stable identifier used to dismiss the alert.
    pub id: &'static str,
    pub level: AlertLevel,
    pub title: String,
    pub message: String,
}

/// Alerts for `today`, given the current month's statistics and the recent
/// monthly summaries (oldest first, ending with the current month).
/// Alerts whose id is in `dismissed` are left out.
pub fn smart_alerts(
    stats: &MonthlyStats,
    trends: &[MonthSummary],
    today: NaiveDate,
    currency: &str,
    dismissed: &HashSet<String>,
) -> Vec<SmartAlert> {
    let day = today.day();
    let days_in_month = Period::of(today).days();
    let days_left = days_in_month.saturating_sub(day);
    let mut alerts = Vec::new();

    if (14..=16).contains(&day) {
        let daily = stats.total_expenses / f64::from(day);
        alerts.push(SmartAlert {
            id: "mid-month",
            level: AlertLevel::Info,
            title: "Mid-month check".to_string(),
            message: format!(
                "It is day {} of the month. You have spent {:.2} {} per day on average, \
                 with {} days left in the month.",
                day, daily, currency, days_left
            ),
        });
    }

    if let [.., previous, current] = trends {
        let change = trend(current.total_expenses, Some(previous.total_expenses));
        if change.direction == TrendDirection::Up && change.percentage > WORRYING_INCREASE {
            alerts.push(SmartAlert {
                id: "worrying-trend",
                level: AlertLevel::Warning,
                title: "Spending is rising".to_string(),
                message: format!(
                    "Your spending is up {:.1}% on last month. It may be time to review your budget.",
                    change.percentage
                ),
            });
        }
    }

    if stats.transaction_count > 0 {
        let average = stats.total_expenses / stats.transaction_count as f64;
        if average > HIGH_AVERAGE_EXPENSE {
            alerts.push(SmartAlert {
                id: "high-transactions",
                level: AlertLevel::Warning,
                title: "Large expenses detected".to_string(),
                message: format!(
                    "Your average expense is {:.2} {}. Smaller, more frequent purchases are \
                     easier to keep within budget.",
                    average, currency
                ),
            });
        }
    }

    if day + MONTH_END_DAYS >= days_in_month {
        alerts.push(SmartAlert {
            id: "month-end",
            level: AlertLevel::Info,
            title: "Month end is near".to_string(),
            message: format!(
                "Only {} days left this month. Check that you are on track with your budget.",
                days_left
            ),
        });
    }

    if matches!(today.weekday(), Weekday::Fri | Weekday::Sat) {
        alerts.push(SmartAlert {
            id: "weekend",
            level: AlertLevel::Info,
            title: "The weekend is coming".to_string(),
            message: "Weekends are when spending tends to peak. Set yourself a limit for the \
                      next two days."
                .to_string(),
        });
    }

    alerts.retain(|a| !dismissed.contains(a.id));
    alerts
}
