mod common;

use std::collections::HashSet;

use fintrack_sdk::alerts::{smart_alerts, AlertLevel};
use fintrack_sdk::models::{MonthSummary, MonthlyStats};

use common::{date, fixture_with, seed_category, seed_expense, signed_in, user_id};

fn stats(total: f64, count: usize) -> MonthlyStats {
    MonthlyStats {
        total_expenses: total,
        transaction_count: count,
        average_expense: if count > 0 { total / count as f64 } else { 0.0 },
        ..MonthlyStats::default()
    }
}

fn summary(month: u32, total: f64) -> MonthSummary {
    MonthSummary {
        year: 2024,
        month,
        total_expenses: total,
        transaction_count: 1,
    }
}

fn ids(stats: &MonthlyStats, trends: &[MonthSummary], y: i32, m: u32, d: u32) -> Vec<&'static str> {
    smart_alerts(stats, trends, date(y, m, d), "FCFA", &HashSet::new())
        .into_iter()
        .map(|a| a.id)
        .collect()
}

#[test]
fn test_quiet_day_has_no_alerts() {
    // Tuesday 11 June 2024
    assert!(ids(&stats(0.0, 0), &[], 2024, 6, 11).is_empty());
}

#[test]
fn test_mid_month_check() {
    // Sunday 16 June 2024
    let alerts = smart_alerts(&stats(3200.0, 4), &[], date(2024, 6, 16), "FCFA", &HashSet::new());
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].id, "mid-month");
    assert_eq!(alerts[0].level, AlertLevel::Info);
    assert!(alerts[0].message.contains("200.00 FCFA per day"));
    assert!(alerts[0].message.contains("14 days left"));
}

#[test]
fn test_weekend_and_mid_month_together() {
    // Friday 14 June 2024
    assert_eq!(ids(&stats(0.0, 0), &[], 2024, 6, 14), vec!["mid-month", "weekend"]);
}

#[test]
fn test_month_end_reminder() {
    // Thursday 27 June 2024: three days left in a 30-day month
    assert_eq!(ids(&stats(0.0, 0), &[], 2024, 6, 27), vec!["month-end"]);
    // Wednesday 26 June 2024
    assert!(ids(&stats(0.0, 0), &[], 2024, 6, 26).is_empty());
}

#[test]
fn test_worrying_trend_above_twenty_percent() {
    let rising = [summary(5, 1000.0), summary(6, 1250.0)];
    assert_eq!(ids(&stats(1250.0, 1), &rising, 2024, 6, 11), vec!["worrying-trend"]);

    let mild = [summary(5, 1000.0), summary(6, 1200.0)];
    assert!(ids(&stats(1200.0, 1), &mild, 2024, 6, 11).is_empty());

    // no spending last month counts as stable
    let fresh = [summary(5, 0.0), summary(6, 800.0)];
    assert!(ids(&stats(800.0, 1), &fresh, 2024, 6, 11).is_empty());
}

#[test]
fn test_high_average_transaction() {
    assert_eq!(ids(&stats(30_003.0, 3), &[], 2024, 6, 11), vec!["high-transactions"]);
    assert!(ids(&stats(30_000.0, 3), &[], 2024, 6, 11).is_empty());
}

#[test]
fn test_dismissed_alerts_are_hidden() {
    let dismissed: HashSet<String> = ["weekend".to_string()].into_iter().collect();
    let alerts = smart_alerts(&stats(0.0, 0), &[], date(2024, 6, 14), "FCFA", &dismissed);
    let ids: Vec<&str> = alerts.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec!["mid-month"]);
}

#[test]
fn test_client_alerts_use_stored_expenses() {
    let fx = signed_in();
    let food = seed_category(&fx.store, user_id(), "Food");
    seed_expense(&fx.store, user_id(), food, 25_000.0, "2024-06-03", "rent share");
    seed_expense(&fx.store, user_id(), food, 5_000.0, "2024-05-20", "groceries");

    let alerts = fx.ft.alerts(date(2024, 6, 11), &HashSet::new()).unwrap();
    let ids: Vec<&str> = alerts.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec!["worrying-trend", "high-transactions"]);
}

#[test]
fn test_client_alerts_require_sign_in() {
    let fx = fixture_with(fintrack_sdk::MemoryStore::new());
    assert!(fx.ft.alerts(date(2024, 6, 11), &HashSet::new()).is_err());
}
