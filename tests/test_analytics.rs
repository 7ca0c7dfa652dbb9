mod common;

use fintrack_sdk::analytics::{compute_stats, evaluate, evaluate_all, month_summaries, overview, trend};
use fintrack_sdk::models::{BudgetState, Period, TrendDirection};
use fintrack_sdk::FinTrackError;

use common::{budget, category, date, expense};

const FOOD: u128 = 1;
const TRANSPORT: u128 = 2;
const LEISURE: u128 = 3;

// -- Statistics ---------------------------------------------------------------

#[test]
fn test_stats_totals_and_breakdown() {
    let categories = vec![category(FOOD, "Food"), category(TRANSPORT, "Transport")];
    let expenses = vec![
        expense(FOOD, 100.0, date(2024, 5, 3)),
        expense(FOOD, 50.0, date(2024, 5, 10)),
        expense(TRANSPORT, 30.0, date(2024, 5, 12)),
    ];
    let stats = compute_stats(&expenses, &categories);

    assert_eq!(stats.total_expenses, 180.0);
    assert_eq!(stats.transaction_count, 3);
    assert_eq!(stats.average_expense, 60.0);
    assert_eq!(stats.expenses_by_category.len(), 2);
    let food = &stats.expenses_by_category[0];
    assert_eq!((food.name.as_str(), food.total, food.count), ("Food", 150.0, 2));
    let transport = &stats.expenses_by_category[1];
    assert_eq!((transport.total, transport.count), (30.0, 1));
    assert_eq!(stats.top_category().unwrap().name, "Food");
}

#[test]
fn test_stats_excludes_categories_without_expenses() {
    let categories = vec![
        category(FOOD, "Food"),
        category(TRANSPORT, "Transport"),
        category(LEISURE, "Leisure"),
    ];
    let expenses = vec![expense(LEISURE, 20.0, date(2024, 5, 1))];
    let stats = compute_stats(&expenses, &categories);
    let names: Vec<&str> = stats.expenses_by_category.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Leisure"]);
}

#[test]
fn test_stats_empty_input() {
    let stats = compute_stats(&[], &[category(FOOD, "Food")]);
    assert_eq!(stats.total_expenses, 0.0);
    assert_eq!(stats.transaction_count, 0);
    assert_eq!(stats.average_expense, 0.0);
    assert!(stats.expenses_by_category.is_empty());
    assert!(stats.monthly_evolution.is_empty());
}

#[test]
fn test_stats_independent_of_expense_order() {
    let categories = vec![category(FOOD, "Food"), category(TRANSPORT, "Transport")];
    let expenses = vec![
        expense(FOOD, 100.0, date(2024, 4, 3)),
        expense(TRANSPORT, 30.25, date(2024, 5, 12)),
        expense(FOOD, 50.5, date(2024, 5, 10)),
        expense(TRANSPORT, 12.0, date(2024, 3, 28)),
        expense(FOOD, 7.75, date(2024, 5, 31)),
    ];
    let stats = compute_stats(&expenses, &categories);

    let mut reversed = expenses.clone();
    reversed.reverse();
    let mut rotated = expenses.clone();
    rotated.rotate_left(2);

    for reordered in [reversed, rotated] {
        let other = compute_stats(&reordered, &categories);
        assert_eq!(other.total_expenses, stats.total_expenses);
        assert_eq!(other.transaction_count, stats.transaction_count);
        assert_eq!(other.expenses_by_category, stats.expenses_by_category);
        assert_eq!(other.monthly_evolution, stats.monthly_evolution);
    }
    assert_eq!(stats.total_expenses, 200.5);
}

#[test]
fn test_evolution_keeps_last_six_months_ascending() {
    let expenses: Vec<_> = (1..=8)
        .map(|m| expense(FOOD, f64::from(m) * 10.0, date(2024, m, 15)))
        .chain(std::iter::once(expense(FOOD, 5.0, date(2023, 12, 31))))
        .collect();
    let stats = compute_stats(&expenses, &[category(FOOD, "Food")]);

    let labels: Vec<&str> = stats.monthly_evolution.iter().map(|p| p.label.as_str()).collect();
    assert_eq!(labels, vec!["03/24", "04/24", "05/24", "06/24", "07/24", "08/24"]);
    assert_eq!(stats.monthly_evolution.last().unwrap().total, 80.0);
}

#[test]
fn test_month_summaries_zero_fill() {
    let periods = vec![
        Period::new(2024, 3).unwrap(),
        Period::new(2024, 4).unwrap(),
        Period::new(2024, 5).unwrap(),
    ];
    let expenses = vec![
        expense(FOOD, 10.0, date(2024, 3, 2)),
        expense(FOOD, 15.0, date(2024, 5, 2)),
        expense(FOOD, 5.0, date(2024, 5, 9)),
    ];
    let summaries = month_summaries(&expenses, &periods);
    let totals: Vec<(u32, f64, usize)> = summaries
        .iter()
        .map(|s| (s.month, s.total_expenses, s.transaction_count))
        .collect();
    assert_eq!(totals, vec![(3, 10.0, 1), (4, 0.0, 0), (5, 20.0, 2)]);
}

// -- Budget evaluation ----------------------------------------------------------

#[test]
fn test_budget_alert_state() {
    let b = budget(FOOD, 500.0, Some(80.0), 2024, 5);
    let spent = vec![
        expense(FOOD, 300.0, date(2024, 5, 2)),
        expense(FOOD, 120.0, date(2024, 5, 20)),
    ];
    let status = evaluate(&b, &spent).unwrap();
    assert_eq!(status.total_spent, 420.0);
    assert_eq!(status.remaining, 80.0);
    assert_eq!(status.percentage_used, 84.0);
    assert!(status.is_over_budget);
    assert!(!status.is_exceeded);
    assert_eq!(status.state(), BudgetState::Alert);
}

#[test]
fn test_budget_exceeded_state() {
    let b = budget(FOOD, 500.0, None, 2024, 5);
    let status = evaluate(&b, &[expense(FOOD, 650.0, date(2024, 5, 2))]).unwrap();
    assert_eq!(status.percentage_used, 130.0);
    assert_eq!(status.remaining, -150.0);
    assert!(status.is_exceeded && status.is_over_budget);
    assert_eq!(status.state(), BudgetState::Exceeded);
}

#[test]
fn test_budget_attention_with_high_threshold() {
    let b = budget(FOOD, 100.0, Some(95.0), 2024, 5);
    let status = evaluate(&b, &[expense(FOOD, 92.0, date(2024, 5, 2))]).unwrap();
    assert!(!status.is_over_budget);
    assert_eq!(status.state(), BudgetState::Attention);
}

#[test]
fn test_budget_normal_state_uses_default_threshold() {
    let b = budget(FOOD, 100.0, None, 2024, 5);
    let status = evaluate(&b, &[expense(FOOD, 80.0, date(2024, 5, 2))]).unwrap();
    // exactly at the threshold is not over it
    assert!(!status.is_over_budget);
    assert_eq!(status.state(), BudgetState::Normal);
}

#[test]
fn test_budget_counts_only_matching_category_and_month() {
    let b = budget(FOOD, 200.0, None, 2024, 5);
    let expenses = vec![
        expense(FOOD, 50.0, date(2024, 5, 31)),
        expense(FOOD, 70.0, date(2024, 6, 1)),
        expense(TRANSPORT, 90.0, date(2024, 5, 15)),
    ];
    assert_eq!(evaluate(&b, &expenses).unwrap().total_spent, 50.0);
}

#[test]
fn test_zero_budget_rejected() {
    let b = budget(FOOD, 0.0, None, 2024, 5);
    let err = evaluate(&b, &[]).unwrap_err();
    assert!(matches!(err, FinTrackError::InvalidArgument(_)));
}

#[test]
fn test_evaluate_all_skips_degenerate_and_overview_sums() {
    let budgets = vec![
        budget(FOOD, 400.0, None, 2024, 5),
        budget(TRANSPORT, 0.0, None, 2024, 5),
        budget(LEISURE, 100.0, None, 2024, 5),
    ];
    let expenses = vec![
        expense(FOOD, 100.0, date(2024, 5, 4)),
        expense(LEISURE, 150.0, date(2024, 5, 4)),
    ];
    let reports = evaluate_all(&budgets, &expenses);
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[1].state, BudgetState::Exceeded);

    let total = overview(&reports);
    assert_eq!(total.total_budget, 500.0);
    assert_eq!(total.total_spent, 250.0);
    assert_eq!(total.remaining, 250.0);
    assert_eq!(total.percentage_used, 50.0);
}

// -- Trend ----------------------------------------------------------------------

#[test]
fn test_trend_up() {
    let t = trend(120.0, Some(100.0));
    assert!((t.percentage - 20.0).abs() < 1e-9);
    assert_eq!(t.direction, TrendDirection::Up);
    assert_eq!(t.label, "+20.0%");
}

#[test]
fn test_trend_down_reports_magnitude() {
    let t = trend(90.0, Some(100.0));
    assert_eq!(t.percentage, 10.0);
    assert_eq!(t.direction, TrendDirection::Down);
}

#[test]
fn test_trend_without_baseline_is_stable() {
    for previous in [None, Some(0.0)] {
        let t = trend(50.0, previous);
        assert_eq!(t.percentage, 0.0);
        assert_eq!(t.direction, TrendDirection::Stable);
        assert_eq!(t.label, "0.0%");
    }
    assert_eq!(trend(100.0, Some(100.0)).direction, TrendDirection::Stable);
}

#[test]
fn test_trend_equal_values_is_stable() {
    for value in [100.0, 0.5, 12_345.0] {
        let t = trend(value, Some(value));
        assert_eq!(t.percentage, 0.0);
        assert_eq!(t.direction, TrendDirection::Stable);
        assert_eq!(t.label, "0.0%");
    }
}
