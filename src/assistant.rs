//! Keyword-driven budget assistant.
//!
//! A question is lower-cased, split into words and matched against
//! [`RULES`] from top to bottom; the first rule with a matching keyword
//! produces the answer, and [`Topic::Help`] answers everything else.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::analytics::trend;
use crate::models::{MonthSummary, MonthlyStats, Period, TrendDirection};

/// Amount simulated when the question contains no number.
pub const DEFAULT_SIMULATION: u64 = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    Savings,
    TopCategories,
    BudgetStatus,
    Advice,
    Simulation,
    Analysis,
    Help,
}

pub struct Rule {
    pub topic: Topic,
    /// Whole words or word sequences, matched case-insensitively.
    pub keywords: &'static [&'static str],
}

impl Rule {
    fn matches(&self, words: &[&str]) -> bool {
        self.keywords.iter().any(|k| contains_phrase(words, k))
    }
}

pub const RULES: &[Rule] = &[
    Rule {
        topic: Topic::Savings,
        keywords: &["reduce", "save", "saving", "savings", "cut back", "lower my"],
    },
    Rule {
        topic: Topic::TopCategories,
        keywords: &["category", "categories", "most expensive", "biggest"],
    },
    Rule {
        topic: Topic::BudgetStatus,
        keywords: &[
            "budget",
            "budgets",
            "exceed",
            "exceeded",
            "overspend",
            "overspent",
            "overspending",
        ],
    },
    Rule {
        topic: Topic::Advice,
        keywords: &["advice", "tip", "tips", "help"],
    },
    Rule {
        topic: Topic::Simulation,
        keywords: &["simulate", "simulation", "what if"],
    },
    Rule {
        topic: Topic::Analysis,
        keywords: &["analysis", "analyse", "analyze", "summary", "report"],
    },
];

/// Split lower-cased text into words of letters and digits.
fn words(text: &str) -> Vec<&str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect()
}

/// True when the words of `phrase` appear consecutively in `words`.
fn contains_phrase(words: &[&str], phrase: &str) -> bool {
    let needle: Vec<&str> = phrase.split_whitespace().collect();
    !needle.is_empty() && words.windows(needle.len()).any(|w| w == needle.as_slice())
}

/// Figures the answers are built from.
#[derive(Debug, Clone, PartialEq)]
pub struct AssistantContext {
    /// Statistics of the current month.
    pub stats: MonthlyStats,
    /// Recent monthly summaries, oldest first, ending with the current month.
    pub trends: Vec<MonthSummary>,
    /// Sum of the current month's budgets.
    pub month_budget: f64,
    pub today: NaiveDate,
    pub currency: String,
}

impl AssistantContext {
    /// Percentage of the month's budget already spent; 0 without a budget.
    pub fn budget_utilization(&self) -> f64 {
        if self.month_budget > 0.0 {
            self.stats.total_expenses / self.month_budget * 100.0
        } else {
            0.0
        }
    }

    fn days_left(&self) -> u32 {
        Period::of(self.today).days().saturating_sub(self.today.day())
    }

    fn money(&self, amount: f64) -> String {
        format!("{:.2} {}", amount, self.currency)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    pub topic: Topic,
    pub text: String,
}

/// Pick the topic for a question.
pub fn classify(question: &str) -> Topic {
    let question = question.to_lowercase();
    let words = words(&question);
    RULES
        .iter()
        .find(|rule| rule.matches(&words))
        .map(|rule| rule.topic)
        .unwrap_or(Topic::Help)
}

pub fn answer(question: &str, ctx: &AssistantContext) -> Answer {
    let topic = classify(question);
    let text = match topic {
        Topic::Savings => savings_advice(ctx),
        Topic::TopCategories => top_categories(ctx),
        Topic::BudgetStatus => budget_status(ctx),
        Topic::Advice => general_advice(),
        Topic::Simulation => simulate(ctx, first_number(question).unwrap_or(DEFAULT_SIMULATION)),
        Topic::Analysis => monthly_analysis(ctx),
        Topic::Help => help(),
    };
    Answer { topic, text }
}

/// The first run of ASCII digits in `text`.
fn first_number(text: &str) -> Option<u64> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let digits: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

// ---------------------------------------------------------------------------
// Responders
// ---------------------------------------------------------------------------

fn savings_advice(ctx: &AssistantContext) -> String {
    let Some(top) = ctx.stats.top_category() else {
        return "I need more data to give personalised advice. Keep recording your expenses \
                and ask me again."
            .to_string();
    };

    let name = top.name.to_lowercase();
    let tip = if name.contains("transport") {
        "Transport: car-pooling, public transport or cycling can cut these costs by 30-40%."
    } else if name.contains("food") {
        "Food: plan your meals, buy in bulk and eat out less to save 20-30%."
    } else if name.contains("leisure") {
        "Leisure: look for free activities and group discounts to halve this spending."
    } else {
        "Set a monthly limit for this category and track it closely."
    };

    format!(
        "Your most expensive category is {} ({}).\n{}\nCutting it by 25% would save {} a month.",
        top.name,
        ctx.money(top.total),
        tip,
        ctx.money(top.total * 0.25)
    )
}

fn top_categories(ctx: &AssistantContext) -> String {
    let ranked = ctx.stats.ranked_categories();
    if ranked.is_empty() {
        return "There is not enough data yet to compare your categories.".to_string();
    }

    let mut text = String::from("Your most expensive categories this month:\n");
    for (i, cat) in ranked.iter().take(3).enumerate() {
        let share = if ctx.stats.total_expenses > 0.0 {
            cat.total / ctx.stats.total_expenses * 100.0
        } else {
            0.0
        };
        text.push_str(&format!(
            "{}. {}: {} ({:.1}% of the total)\n",
            i + 1,
            cat.name,
            ctx.money(cat.total),
            share
        ));
    }
    text.push_str("Focus on the first one for the biggest impact on your budget.");
    text
}

fn budget_status(ctx: &AssistantContext) -> String {
    if ctx.month_budget <= 0.0 {
        return "You have not set a budget for this month yet.".to_string();
    }
    let spent = ctx.stats.total_expenses;
    let remaining = ctx.month_budget - spent;
    let utilization = ctx.budget_utilization();

    if utilization > 100.0 {
        format!(
            "Budget exceeded by {:.1}%.\nSpent: {}\nBudget: {}\nOverrun: {}\n\
             Stop non-essential spending for the rest of the month.",
            utilization - 100.0,
            ctx.money(spent),
            ctx.money(ctx.month_budget),
            ctx.money(-remaining)
        )
    } else if utilization > 80.0 {
        let days_left = ctx.days_left();
        let mut text = format!(
            "You have used {:.1}% of your budget.\nRemaining: {}\nDays left: {}",
            utilization,
            ctx.money(remaining),
            days_left
        );
        if days_left > 0 {
            text.push_str(&format!(
                "\nKeep daily spending under {}.",
                ctx.money(remaining / f64::from(days_left))
            ));
        }
        text
    } else {
        format!(
            "You are within budget.\nUsed: {:.1}%\nRemaining: {}",
            utilization,
            ctx.money(remaining)
        )
    }
}

fn general_advice() -> String {
    [
        "The 50/30/20 rule: 50% for needs, 30% for wants, 20% for savings.",
        "Record expenses daily and set budget alerts.",
        "Shop with a list and compare prices before buying.",
        "Use cash for small purchases and avoid overdrafts.",
    ]
    .join("\n")
}

fn simulate(ctx: &AssistantContext, amount: u64) -> String {
    let amount_f = amount as f64;
    let current = ctx.stats.total_expenses;
    let new_total = current + amount_f;
    let utilization = if ctx.month_budget > 0.0 {
        new_total / ctx.month_budget * 100.0
    } else {
        0.0
    };

    let mut text = format!(
        "Simulated expense: {}\nCurrent total: {}\nNew total: {}\n",
        ctx.money(amount_f),
        ctx.money(current),
        ctx.money(new_total)
    );
    if utilization > 100.0 {
        text.push_str(&format!(
            "This would exceed your budget by {:.1}% ({} over). Consider waiting until next month.",
            utilization - 100.0,
            ctx.money(new_total - ctx.month_budget)
        ));
    } else if utilization > 90.0 {
        text.push_str(&format!(
            "You would be at {:.1}% of your budget with {} left. Make sure the rest of the month is covered.",
            utilization,
            ctx.money(ctx.month_budget - new_total)
        ));
    } else if ctx.month_budget > 0.0 {
        text.push_str(&format!(
            "This expense is reasonable: {:.1}% of your budget used, {} left afterwards.",
            utilization,
            ctx.money(ctx.month_budget - new_total)
        ));
    } else {
        text.push_str("No budget is set for this month, so there is no limit to compare against.");
    }
    text
}

fn monthly_analysis(ctx: &AssistantContext) -> String {
    let stats = &ctx.stats;
    let mut text = format!(
        "Total spent: {}\nTransactions: {}\nAverage expense: {}\n",
        ctx.money(stats.total_expenses),
        stats.transaction_count,
        ctx.money(stats.average_expense)
    );

    if let [.., previous, current] = ctx.trends.as_slice() {
        if previous.total_expenses > 0.0 {
            let change = trend(current.total_expenses, Some(previous.total_expenses));
            text.push_str(&format!(
                "Compared with last month: spending {} {:.1}%.\n",
                direction_word(change.direction),
                change.percentage
            ));
        }
        if previous.transaction_count > 0 {
            let change = trend(
                current.transaction_count as f64,
                Some(previous.transaction_count as f64),
            );
            text.push_str(&format!(
                "Compared with last month: transactions {} {:.1}%.\n",
                direction_word(change.direction),
                change.percentage
            ));
        }
    }

    if let Some(top) = stats.top_category() {
        text.push_str(&format!("Main category: {} ({})\n", top.name, ctx.money(top.total)));
    }

    let utilization = ctx.budget_utilization();
    text.push_str(if utilization > 80.0 {
        "Be careful, your budget is almost used up."
    } else if utilization < 50.0 {
        "Well managed. You could put more aside this month."
    } else {
        "A good balance between spending and saving."
    });
    text
}

fn direction_word(direction: TrendDirection) -> &'static str {
    match direction {
        TrendDirection::Up => "up",
        TrendDirection::Down => "down",
        TrendDirection::Stable => "unchanged",
    }
}

fn help() -> String {
    "I can help with:\n\
     - savings advice\n\
     - your most expensive categories\n\
     - your budget status\n\
     - simulating an expense\n\
     - a monthly analysis\n\
     Try \"How can I save money?\" or \"Am I over budget?\""
        .to_string()
}
