//! Command-line access to a FinTrack account.
//!
//! ```text
//! fintrack report [YYYY-MM]
//! fintrack budgets [YYYY-MM]
//! fintrack export [DIR]
//! fintrack ask <question...>
//! ```
//!
//! Connection settings come from the config file or `FINTRACK_URL` /
//! `FINTRACK_ANON_KEY`; credentials from `FINTRACK_EMAIL` /
//! `FINTRACK_PASSWORD`.

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Local;

use fintrack_sdk::models::{BudgetState, MonthlyStats};
use fintrack_sdk::notify::{self, LogNotifier};
use fintrack_sdk::{Config, FinTrack, FinTrackError, Period, Result, SessionHub};

const USAGE: &str = "usage: fintrack <report [YYYY-MM] | budgets [YYYY-MM] | export [DIR] | ask QUESTION>";

enum Command {
    Report(Period),
    Budgets(Period),
    Export(PathBuf),
    Ask(String),
}

fn main() -> ExitCode {
    fintrack_sdk::init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match parse(&args) {
        Ok(Some(command)) => command,
        Ok(None) => {
            eprintln!("{}", USAGE);
            return ExitCode::from(2);
        }
        Err(e) => {
            eprintln!("{}\n{}", e.user_message(), USAGE);
            return ExitCode::from(2);
        }
    };

    let notifier = LogNotifier;
    let Some(ft) = notify::report(&notifier, connect(), "Signed in", "Could not sign in") else {
        return ExitCode::FAILURE;
    };

    let done = match command {
        Command::Report(period) => notify::report(
            &notifier,
            report(&ft, period),
            "Report ready",
            "Could not load the report",
        ),
        Command::Budgets(period) => notify::report(
            &notifier,
            budgets(&ft, period),
            "Budgets loaded",
            "Could not load the budgets",
        ),
        Command::Export(dir) => notify::report(
            &notifier,
            export(&ft, &dir),
            "Export written",
            "Could not export your data",
        ),
        Command::Ask(question) => notify::report(
            &notifier,
            ask(&ft, &question),
            "Answered",
            "The assistant could not answer",
        ),
    };
    if done.is_some() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn parse(args: &[String]) -> Result<Option<Command>> {
    let Some(command) = args.first() else {
        return Ok(None);
    };
    let rest = &args[1..];
    let command = match command.as_str() {
        "report" => Command::Report(period_arg(rest)?),
        "budgets" => Command::Budgets(period_arg(rest)?),
        "export" => Command::Export(
            rest.first()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
        ),
        "ask" if !rest.is_empty() => Command::Ask(rest.join(" ")),
        _ => return Ok(None),
    };
    Ok(Some(command))
}

/// Build a client on the global session hub and sign in.
fn connect() -> Result<FinTrack> {
    let ft = FinTrack::builder()
        .config(Config::load()?)
        .sessions(SessionHub::global())
        .build()?;
    let var = |name: &str| {
        std::env::var(name).map_err(|_| FinTrackError::Config(format!("{} is not set", name)))
    };
    ft.auth()
        .sign_in(&var("FINTRACK_EMAIL")?, &var("FINTRACK_PASSWORD")?)?;
    Ok(ft)
}

fn export(ft: &FinTrack, dir: &std::path::Path) -> Result<()> {
    let doc = ft.export()?;
    let path = fintrack_sdk::export::write_export(&doc, dir)?;
    println!("{}", path.display());
    Ok(())
}

fn ask(ft: &FinTrack, question: &str) -> Result<()> {
    let answer = ft.ask(question, Local::now().date_naive())?;
    println!("{}", answer.text);
    Ok(())
}

fn period_arg(rest: &[String]) -> Result<Period> {
    match rest.first() {
        Some(s) => Period::parse(s),
        None => Ok(Period::current()),
    }
}

fn report(ft: &FinTrack, period: Period) -> Result<()> {
    let user = ft.require_user()?;
    let stats: MonthlyStats = ft.stats().monthly_stats(user.id, period)?;
    let currency = &ft.config().currency;

    println!("{}", period);
    println!("  total        {:>12.2} {}", stats.total_expenses, currency);
    println!("  transactions {:>12}", stats.transaction_count);
    println!("  average      {:>12.2} {}", stats.average_expense, currency);
    for cat in stats.ranked_categories() {
        println!(
            "  {} {:<14} {:>10.2} ({})",
            cat.icon.as_deref().unwrap_or(" "),
            cat.name,
            cat.total,
            cat.count
        );
    }
    Ok(())
}

fn budgets(ft: &FinTrack, period: Period) -> Result<()> {
    let user = ft.require_user()?;
    let data = ft.stats().load_period(user.id, period)?;
    let reports = data.budget_reports();
    if reports.is_empty() {
        println!("no budgets for {}", period);
        return Ok(());
    }

    for report in &reports {
        let name = report
            .budget
            .category
            .as_ref()
            .map(|c| c.name.as_str())
            .unwrap_or("?");
        let marker = match report.state {
            BudgetState::Exceeded => "EXCEEDED",
            BudgetState::Alert => "alert",
            BudgetState::Attention => "attention",
            BudgetState::Normal => "",
        };
        println!(
            "{:<14} {:>10.2} / {:>10.2} {:>6.1}% {}",
            name,
            report.status.total_spent,
            report.budget.amount,
            report.status.percentage_used,
            marker
        );
    }
    let overview = data.budget_overview();
    println!(
        "{:<14} {:>10.2} / {:>10.2} {:>6.1}%",
        "total", overview.total_spent, overview.total_budget, overview.percentage_used
    );
    Ok(())
}
