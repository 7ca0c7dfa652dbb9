//! Full data export of one user as a JSON document.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::thread;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::info;

use crate::config::EXPORT_FILE_PREFIX;
use crate::error::Result;
use crate::models::{Budget, Category, Expense, User};
use crate::queries::{BudgetQuery, CategoryQuery, ExpenseQuery};
use crate::store::RemoteStore;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportProfile {
    pub email: Option<String>,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl ExportProfile {
    pub fn from_user(user: &User) -> Self {
        Self {
            email: user.email.clone(),
            name: user.user_metadata.name.clone(),
            phone: user.user_metadata.phone.clone(),
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub profile: ExportProfile,
    pub expenses: Vec<Expense>,
    pub categories: Vec<Category>,
    pub budgets: Vec<Budget>,
    pub export_date: DateTime<Utc>,
}

/// Gather the user's profile, expenses, categories and budgets.
pub fn build_export(store: &dyn RemoteStore, user: &User, now: DateTime<Utc>) -> Result<ExportDocument> {
    let user_id = user.id;
    let (expenses, categories, budgets) = thread::scope(|s| {
        let expenses = s.spawn(move || ExpenseQuery::new(store).list_all(user_id));
        let categories = s.spawn(move || CategoryQuery::new(store).list(user_id));
        let budgets = BudgetQuery::new(store).list_all(user_id);
        (
            expenses
                .join()
                .unwrap_or_else(|p| std::panic::resume_unwind(p)),
            categories
                .join()
                .unwrap_or_else(|p| std::panic::resume_unwind(p)),
            budgets,
        )
    });

    Ok(ExportDocument {
        profile: ExportProfile::from_user(user),
        expenses: expenses?,
        categories: categories?,
        budgets: budgets?,
        export_date: now,
    })
}

/// `fintrack-data-YYYY-MM-DD.json`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("{}{}.json", EXPORT_FILE_PREFIX, date.format("%Y-%m-%d"))
}

/// Write `doc` as pretty JSON into `dir` and return the file's path.
///
/// The document is written to a temporary file in the same directory and
/// renamed into place, so a reader never sees a partial export.
pub fn write_export(doc: &ExportDocument, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(doc.export_date.date_naive()));

    let mut tmp = NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&mut tmp, doc)?;
    tmp.write_all(b"\n")?;
    tmp.flush()?;
    tmp.persist(&path).map_err(|e| e.error)?;

    info!(path = %path.display(), expenses = doc.expenses.len(), "export written");
    Ok(path)
}
