//! Async wrapper around [`FinTrack`] for use inside Tokio.
//!
//! Operations run on the blocking thread pool via
//! [`tokio::task::spawn_blocking`], so the event loop is never blocked on
//! HTTP. Independent fetches are awaited together.
//!
//! # Example
//!
//! ```no_run
//! use fintrack_sdk::{AsyncFinTrack, FinTrack, Period};
//!
//! #[tokio::main]
//! async fn main() -> fintrack_sdk::Result<()> {
//!     let ft = AsyncFinTrack::build(
//!         FinTrack::builder()
//!             .url("https://project.supabase.co")
//!             .anon_key("public-anon-key"),
//!     )
//!     .await?;
//!
//!     let user = ft.run(|s| s.require_user()).await?;
//!     let data = ft.load_period(user.id, Period::current()).await?;
//!     println!("{} expenses", data.expenses.len());
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use uuid::Uuid;

use crate::error::{FinTrackError, Result};
use crate::export::ExportDocument;
use crate::models::{MonthlyStats, Period, User};
use crate::queries::PeriodData;
use crate::{FinTrack, FinTrackBuilder};

/// Async wrapper around [`FinTrack`].
///
/// Cloning is cheap; clones share the same client.
#[derive(Clone)]
pub struct AsyncFinTrack {
    inner: Arc<FinTrack>,
}

impl From<FinTrack> for AsyncFinTrack {
    fn from(sdk: FinTrack) -> Self {
        Self {
            inner: Arc::new(sdk),
        }
    }
}

impl AsyncFinTrack {
    /// Build the client on the blocking pool; the HTTP client must not be
    /// constructed on an async worker thread.
    pub async fn build(builder: FinTrackBuilder) -> Result<AsyncFinTrack> {
        tokio::task::spawn_blocking(move || builder.build().map(AsyncFinTrack::from))
            .await
            .map_err(join_error)?
    }

    /// Run a sync SDK operation on the blocking thread pool.
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&FinTrack) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let sdk = self.inner.clone();
        tokio::task::spawn_blocking(move || f(&sdk))
            .await
            .map_err(join_error)?
    }

    pub fn blocking(&self) -> &FinTrack {
        &self.inner
    }

    pub async fn current_user(&self) -> Result<Option<User>> {
        self.run(|s| Ok(s.current_user())).await
    }

    pub async fn monthly_stats(&self, user_id: Uuid, period: Period) -> Result<MonthlyStats> {
        self.run(move |s| s.stats().monthly_stats(user_id, period))
            .await
    }

    /// Categories (with default seeding), budgets and expenses of a month,
    /// fetched concurrently.
    pub async fn load_period(&self, user_id: Uuid, period: Period) -> Result<PeriodData> {
        let (categories, budgets, expenses) = tokio::try_join!(
            self.run(move |s| s.categories().ensure_defaults(user_id)),
            self.run(move |s| s.budgets().list_for_period(user_id, period)),
            self.run(move |s| s.expenses().list_for_month(user_id, period)),
        )?;
        Ok(PeriodData {
            period,
            categories,
            budgets,
            expenses,
        })
    }

    pub async fn export(&self) -> Result<ExportDocument> {
        self.run(|s| s.export()).await
    }
}

fn join_error(e: tokio::task::JoinError) -> FinTrackError {
    FinTrackError::InvalidArgument(format!("Task join error: {e}"))
}
