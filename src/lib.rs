//! FinTrack SDK for Rust.
//!
//! Client for a personal-finance tracker hosted on a backend-as-a-service
//! (a PostgREST data API plus a GoTrue auth API). Users record expenses
//! against categories, set monthly budgets per category and get aggregate
//! analyses; the SDK fetches the rows and computes the figures a dashboard
//! shows.
//!
//! # Quick start
//!
//! ```no_run
//! use fintrack_sdk::{FinTrack, Period};
//!
//! let ft = FinTrack::builder()
//!     .url("https://project.supabase.co")
//!     .anon_key("public-anon-key")
//!     .build()
//!     .unwrap();
//!
//! ft.auth().sign_in("me@example.com", "secret123").unwrap();
//! let user = ft.require_user().unwrap();
//!
//! let data = ft.stats().load_period(user.id, Period::current()).unwrap();
//! println!("spent {:.2}", data.stats().total_expenses);
//! ```

pub mod alerts;
pub mod analytics;
pub mod assistant;
#[cfg(feature = "async")]
pub mod async_client;
pub mod auth;
pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod notify;
pub mod queries;
pub mod query;
pub mod routes;
pub mod store;

#[cfg(feature = "async")]
pub use async_client::AsyncFinTrack;
pub use auth::{AuthClient, AuthEvent, AuthProvider, SessionHub, Subscription};
pub use config::Config;
pub use error::{FinTrackError, Result};
pub use models::Period;
pub use query::{Query, QueryBuilder};
pub use store::{MemoryStore, RemoteStore, RestStore};

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Once};
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::alerts::SmartAlert;
use crate::assistant::{Answer, AssistantContext};
use crate::auth::GoTrueAuth;
use crate::export::ExportDocument;
use crate::models::User;

/// Number of months of history the assistant compares against.
const ASSISTANT_TREND_MONTHS: usize = 3;

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber honouring `RUST_LOG`, with this crate at
/// `info` by default. Safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let mut filter = EnvFilter::from_default_env();
        if let Ok(directive) = "fintrack_sdk=info".parse() {
            filter = filter.add_directive(directive);
        }
        let _ = fmt().with_env_filter(filter).try_init();
    });
}

// ---------------------------------------------------------------------------
// FinTrackBuilder
// ---------------------------------------------------------------------------

/// Builder for a [`FinTrack`] client.
///
/// Use [`FinTrack::builder()`] to obtain one. Settings start from
/// [`Config::default`]; [`Config::load`] reads them from the config file and
/// environment instead.
#[derive(Default)]
pub struct FinTrackBuilder {
    config: Config,
    store: Option<Arc<dyn RemoteStore>>,
    auth_provider: Option<Arc<dyn AuthProvider>>,
    sessions: Option<Arc<SessionHub>>,
}

impl FinTrackBuilder {
    /// Replace every setting at once.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Project base URL, e.g. `https://xyz.supabase.co`.
    pub fn url(mut self, url: &str) -> Self {
        self.config.url = url.to_string();
        self
    }

    pub fn anon_key(mut self, key: &str) -> Self {
        self.config.anon_key = key.to_string();
        self
    }

    /// HTTP request timeout. Defaults to 30 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Wait between current-user lookup attempts. Defaults to 500 ms.
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.config.retry_delay = delay;
        self
    }

    /// Current-user lookup attempts. Defaults to 2.
    pub fn retry_attempts(mut self, attempts: u32) -> Self {
        self.config.retry_attempts = attempts;
        self
    }

    pub fn currency(mut self, currency: &str) -> Self {
        self.config.currency = currency.to_string();
        self
    }

    /// Use a custom data store instead of the HTTP one.
    pub fn store(mut self, store: Arc<dyn RemoteStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Use a custom auth provider instead of the HTTP one.
    pub fn auth_provider(mut self, provider: Arc<dyn AuthProvider>) -> Self {
        self.auth_provider = Some(provider);
        self
    }

    /// Session holder to use. Defaults to [`SessionHub::global`].
    pub fn sessions(mut self, sessions: Arc<SessionHub>) -> Self {
        self.sessions = Some(sessions);
        self
    }

    /// Build the client.
    ///
    /// The URL and anon key are only required for the HTTP-backed parts
    /// that were not replaced.
    pub fn build(self) -> Result<FinTrack> {
        let config = self.config;
        let sessions = self.sessions.unwrap_or_else(SessionHub::global);

        let store: Arc<dyn RemoteStore> = match self.store {
            Some(store) => store,
            None => {
                config.validate()?;
                Arc::new(RestStore::new(&config, sessions.clone())?)
            }
        };
        let provider: Arc<dyn AuthProvider> = match self.auth_provider {
            Some(provider) => provider,
            None => {
                config.validate()?;
                Arc::new(GoTrueAuth::new(&config)?)
            }
        };
        let auth = AuthClient::new(provider, sessions.clone())
            .with_retry(config.retry_attempts, config.retry_delay);

        Ok(FinTrack {
            config,
            store,
            auth,
            sessions,
        })
    }
}

// ---------------------------------------------------------------------------
// FinTrack
// ---------------------------------------------------------------------------

/// The main entry point of the SDK.
///
/// Owns the data store and the auth client, and hands out lightweight query
/// interfaces that borrow the store.
pub struct FinTrack {
    config: Config,
    store: Arc<dyn RemoteStore>,
    auth: AuthClient,
    sessions: Arc<SessionHub>,
}

impl FinTrack {
    pub fn builder() -> FinTrackBuilder {
        FinTrackBuilder::default()
    }

    // -- Query accessors ---------------------------------------------------

    pub fn categories(&self) -> queries::CategoryQuery<'_> {
        queries::CategoryQuery::new(self.store.as_ref())
    }

    pub fn expenses(&self) -> queries::ExpenseQuery<'_> {
        queries::ExpenseQuery::new(self.store.as_ref())
    }

    pub fn budgets(&self) -> queries::BudgetQuery<'_> {
        queries::BudgetQuery::new(self.store.as_ref())
    }

    /// Statistics and the combined period loader.
    pub fn stats(&self) -> queries::StatsQuery<'_> {
        queries::StatsQuery::new(self.store.as_ref())
    }

    // -- Session -----------------------------------------------------------

    pub fn auth(&self) -> &AuthClient {
        &self.auth
    }

    pub fn sessions(&self) -> &Arc<SessionHub> {
        &self.sessions
    }

    /// The signed-in user, looked up with retries; `None` when signed out.
    pub fn current_user(&self) -> Option<User> {
        self.auth.current_user()
    }

    pub fn require_user(&self) -> Result<User> {
        self.auth.require_user()
    }

    fn user_id(&self) -> Result<Uuid> {
        Ok(self.require_user()?.id)
    }

    // -- Features built on the accessors -----------------------------------

    /// Alerts for the signed-in user on `today`.
    pub fn alerts(&self, today: NaiveDate, dismissed: &HashSet<String>) -> Result<Vec<SmartAlert>> {
        let user_id = self.user_id()?;
        let stats = self.stats().monthly_stats(user_id, Period::of(today))?;
        let trends = self.stats().monthly_trends(user_id, 2, today)?;
        Ok(alerts::smart_alerts(
            &stats,
            &trends,
            today,
            &self.config.currency,
            dismissed,
        ))
    }

    /// Figures the assistant answers from, for the month of `today`.
    pub fn assistant_context(&self, today: NaiveDate) -> Result<AssistantContext> {
        let user_id = self.user_id()?;
        let data = self.stats().load_period(user_id, Period::of(today))?;
        let trends = self
            .stats()
            .monthly_trends(user_id, ASSISTANT_TREND_MONTHS, today)?;
        Ok(AssistantContext {
            stats: data.stats(),
            trends,
            month_budget: data.budgets.iter().map(|b| b.amount).sum(),
            today,
            currency: self.config.currency.clone(),
        })
    }

    pub fn ask(&self, question: &str, today: NaiveDate) -> Result<Answer> {
        let ctx = self.assistant_context(today)?;
        Ok(assistant::answer(question, &ctx))
    }

    /// Everything stored for the signed-in user.
    pub fn export(&self) -> Result<ExportDocument> {
        let user = self.require_user()?;
        export::build_export(self.store.as_ref(), &user, Utc::now())
    }

    /// Delete the signed-in user's account and all of its data, then sign
    /// out.
    pub fn delete_account(&self) -> Result<()> {
        let user = self.require_user()?;
        self.store.rpc("delete_user_account", json!({}))?;
        info!(user = %user.id, "account deleted");
        self.auth.sign_out()
    }

    // -- Utility -----------------------------------------------------------

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The underlying data store, for queries not covered by the accessors.
    pub fn store(&self) -> &dyn RemoteStore {
        self.store.as_ref()
    }
}

impl fmt::Display for FinTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let user = self
            .sessions
            .user()
            .and_then(|u| u.email)
            .unwrap_or_else(|| "-".to_string());
        write!(
            f,
            "FinTrack(url={}, currency={}, user={})",
            if self.config.url.is_empty() { "-" } else { self.config.url.as_str() },
            self.config.currency,
            user
        )
    }
}
