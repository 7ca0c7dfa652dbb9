//! Shared fixtures for the FinTrack SDK integration tests.
//!
//! Everything runs in process: data goes through a [`MemoryStore`] and auth
//! through [`FakeAuth`], and each client gets its own [`SessionHub`].

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use fintrack_sdk::auth::{AuthProvider, SignUp, UserUpdate};
use fintrack_sdk::models::{Budget, Category, Expense, Session, User, UserMetadata};
use fintrack_sdk::{FinTrack, FinTrackError, MemoryStore, Result, SessionHub};
use serde_json::json;
use uuid::Uuid;

pub const EMAIL: &str = "ada@example.com";
pub const PASSWORD: &str = "secret123";

pub fn user_id() -> Uuid {
    Uuid::from_u128(0xA11CE)
}

pub fn other_user_id() -> Uuid {
    Uuid::from_u128(0xB0B)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn test_user(id: Uuid, email: &str) -> User {
    User {
        id,
        email: Some(email.to_string()),
        created_at: Some(Utc::now()),
        user_metadata: UserMetadata {
            name: Some("Ada".to_string()),
            ..UserMetadata::default()
        },
    }
}

pub fn session_for(user: &User, expires_in_secs: i64) -> Session {
    Session {
        access_token: format!("token-{}", user.id),
        refresh_token: Some(format!("refresh-{}", user.id)),
        expires_at: Some(Utc::now() + chrono::Duration::seconds(expires_in_secs)),
        user: user.clone(),
    }
}

// ---------------------------------------------------------------------------
// FakeAuth
// ---------------------------------------------------------------------------

/// In-memory auth provider with counters for the calls tests care about.
#[derive(Default)]
pub struct FakeAuth {
    users: Mutex<HashMap<String, (String, User)>>,
    /// Number of upcoming `get_user` calls that fail.
    pub get_user_failures: AtomicU32,
    pub get_user_calls: AtomicU32,
    pub refresh_calls: AtomicU32,
    pub sign_out_calls: AtomicU32,
    pub require_confirmation: std::sync::atomic::AtomicBool,
    pub reset_emails: Mutex<Vec<String>>,
    pub updates: Mutex<Vec<UserUpdate>>,
}

impl FakeAuth {
    pub fn with_user(user: User, password: &str) -> Arc<Self> {
        let auth = Arc::new(FakeAuth::default());
        auth.add_user(user, password);
        auth
    }

    pub fn add_user(&self, user: User, password: &str) {
        let email = user.email.clone().unwrap_or_default();
        self.users
            .lock()
            .unwrap()
            .insert(email, (password.to_string(), user));
    }

    fn user_for_token(&self, token: &str) -> Option<User> {
        self.users
            .lock()
            .unwrap()
            .values()
            .map(|(_, u)| u.clone())
            .find(|u| token == format!("token-{}", u.id) || token == format!("refresh-{}", u.id))
    }
}

impl AuthProvider for FakeAuth {
    fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &UserMetadata,
        _redirect_to: Option<&str>,
    ) -> Result<SignUp> {
        if self.users.lock().unwrap().contains_key(email) {
            return Err(FinTrackError::remote(422, None, "User already registered"));
        }
        let mut user = test_user(Uuid::new_v4(), email);
        user.user_metadata = metadata.clone();
        self.add_user(user.clone(), password);
        if self.require_confirmation.load(Ordering::SeqCst) {
            Ok(SignUp::ConfirmationRequired(user))
        } else {
            Ok(SignUp::SignedIn(session_for(&user, 3600)))
        }
    }

    fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session> {
        match self.users.lock().unwrap().get(email) {
            Some((pw, user)) if pw == password => Ok(session_for(user, 3600)),
            _ => Err(FinTrackError::remote(
                400,
                Some("invalid_credentials".into()),
                "Invalid login credentials",
            )),
        }
    }

    fn authorize_url(&self, provider: &str, redirect_to: &str) -> Result<String> {
        Ok(format!(
            "https://auth.test/authorize?provider={}&redirect_to={}",
            provider, redirect_to
        ))
    }

    fn refresh_session(&self, refresh_token: &str) -> Result<Session> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        self.user_for_token(refresh_token)
            .map(|u| session_for(&u, 3600))
            .ok_or_else(|| FinTrackError::remote(400, None, "Invalid Refresh Token"))
    }

    fn reset_password_for_email(&self, email: &str, _redirect_to: &str) -> Result<()> {
        self.reset_emails.lock().unwrap().push(email.to_string());
        Ok(())
    }

    fn get_user(&self, access_token: &str) -> Result<Option<User>> {
        self.get_user_calls.fetch_add(1, Ordering::SeqCst);
        let pending = self.get_user_failures.load(Ordering::SeqCst);
        if pending > 0 {
            self.get_user_failures.store(pending - 1, Ordering::SeqCst);
            return Err(FinTrackError::remote(503, None, "auth service unavailable"));
        }
        Ok(self.user_for_token(access_token))
    }

    fn update_user(&self, access_token: &str, update: &UserUpdate) -> Result<User> {
        self.updates.lock().unwrap().push(update.clone());
        let mut users = self.users.lock().unwrap();
        let entry = users
            .values_mut()
            .find(|(_, u)| access_token == format!("token-{}", u.id))
            .ok_or_else(|| FinTrackError::remote(401, None, "invalid JWT"))?;
        if let Some(password) = &update.password {
            entry.0 = password.clone();
        }
        if let Some(data) = &update.data {
            entry.1.user_metadata = data.clone();
        }
        Ok(entry.1.clone())
    }

    fn sign_out(&self, _access_token: &str) -> Result<()> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Clients
// ---------------------------------------------------------------------------

pub struct Fixture {
    pub ft: FinTrack,
    pub store: Arc<MemoryStore>,
    pub auth: Arc<FakeAuth>,
    pub sessions: Arc<SessionHub>,
}

/// A client over `store` with the default test user registered but not
/// signed in.
pub fn fixture_with(store: MemoryStore) -> Fixture {
    let store = Arc::new(store);
    let auth = FakeAuth::with_user(test_user(user_id(), EMAIL), PASSWORD);
    let sessions = Arc::new(SessionHub::new());
    let ft = FinTrack::builder()
        .store(store.clone())
        .auth_provider(auth.clone())
        .sessions(sessions.clone())
        .retry_delay(Duration::from_millis(1))
        .build()
        .unwrap();
    Fixture {
        ft,
        store,
        auth,
        sessions,
    }
}

pub fn fixture() -> Fixture {
    fixture_with(MemoryStore::new())
}

/// Like [`fixture`], with the test user signed in.
pub fn signed_in() -> Fixture {
    let fx = fixture();
    fx.ft.auth().sign_in(EMAIL, PASSWORD).unwrap();
    fx
}

// ---------------------------------------------------------------------------
// Row seeding
// ---------------------------------------------------------------------------

fn id_of(row: &serde_json::Value) -> Uuid {
    row["id"].as_str().unwrap().parse().unwrap()
}

pub fn seed_category(store: &MemoryStore, user: Uuid, name: &str) -> Uuid {
    let rows = store
        .seed(
            "categories",
            vec![json!({ "user_id": user, "name": name, "color": "#123456", "icon": "*" })],
        )
        .unwrap();
    id_of(&rows[0])
}

pub fn seed_expense(
    store: &MemoryStore,
    user: Uuid,
    category: Uuid,
    amount: f64,
    day: &str,
    description: &str,
) -> Uuid {
    let rows = store
        .seed(
            "expenses",
            vec![json!({
                "user_id": user,
                "category_id": category,
                "amount": amount,
                "description": description,
                "expense_date": day,
            })],
        )
        .unwrap();
    id_of(&rows[0])
}

pub fn seed_budget(
    store: &MemoryStore,
    user: Uuid,
    category: Uuid,
    amount: f64,
    year: i32,
    month: u32,
) -> Uuid {
    let rows = store
        .seed(
            "budgets",
            vec![json!({
                "user_id": user,
                "category_id": category,
                "amount": amount,
                "year": year,
                "month": month,
            })],
        )
        .unwrap();
    id_of(&rows[0])
}

// ---------------------------------------------------------------------------
// Plain records for the pure aggregation tests
// ---------------------------------------------------------------------------

pub fn category(id: u128, name: &str) -> Category {
    Category {
        id: Uuid::from_u128(id),
        user_id: user_id(),
        name: name.to_string(),
        color: Some("#000000".to_string()),
        icon: None,
        created_at: None,
    }
}

pub fn expense(category: u128, amount: f64, day: NaiveDate) -> Expense {
    Expense {
        id: Uuid::new_v4(),
        user_id: user_id(),
        category_id: Uuid::from_u128(category),
        amount,
        description: String::new(),
        expense_date: day,
        created_at: None,
        category: None,
    }
}

pub fn budget(category: u128, amount: f64, threshold: Option<f64>, year: i32, month: u32) -> Budget {
    Budget {
        id: Uuid::new_v4(),
        user_id: user_id(),
        category_id: Uuid::from_u128(category),
        amount,
        alert_threshold: threshold,
        year,
        month,
        created_at: None,
        category: None,
    }
}
