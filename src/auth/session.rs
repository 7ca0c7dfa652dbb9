//! Process-wide session state with change notifications.
//!
//! One [`SessionHub`] is created at application start (see
//! [`SessionHub::global`]). Views read the current user from it and
//! [`subscribe`](SessionHub::subscribe) to auth events; the returned
//! [`Subscription`] unsubscribes when dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock, Weak};

use once_cell::sync::OnceCell;
use tracing::{debug, info};

use crate::models::{Session, User};

static GLOBAL: OnceCell<Arc<SessionHub>> = OnceCell::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthEvent {
    InitialSession,
    SignedIn,
    SignedOut,
    TokenRefreshed,
    UserUpdated,
    PasswordRecovery,
}

impl AuthEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthEvent::InitialSession => "INITIAL_SESSION",
            AuthEvent::SignedIn => "SIGNED_IN",
            AuthEvent::SignedOut => "SIGNED_OUT",
            AuthEvent::TokenRefreshed => "TOKEN_REFRESHED",
            AuthEvent::UserUpdated => "USER_UPDATED",
            AuthEvent::PasswordRecovery => "PASSWORD_RECOVERY",
        }
    }
}

pub type Listener = Arc<dyn Fn(AuthEvent, Option<&Session>) + Send + Sync>;

#[derive(Default)]
pub struct SessionHub {
    session: RwLock<Option<Session>>,
    listeners: Mutex<Vec<(u64, Listener)>>,
    next_id: AtomicU64,
}

impl SessionHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide hub, created on first access.
    pub fn global() -> Arc<SessionHub> {
        GLOBAL
            .get_or_init(|| {
                debug!("session hub initialised");
                Arc::new(SessionHub::new())
            })
            .clone()
    }

    pub fn session(&self) -> Option<Session> {
        self.session
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn user(&self) -> Option<User> {
        self.session().map(|s| s.user)
    }

    pub fn access_token(&self) -> Option<String> {
        self.session
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|s| s.access_token.clone())
    }

    pub fn is_signed_in(&self) -> bool {
        self.session
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    /// Replace the stored session and notify every listener.
    ///
    /// `SignedOut` always clears the session, whatever `session` holds.
    pub fn publish(&self, event: AuthEvent, session: Option<Session>) {
        let session = if event == AuthEvent::SignedOut { None } else { session };
        info!(
            event = event.as_str(),
            user = session
                .as_ref()
                .and_then(|s| s.user.email.as_deref())
                .unwrap_or("-"),
            "auth state change"
        );
        *self.session.write().unwrap_or_else(|e| e.into_inner()) = session.clone();

        // Listeners run outside the lock so they may subscribe or unsubscribe.
        let listeners: Vec<Listener> = self
            .listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(_, l)| l.clone())
            .collect();
        for listener in listeners {
            listener(event, session.as_ref());
        }
    }

    /// Register a listener for auth events.
    pub fn subscribe<F>(self: &Arc<Self>, listener: F) -> Subscription
    where
        F: Fn(AuthEvent, Option<&Session>) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((id, Arc::new(listener)));
        Subscription {
            hub: Arc::downgrade(self),
            id,
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    fn remove(&self, id: u64) {
        self.listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .retain(|(lid, _)| *lid != id);
    }
}

/// Handle for a registered listener; dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    hub: Weak<SessionHub>,
    id: u64,
}

impl Subscription {
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            hub.remove(self.id);
        }
    }
}
