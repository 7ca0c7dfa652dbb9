use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::{AuthEvent, AuthProvider, SessionHub, SignUp, UserUpdate};
use crate::config::{DEFAULT_RETRY_ATTEMPTS, DEFAULT_RETRY_DELAY};
use crate::error::{FinTrackError, Result};
use crate::models::{Session, User, UserMetadata};

pub const MIN_PASSWORD_LEN: usize = 6;

/// Auth flows that keep the [`SessionHub`] in step with the auth API.
pub struct AuthClient {
    provider: Arc<dyn AuthProvider>,
    sessions: Arc<SessionHub>,
    retry_attempts: u32,
    retry_delay: Duration,
}

impl AuthClient {
    pub fn new(provider: Arc<dyn AuthProvider>, sessions: Arc<SessionHub>) -> Self {
        Self {
            provider,
            sessions,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    /// Override the current-user lookup retry policy.
    pub fn with_retry(mut self, attempts: u32, delay: Duration) -> Self {
        self.retry_attempts = attempts.max(1);
        self.retry_delay = delay;
        self
    }

    pub fn sessions(&self) -> &Arc<SessionHub> {
        &self.sessions
    }

    // -----------------------------------------------------------------------
    // Sign-up / sign-in / sign-out
    // -----------------------------------------------------------------------

    pub fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &UserMetadata,
        redirect_to: Option<&str>,
    ) -> Result<SignUp> {
        validate_email(email)?;
        validate_password(password)?;
        let outcome = self.provider.sign_up(email, password, metadata, redirect_to)?;
        match &outcome {
            SignUp::SignedIn(session) => {
                self.sessions.publish(AuthEvent::SignedIn, Some(session.clone()))
            }
            SignUp::ConfirmationRequired(_) => {
                info!(email, "sign-up awaiting email confirmation")
            }
        }
        Ok(outcome)
    }

    pub fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        validate_email(email)?;
        let session = self.provider.sign_in_with_password(email, password)?;
        self.sessions.publish(AuthEvent::SignedIn, Some(session.clone()));
        Ok(session)
    }

    /// URL that starts a third-party sign-in; the provider redirects back
    /// to `redirect_to` (normally `/auth/callback`).
    pub fn provider_sign_in_url(&self, provider: &str, redirect_to: &str) -> Result<String> {
        self.provider.authorize_url(provider, redirect_to)
    }

    /// Install a session obtained outside the password flow, such as the
    /// tokens handed to the OAuth callback.
    pub fn restore_session(&self, session: Session) {
        self.sessions.publish(AuthEvent::InitialSession, Some(session));
    }

    /// Install the session carried by a password-recovery link. Listeners
    /// see [`AuthEvent::PasswordRecovery`] and the user can then call
    /// [`update_password`](Self::update_password).
    pub fn begin_password_recovery(&self, session: Session) {
        self.sessions
            .publish(AuthEvent::PasswordRecovery, Some(session));
    }

    /// Sign out remotely and clear the local session.
    ///
    /// The local session is cleared even when the remote call fails; the
    /// remote error is still returned.
    pub fn sign_out(&self) -> Result<()> {
        let remote = match self.sessions.access_token() {
            Some(token) => self.provider.sign_out(&token),
            None => Ok(()),
        };
        self.sessions.publish(AuthEvent::SignedOut, None);
        remote
    }

    // -----------------------------------------------------------------------
    // Session and user lookup
    // -----------------------------------------------------------------------

    /// The current session, refreshed first if it has expired.
    ///
    /// An expired session without a refresh token is dropped.
    pub fn session(&self) -> Result<Option<Session>> {
        let Some(session) = self.sessions.session() else {
            return Ok(None);
        };
        if !session.is_expired() {
            return Ok(Some(session));
        }
        match session.refresh_token.as_deref() {
            Some(refresh) => {
                debug!("refreshing expired session");
                let fresh = self.provider.refresh_session(refresh)?;
                self.sessions
                    .publish(AuthEvent::TokenRefreshed, Some(fresh.clone()));
                Ok(Some(fresh))
            }
            None => {
                self.sessions.publish(AuthEvent::SignedOut, None);
                Ok(None)
            }
        }
    }

    /// Look up the signed-in user.
    ///
    /// A valid (or refreshable) session answers directly. When reading the
    /// session fails, the auth API is asked for the stored token's user; a
    /// failed attempt waits the fixed retry delay before the next one, and
    /// when every attempt fails the answer is "no user".
    pub fn current_user(&self) -> Option<User> {
        let attempts = self.retry_attempts.max(1);
        for attempt in 1..=attempts {
            match self.session() {
                Ok(session) => return session.map(|s| s.user),
                Err(e) => warn!(attempt, error = %e, "session lookup failed"),
            }

            let token = self.sessions.access_token()?;
            match self.provider.get_user(&token) {
                Ok(user) => return user,
                Err(e) => warn!(attempt, error = %e, "user lookup failed"),
            }
            if attempt < attempts {
                thread::sleep(self.retry_delay);
            }
        }
        None
    }

    /// Like [`current_user`](Self::current_user) but fails with
    /// [`FinTrackError::Unauthenticated`].
    pub fn require_user(&self) -> Result<User> {
        self.current_user().ok_or(FinTrackError::Unauthenticated)
    }

    fn access_token(&self) -> Result<String> {
        self.session()?
            .map(|s| s.access_token)
            .ok_or(FinTrackError::Unauthenticated)
    }

    // -----------------------------------------------------------------------
    // Password reset and account settings
    // -----------------------------------------------------------------------

    pub fn reset_password(&self, email: &str, redirect_to: &str) -> Result<()> {
        validate_email(email)?;
        self.provider.reset_password_for_email(email, redirect_to)
    }

    /// Set a new password for the signed-in user (also used after a
    /// password-recovery link).
    pub fn update_password(&self, password: &str, confirmation: &str) -> Result<User> {
        validate_password(password)?;
        if password != confirmation {
            return Err(FinTrackError::Validation(
                "Passwords do not match".to_string(),
            ));
        }
        self.update_user(UserUpdate {
            password: Some(password.to_string()),
            ..UserUpdate::default()
        })
    }

    /// Replace the profile metadata (name, phone, currency, language).
    pub fn update_profile(&self, metadata: UserMetadata) -> Result<User> {
        self.update_user(UserUpdate {
            data: Some(metadata),
            ..UserUpdate::default()
        })
    }

    fn update_user(&self, update: UserUpdate) -> Result<User> {
        let token = self.access_token()?;
        let user = self.provider.update_user(&token, &update)?;
        if let Some(mut session) = self.sessions.session() {
            session.user = user.clone();
            self.sessions.publish(AuthEvent::UserUpdated, Some(session));
        }
        Ok(user)
    }
}

fn validate_email(email: &str) -> Result<()> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(FinTrackError::Validation(format!(
            "Invalid email address: {}",
            email
        ))),
    }
}

fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(FinTrackError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}
