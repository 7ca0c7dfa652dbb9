//! Authentication against the hosted auth API and process-wide session state.

pub mod client;
pub mod gotrue;
pub mod session;

pub use client::AuthClient;
pub use gotrue::GoTrueAuth;
pub use session::{AuthEvent, SessionHub, Subscription};

use serde::Serialize;

use crate::error::Result;
use crate::models::{Session, User, UserMetadata};

/// Result of a sign-up request.
#[derive(Debug, Clone, PartialEq)]
pub enum SignUp {
    /// The account is active and a session was issued.
    SignedIn(Session),
    /// The account exists but the email address must be confirmed first.
    ConfirmationRequired(User),
}

/// Changes applied to the signed-in user.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<UserMetadata>,
}

/// Operations of the auth subsystem.
///
/// [`GoTrueAuth`] implements this over HTTP; tests substitute their own
/// implementations.
pub trait AuthProvider: Send + Sync {
    fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &UserMetadata,
        redirect_to: Option<&str>,
    ) -> Result<SignUp>;

    fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session>;

    /// URL the browser is sent to for third-party sign-in.
    fn authorize_url(&self, provider: &str, redirect_to: &str) -> Result<String>;

    fn refresh_session(&self, refresh_token: &str) -> Result<Session>;

    /// Send a password-reset email whose link lands on `redirect_to`.
    fn reset_password_for_email(&self, email: &str, redirect_to: &str) -> Result<()>;

    /// The user owning `access_token`, or `None` if the token is not accepted.
    fn get_user(&self, access_token: &str) -> Result<Option<User>>;

    fn update_user(&self, access_token: &str, update: &UserUpdate) -> Result<User>;

    fn sign_out(&self, access_token: &str) -> Result<()>;
}
