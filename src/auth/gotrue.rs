//! HTTP client for the GoTrue auth API at `{url}/auth/v1`.

use chrono::{DateTime, Duration, Utc};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::{Method, Url};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::{AuthProvider, SignUp, UserUpdate};
use crate::config::Config;
use crate::error::{FinTrackError, Result};
use crate::models::{Session, User, UserMetadata};
use crate::store::rest::{checked, http_client};

pub struct GoTrueAuth {
    base_url: String,
    anon_key: String,
    client: Client,
}

/// Token grant response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: User,
}

impl TokenResponse {
    fn into_session(self) -> Session {
        let expires_at = self
            .expires_at
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
            .or_else(|| self.expires_in.map(|secs| Utc::now() + Duration::seconds(secs)));
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: self.user,
        }
    }
}

impl GoTrueAuth {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            base_url: config.auth_url(),
            anon_key: config.anon_key.clone(),
            client: http_client(config)?,
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path);
        debug!(%method, %url, "auth api request");
        self.client
            .request(method, url)
            .header("apikey", &self.anon_key)
    }

    fn token(&self, grant_type: &str, body: Value) -> Result<Session> {
        let resp = checked(
            self.request(Method::POST, "token")
                .query(&[("grant_type", grant_type)])
                .json(&body)
                .send()?,
        )?;
        let token: TokenResponse = resp.json()?;
        Ok(token.into_session())
    }
}

impl AuthProvider for GoTrueAuth {
    fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &UserMetadata,
        redirect_to: Option<&str>,
    ) -> Result<SignUp> {
        let mut request = self.request(Method::POST, "signup").json(&json!({
            "email": email,
            "password": password,
            "data": metadata,
        }));
        if let Some(redirect) = redirect_to {
            request = request.query(&[("redirect_to", redirect)]);
        }
        let body: Value = checked(request.send()?)?.json()?;

        // With email confirmation enabled the API answers with the bare user.
        if body.get("access_token").is_some() {
            let token: TokenResponse = serde_json::from_value(body)?;
            return Ok(SignUp::SignedIn(token.into_session()));
        }
        let user = match body.get("user") {
            Some(user) => serde_json::from_value(user.clone())?,
            None => serde_json::from_value(body)?,
        };
        Ok(SignUp::ConfirmationRequired(user))
    }

    fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session> {
        self.token("password", json!({ "email": email, "password": password }))
    }

    fn authorize_url(&self, provider: &str, redirect_to: &str) -> Result<String> {
        let url = Url::parse_with_params(
            &format!("{}/authorize", self.base_url),
            &[("provider", provider), ("redirect_to", redirect_to)],
        )
        .map_err(|e| FinTrackError::Config(format!("invalid auth URL: {}", e)))?;
        Ok(url.into())
    }

    fn refresh_session(&self, refresh_token: &str) -> Result<Session> {
        self.token("refresh_token", json!({ "refresh_token": refresh_token }))
    }

    fn reset_password_for_email(&self, email: &str, redirect_to: &str) -> Result<()> {
        checked(
            self.request(Method::POST, "recover")
                .query(&[("redirect_to", redirect_to)])
                .json(&json!({ "email": email }))
                .send()?,
        )?;
        Ok(())
    }

    fn get_user(&self, access_token: &str) -> Result<Option<User>> {
        let resp = self
            .request(Method::GET, "user")
            .bearer_auth(access_token)
            .send()?;
        if matches!(resp.status().as_u16(), 401 | 403) {
            return Ok(None);
        }
        Ok(Some(checked(resp)?.json()?))
    }

    fn update_user(&self, access_token: &str, update: &UserUpdate) -> Result<User> {
        let resp = checked(
            self.request(Method::PUT, "user")
                .bearer_auth(access_token)
                .json(update)
                .send()?,
        )?;
        Ok(resp.json()?)
    }

    fn sign_out(&self, access_token: &str) -> Result<()> {
        checked(
            self.request(Method::POST, "logout")
                .bearer_auth(access_token)
                .send()?,
        )?;
        Ok(())
    }
}
