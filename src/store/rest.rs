//! PostgREST data API over blocking HTTP.

use std::sync::Arc;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use super::RemoteStore;
use crate::auth::SessionHub;
use crate::config::Config;
use crate::error::{FinTrackError, Result};
use crate::query::Query;

/// Sends row queries to `{url}/rest/v1`.
///
/// Requests are authorised with the signed-in user's access token when the
/// session hub holds one, otherwise with the anon key, so row-level access
/// rules on the server see the right identity.
pub struct RestStore {
    base_url: String,
    anon_key: String,
    client: Client,
    sessions: Arc<SessionHub>,
}

impl RestStore {
    pub fn new(config: &Config, sessions: Arc<SessionHub>) -> Result<Self> {
        Ok(Self {
            base_url: config.rest_url(),
            anon_key: config.anon_key.clone(),
            client: http_client(config)?,
            sessions,
        })
    }

    fn bearer(&self) -> String {
        self.sessions
            .access_token()
            .unwrap_or_else(|| self.anon_key.clone())
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path);
        debug!(%method, %url, "data api request");
        self.client
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(self.bearer())
    }

    fn send_rows(&self, request: RequestBuilder) -> Result<Vec<Value>> {
        let resp = checked(request.send()?)?;
        let text = resp.text()?;
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        match serde_json::from_str::<Value>(&text)? {
            Value::Array(rows) => Ok(rows),
            Value::Null => Ok(Vec::new()),
            row => Ok(vec![row]),
        }
    }
}

impl RemoteStore for RestStore {
    fn fetch(&self, query: &Query) -> Result<Vec<Value>> {
        let request = self
            .request(Method::GET, &query.table)
            .query(&query.to_params());
        self.send_rows(request)
    }

    fn insert(&self, query: &Query, rows: Vec<Value>) -> Result<Vec<Value>> {
        let request = self
            .request(Method::POST, &query.table)
            .header("Prefer", "return=representation")
            .query(&[("select", query.select_clause())])
            .json(&rows);
        self.send_rows(request)
    }

    fn update(&self, query: &Query, patch: Value) -> Result<Vec<Value>> {
        let mut params = query.filter_params();
        params.push(("select".to_string(), query.select_clause()));
        let request = self
            .request(Method::PATCH, &query.table)
            .header("Prefer", "return=representation")
            .query(&params)
            .json(&patch);
        self.send_rows(request)
    }

    fn delete(&self, query: &Query) -> Result<usize> {
        let mut params = query.filter_params();
        params.push(("select".to_string(), "id".to_string()));
        let request = self
            .request(Method::DELETE, &query.table)
            .header("Prefer", "return=representation")
            .query(&params);
        Ok(self.send_rows(request)?.len())
    }

    fn rpc(&self, function: &str, args: Value) -> Result<Value> {
        let request = self
            .request(Method::POST, &format!("rpc/{}", function))
            .json(&args);
        let resp = checked(request.send()?)?;
        let text = resp.text()?;
        if text.trim().is_empty() {
            Ok(Value::Null)
        } else {
            Ok(serde_json::from_str(&text)?)
        }
    }
}

pub(crate) fn http_client(config: &Config) -> Result<Client> {
    Ok(Client::builder()
        .timeout(config.timeout)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()?)
}

/// Pass successful responses through; turn error responses into
/// [`FinTrackError::Remote`] carrying the service's message.
pub(crate) fn checked(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().unwrap_or_default();
    Err(remote_error(status.as_u16(), &body))
}

/// Parse the JSON error bodies of the data and auth APIs.
///
/// PostgREST sends `{code, message, details, hint}`; the auth API sends
/// either `{code, error_code, msg}` or `{error, error_description}`.
pub(crate) fn remote_error(status: u16, body: &str) -> FinTrackError {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let field = |name: &str| -> Option<String> {
        parsed
            .as_ref()
            .and_then(|v| v.get(name))
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    };

    let message = field("message")
        .or_else(|| field("msg"))
        .or_else(|| field("error_description"))
        .or_else(|| field("error"))
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                format!("request failed with status {}", status)
            } else {
                body.trim().to_string()
            }
        });
    let code = field("code").or_else(|| field("error_code"));

    FinTrackError::remote(status, code, message)
}
