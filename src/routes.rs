//! Route surface and the access rules applied before a view is shown.

use reqwest::Url;

pub const LOGIN_PATH: &str = "/auth/login";
pub const DASHBOARD_PATH: &str = "/dashboard";
/// Query parameter carrying the path to return to after signing in.
pub const REDIRECT_PARAM: &str = "redirectTo";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Home,
    Dashboard,
    Expenses,
    Analyses,
    Budget,
    Settings,
    Login,
    Register,
    ResetPassword,
    UpdatePassword,
    AuthCallback,
    AuthCodeError,
}

impl View {
    pub const ALL: [View; 12] = [
        View::Home,
        View::Dashboard,
        View::Expenses,
        View::Analyses,
        View::Budget,
        View::Settings,
        View::Login,
        View::Register,
        View::ResetPassword,
        View::UpdatePassword,
        View::AuthCallback,
        View::AuthCodeError,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            View::Home => "/",
            View::Dashboard => DASHBOARD_PATH,
            View::Expenses => "/expenses",
            View::Analyses => "/analyses",
            View::Budget => "/budget",
            View::Settings => "/settings",
            View::Login => LOGIN_PATH,
            View::Register => "/auth/register",
            View::ResetPassword => "/auth/reset-password",
            View::UpdatePassword => "/auth/update-password",
            View::AuthCallback => "/auth/callback",
            View::AuthCodeError => "/auth/auth-code-error",
        }
    }

    /// Resolve a request path, ignoring any query string and trailing slash.
    ///
    /// Sub-paths resolve to the view they sit under (`/expenses/42` is
    /// [`View::Expenses`]); only [`View::Home`] requires an exact `/`.
    pub fn from_path(path: &str) -> Option<View> {
        let path = path.split(['?', '#']).next().unwrap_or("");
        let path = match path.trim_end_matches('/') {
            "" => "/",
            p => p,
        };
        View::ALL
            .into_iter()
            .filter(|v| v.matches(path))
            .max_by_key(|v| v.path().len())
    }

    fn matches(&self, path: &str) -> bool {
        let own = self.path();
        if *self == View::Home {
            return path == own;
        }
        match path.strip_prefix(own) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }

    /// Views that require a signed-in user.
    pub fn requires_auth(&self) -> bool {
        matches!(
            self,
            View::Dashboard | View::Expenses | View::Analyses | View::Budget | View::Settings
        )
    }

    /// Views a signed-in user is sent away from.
    fn is_entry_point(&self) -> bool {
        matches!(
            self,
            View::Home | View::Login | View::Register | View::ResetPassword
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Allow,
    RedirectToLogin { location: String },
    RedirectToDashboard,
}

/// Decide whether `path` may be shown.
///
/// Unknown paths are allowed through; the view layer renders its own
/// not-found page.
pub fn guard(path: &str, signed_in: bool) -> Access {
    let Some(view) = View::from_path(path) else {
        return Access::Allow;
    };
    if view.requires_auth() && !signed_in {
        return Access::RedirectToLogin {
            location: login_location(path),
        };
    }
    if view.is_entry_point() && signed_in {
        return Access::RedirectToDashboard;
    }
    Access::Allow
}

/// `/auth/login?redirectTo=<path>` with the return path percent-encoded.
pub fn login_location(return_to: &str) -> String {
    // The base only serves to build a relative location.
    match Url::parse_with_params(
        &format!("http://localhost{}", LOGIN_PATH),
        &[(REDIRECT_PARAM, return_to)],
    ) {
        Ok(url) => format!("{}?{}", url.path(), url.query().unwrap_or("")),
        Err(_) => LOGIN_PATH.to_string(),
    }
}
