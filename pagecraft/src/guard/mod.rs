//! Route guard decisions
//!
//! Pure logic, no I/O. The axum adapter lives in
//! [`crate::middleware::auth`].

use reqwest::Url;

/// Default login entry point
pub const LOGIN_PATH: &str = "/login";

/// Default landing page for signed-in non-admins
pub const HOME_PATH: &str = "/";

// Only used to borrow `Url`'s query encoder
const PLACEHOLDER_ORIGIN: &str = "http://console.invalid/";

/// What is known about the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Access {
    /// A session is installed
    pub is_authenticated: bool,
    /// The session's user is an admin
    pub is_admin: bool,
}

impl Access {
    /// Nobody signed in
    #[must_use]
    pub const fn anonymous() -> Self {
        Self {
            is_authenticated: false,
            is_admin: false,
        }
    }

    /// Signed in without admin rights
    #[must_use]
    pub const fn user() -> Self {
        Self {
            is_authenticated: true,
            is_admin: false,
        }
    }

    /// Signed in as an admin
    #[must_use]
    pub const fn admin() -> Self {
        Self {
            is_authenticated: true,
            is_admin: true,
        }
    }
}

/// Outcome of a guard check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Let the request through
    Allow,
    /// Send the caller to the login page, then back to `next`
    RedirectToLogin {
        /// Original path and query
        next: String,
    },
    /// Signed in but not allowed here; send home
    RedirectHome,
}

/// Decides who may see which screens
#[derive(Debug, Clone)]
pub struct RouteGuard {
    login_path: String,
    home_path: String,
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self {
            login_path: LOGIN_PATH.to_string(),
            home_path: HOME_PATH.to_string(),
        }
    }
}

impl RouteGuard {
    /// Guard with the default `/login` and `/` paths
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Guard with a custom login path
    #[must_use]
    pub fn with_login_path(login_path: impl Into<String>) -> Self {
        Self {
            login_path: login_path.into(),
            ..Self::default()
        }
    }

    /// Login entry point
    #[must_use]
    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// Landing page
    #[must_use]
    pub fn home_path(&self) -> &str {
        &self.home_path
    }

    /// Decide whether `requested` may be shown
    #[must_use]
    pub fn decide(&self, access: Access, require_admin: bool, requested: &str) -> GuardDecision {
        if !access.is_authenticated {
            return GuardDecision::RedirectToLogin {
                next: requested.to_string(),
            };
        }
        if require_admin && !access.is_admin {
            return GuardDecision::RedirectHome;
        }
        GuardDecision::Allow
    }

    /// Login URL carrying `next` as an encoded query parameter
    ///
    /// `next` values that are not local paths are dropped.
    #[must_use]
    pub fn login_location(&self, next: &str) -> String {
        let Some(next) = safe_next(Some(next)) else {
            return self.login_path.clone();
        };
        if next == self.login_path || next == self.home_path {
            return self.login_path.clone();
        }
        let Ok(mut url) = Url::parse(PLACEHOLDER_ORIGIN) else {
            return self.login_path.clone();
        };
        url.set_path(&self.login_path);
        url.query_pairs_mut().append_pair("next", next);
        format!("{}?{}", url.path(), url.query().unwrap_or_default())
    }

    /// Where a decision sends the caller, `None` for [`GuardDecision::Allow`]
    #[must_use]
    pub fn location(&self, decision: &GuardDecision) -> Option<String> {
        match decision {
            GuardDecision::Allow => None,
            GuardDecision::RedirectToLogin { next } => Some(self.login_location(next)),
            GuardDecision::RedirectHome => Some(self.home_path.clone()),
        }
    }
}

/// Accept a post-login redirect target only if it stays on this site
///
/// Local paths start with a single `/`; `//host` and `/\host` are rejected
/// because browsers treat them as other origins.
#[must_use]
pub fn safe_next(next: Option<&str>) -> Option<&str> {
    let next = next?.trim();
    let local = next.starts_with('/')
        && !next.starts_with("//")
        && !next.starts_with("/\\")
        && !next.chars().any(char::is_control);
    local.then_some(next)
}
