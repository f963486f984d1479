//! Route table shared by the router and the route guard.
//!
//! SYSTEM CONTEXT
//! ==============
//! The Leptos router owns rendering; this table owns access rules. Keeping the
//! rules in plain data lets the guard decide without a browser.

#[cfg(test)]
#[path = "routes_test.rs"]
mod routes_test;

use std::sync::LazyLock;

use crate::util::redirect::{PathPattern, REDIRECT_QUERY_PARAM};

/// Who may open a route.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    /// Only with a session.
    Authenticated,
    /// Only without one (login, register).
    Guest,
    /// Anyone.
    Public,
}

/// Per-route metadata consulted by the guard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RouteMeta {
    pub access: Access,
    /// Query parameter carrying a return path, for routes that honour one.
    pub redirect_param: Option<&'static str>,
}

impl RouteMeta {
    const AUTH: Self = Self { access: Access::Authenticated, redirect_param: None };
    const GUEST: Self = Self { access: Access::Guest, redirect_param: None };

    #[must_use]
    pub fn requires_auth(&self) -> bool {
        self.access == Access::Authenticated
    }

    #[must_use]
    pub fn requires_guest(&self) -> bool {
        self.access == Access::Guest
    }
}

/// One entry of the route table.
#[derive(Clone, Debug)]
pub struct RouteDef {
    pub name: &'static str,
    pub pattern: PathPattern,
    pub meta: RouteMeta,
}

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/";

static ROUTES: LazyLock<Vec<RouteDef>> = LazyLock::new(|| {
    let route = |name, path, meta| RouteDef { name, pattern: PathPattern::parse(path), meta };
    vec![
        route(
            "login",
            LOGIN_PATH,
            RouteMeta { access: Access::Guest, redirect_param: Some(REDIRECT_QUERY_PARAM) },
        ),
        route("home", HOME_PATH, RouteMeta::AUTH),
        route("register", "/register", RouteMeta::GUEST),
        route("survey", "/survey", RouteMeta::AUTH),
        route("survey-slug", "/survey/:slug", RouteMeta::AUTH),
        route("dashboard", "/dashboard", RouteMeta::AUTH),
        route("profile", "/profile", RouteMeta::AUTH),
        route("admin", "/admin", RouteMeta::AUTH),
    ]
});

#[must_use]
pub fn all() -> &'static [RouteDef] {
    &ROUTES
}

/// The route whose pattern matches `path` (no query). A trailing slash is
/// ignored.
#[must_use]
pub fn resolve(path: &str) -> Option<&'static RouteDef> {
    let path = match path.strip_suffix('/') {
        Some(trimmed) if !trimmed.is_empty() => trimmed,
        _ => path,
    };
    ROUTES.iter().find(|route| route.pattern.matches(path))
}

#[must_use]
pub fn by_name(name: &str) -> Option<&'static RouteDef> {
    ROUTES.iter().find(|route| route.name == name)
}
