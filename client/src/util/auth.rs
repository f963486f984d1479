//! Route guard: who may open which route, and where everyone else goes.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every navigation is checked against the route table. Anonymous users
//! heading for a protected page are sent to login with the page as a
//! sanitized return path; signed-in users landing on login or register are
//! sent on to that return path, or home.
//!
//! DESIGN
//! ======
//! [`guard`] is a pure function of the route metadata, the session flag, and
//! the target's query, so the whole decision table is unit-tested without a
//! router. The Leptos side only feeds it the current location.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use crate::routes::{self, HOME_PATH, RouteMeta};

use super::redirect::{login_redirect, sanitize_redirect};

/// A navigation target split into path and decoded query pairs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RouteTarget {
    pub full_path: String,
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl RouteTarget {
    /// Parse `path?query#fragment`. Query keys and values are
    /// percent-decoded, with `+` read as a space; undecodable pairs keep their
    /// raw text.
    #[must_use]
    pub fn parse(full_path: &str) -> Self {
        let without_fragment = full_path.split_once('#').map_or(full_path, |(head, _)| head);
        let (path, query) = without_fragment.split_once('?').unwrap_or((without_fragment, ""));
        let query = query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                (decode_component(key), decode_component(value))
            })
            .collect();
        Self { full_path: full_path.to_owned(), path: path.to_owned(), query }
    }

    /// First value of a query parameter.
    #[must_use]
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str())
    }
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

/// Outcome of a guard check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    Proceed,
    /// Anonymous access to a protected route; carries the login URL.
    RedirectToLogin(String),
    /// Signed-in access to a guest route; carries home or the return path.
    RedirectTo(String),
}

/// Decide whether a navigation to `target` may proceed.
#[must_use]
pub fn guard(meta: &RouteMeta, is_authenticated: bool, target: &RouteTarget) -> GuardDecision {
    if meta.requires_auth() && !is_authenticated {
        return GuardDecision::RedirectToLogin(login_redirect(&target.full_path));
    }
    if meta.requires_guest() && is_authenticated {
        let return_path = meta.redirect_param.and_then(|param| target.query_value(param));
        return match return_path {
            Some(path) => GuardDecision::RedirectTo(sanitize_redirect(Some(path), HOME_PATH)),
            None => GuardDecision::RedirectTo(HOME_PATH.to_owned()),
        };
    }
    GuardDecision::Proceed
}

/// [`guard`] for a raw location. Paths outside the route table proceed so the
/// router can render its fallback.
#[must_use]
pub fn guard_path(full_path: &str, is_authenticated: bool) -> GuardDecision {
    let target = RouteTarget::parse(full_path);
    match routes::resolve(&target.path) {
        Some(route) => guard(&route.meta, is_authenticated, &target),
        None => GuardDecision::Proceed,
    }
}

/// `pathname` plus `search`, as the guard sees it.
#[must_use]
pub fn location_path(pathname: &str, search: &str) -> String {
    let search = search.strip_prefix('?').unwrap_or(search);
    if search.is_empty() {
        pathname.to_owned()
    } else {
        format!("{pathname}?{search}")
    }
}

/// Track the guard decision for the current location and session, replacing
/// the history entry whenever it redirects.
///
/// The returned memo reads [`GuardDecision::Proceed`] only once the current
/// navigation is allowed; views behind it stay unrendered until then.
#[cfg(feature = "csr")]
pub fn install_route_guard<F>(
    auth: leptos::prelude::RwSignal<crate::state::auth::AuthState>,
    navigate: F,
) -> leptos::prelude::Memo<GuardDecision>
where
    F: Fn(&str, leptos_router::NavigateOptions) + Clone + 'static,
{
    use leptos::prelude::*;
    use leptos_router::hooks::use_location;

    let location = use_location();
    let decision = Memo::new(move |_| {
        let is_authenticated = auth.with(crate::state::auth::AuthState::is_authenticated);
        let full_path = location_path(&location.pathname.get(), &location.search.get());
        guard_path(&full_path, is_authenticated)
    });

    Effect::new(move || {
        let destination = match decision.get() {
            GuardDecision::Proceed => return,
            GuardDecision::RedirectToLogin(to) | GuardDecision::RedirectTo(to) => to,
        };
        log::debug!("route guard redirecting to {destination}");
        navigate(&destination, leptos_router::NavigateOptions { replace: true, ..Default::default() });
    });

    decision
}
