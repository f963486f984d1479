//! Safe post-login redirects.
//!
//! SYSTEM CONTEXT
//! ==============
//! The login page and the route guard both honour a `redirect` query
//! parameter. Anything that ends up in the address bar through it must be an
//! in-app path on the allow-list, otherwise the login flow becomes an open
//! redirect.
//!
//! DESIGN
//! ======
//! Allow-list entries are either literal paths (`/dashboard`) or patterns with
//! `:name` segments (`/survey/:slug`), where each parameter matches exactly one
//! non-empty segment and the whole path must match. A literal also admits
//! nested paths below it (`/profile/edit`) unless it is `/`, or the list
//! already spells out the shape of its children with a pattern: `/survey`
//! admits `/survey/abc` only through `/survey/:slug`, so `/survey/abc/extra`
//! is refused.

#[cfg(test)]
#[path = "redirect_test.rs"]
mod redirect_test;

use std::sync::LazyLock;

/// Paths a redirect may land on.
pub const ALLOWED_REDIRECTS: &[&str] = &["/", "/dashboard", "/profile", "/survey", "/survey/:slug", "/admin"];

pub const DEFAULT_LOGIN_PATH: &str = "/login";
pub const REDIRECT_QUERY_PARAM: &str = "redirect";

static DEFAULT_POLICY: LazyLock<RedirectPolicy> = LazyLock::new(|| RedirectPolicy::new(ALLOWED_REDIRECTS));

// =============================================================================
// PATH PATTERNS
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param,
}

/// A route-style path: literal segments plus `:name` parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let segments = split_segments(raw)
            .map(|segment| match segment.strip_prefix(':') {
                Some(_) => Segment::Param,
                None => Segment::Literal(segment.to_owned()),
            })
            .collect();
        Self { raw: raw.to_owned(), segments }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn is_parameterized(&self) -> bool {
        self.segments.contains(&Segment::Param)
    }

    /// Whole-path match; a parameter takes exactly one non-empty segment.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        if !self.is_parameterized() {
            return self.raw == path;
        }
        let mut candidate = split_segments(path);
        let mut expected = self.segments.iter();
        loop {
            match (expected.next(), candidate.next()) {
                (None, None) => return true,
                (Some(Segment::Param), Some(segment)) if !segment.is_empty() => {}
                (Some(Segment::Literal(literal)), Some(segment)) if literal == segment => {}
                _ => return false,
            }
        }
    }

    /// True if `self` is a literal and `other` describes paths directly below it.
    fn is_parent_of(&self, other: &PathPattern) -> bool {
        !self.is_parameterized()
            && other.segments.len() > self.segments.len()
            && other.segments.starts_with(&self.segments)
    }
}

fn split_segments(path: &str) -> std::str::Split<'_, char> {
    path.strip_prefix('/').unwrap_or(path).split('/')
}

// =============================================================================
// POLICY
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Blocked {
    Empty,
    External,
    NotAllowed,
}

/// An allow-list of redirect targets.
#[derive(Clone, Debug)]
pub struct RedirectPolicy {
    patterns: Vec<PathPattern>,
    nested_roots: Vec<String>,
}

impl Default for RedirectPolicy {
    fn default() -> Self {
        DEFAULT_POLICY.clone()
    }
}

impl RedirectPolicy {
    pub fn new<I, P>(entries: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<str>,
    {
        let patterns: Vec<PathPattern> = entries.into_iter().map(|e| PathPattern::parse(e.as_ref())).collect();
        let nested_roots = patterns
            .iter()
            .filter(|p| !p.is_parameterized() && p.as_str() != "/")
            .filter(|p| !patterns.iter().any(|other| other.is_parameterized() && p.is_parent_of(other)))
            .map(|p| format!("{}/", p.as_str()))
            .collect();
        Self { patterns, nested_roots }
    }

    /// Whether a bare path (no query, no fragment) is allow-listed.
    #[must_use]
    pub fn allows_path(&self, path: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(path)) || self.nested_roots.iter().any(|root| path.starts_with(root))
    }

    /// `candidate` reduced to `path` or `path?query` if allowed, else `fallback`.
    #[must_use]
    pub fn sanitize(&self, candidate: Option<&str>, fallback: &str) -> String {
        let candidate = candidate.unwrap_or_default();
        match self.accept(candidate) {
            Ok(target) => target,
            Err(Blocked::Empty) => fallback.to_owned(),
            Err(Blocked::External) => {
                log::warn!("blocked external redirect target {candidate:?}");
                fallback.to_owned()
            }
            Err(Blocked::NotAllowed) => {
                log::warn!("redirect target {candidate:?} is not allow-listed");
                fallback.to_owned()
            }
        }
    }

    /// True iff `candidate` is accepted on its own, without a fallback.
    #[must_use]
    pub fn is_safe(&self, candidate: &str) -> bool {
        self.accept(candidate).is_ok()
    }

    fn accept(&self, candidate: &str) -> Result<String, Blocked> {
        if candidate.is_empty() {
            return Err(Blocked::Empty);
        }
        if !candidate.starts_with('/') || candidate.starts_with("//") || candidate.starts_with("/\\") {
            return Err(Blocked::External);
        }

        let without_fragment = candidate.split_once('#').map_or(candidate, |(head, _)| head);
        let (path, query) = match without_fragment.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (without_fragment, None),
        };
        if !self.allows_path(path) {
            return Err(Blocked::NotAllowed);
        }

        Ok(match query.filter(|q| !q.is_empty()) {
            Some(query) => format!("{path}?{query}"),
            None => path.to_owned(),
        })
    }
}

// =============================================================================
// DEFAULT-POLICY HELPERS
// =============================================================================

/// [`RedirectPolicy::sanitize`] against [`ALLOWED_REDIRECTS`].
#[must_use]
pub fn sanitize_redirect(candidate: Option<&str>, fallback: &str) -> String {
    DEFAULT_POLICY.sanitize(candidate, fallback)
}

/// [`RedirectPolicy::is_safe`] against [`ALLOWED_REDIRECTS`].
#[must_use]
pub fn is_redirect_safe(candidate: &str) -> bool {
    DEFAULT_POLICY.is_safe(candidate)
}

/// `{login_path}?redirect=<target>`, with the target sanitized (falling back
/// to `/`) and percent-encoded.
#[must_use]
pub fn build_login_redirect(target: &str, login_path: &str) -> String {
    let safe = sanitize_redirect(Some(target), "/");
    format!("{login_path}?{REDIRECT_QUERY_PARAM}={}", urlencoding::encode(&safe))
}

/// [`build_login_redirect`] to [`DEFAULT_LOGIN_PATH`].
#[must_use]
pub fn login_redirect(target: &str) -> String {
    build_login_redirect(target, DEFAULT_LOGIN_PATH)
}
