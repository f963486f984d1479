//! CSRF token rejection handling.
//!
//! DESIGN
//! ======
//! A request moves through `Clean → Rejected → Retrying → Clean | Failed`.
//! `Rejected` is the point where the held token has been dropped and a fresh
//! one must be acquired; `Retrying` allows exactly one more attempt. The
//! single-retry guarantee is the absence of any `Retrying → Rejected` edge.

#[cfg(test)]
#[path = "csrf_test.rs"]
mod csrf_test;

use super::transport::HttpResponse;

/// Response header carrying a fresh CSRF token.
pub const CSRF_RESPONSE_HEADER: &str = "x-csrf-token";
/// Request header the token is echoed back in.
pub const CSRF_REQUEST_HEADER: &str = "X-CSRF-Token";

const CSRF_REJECTION_STATUS: u16 = 403;
const CSRF_REJECTION_MARKER: &str = "CSRF";

/// Where a request stands with respect to CSRF rejection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CsrfPhase {
    /// No rejection seen (initial state, and the state after an accepted response).
    Clean,
    /// Rejected once; the held token was dropped and must be reacquired.
    Rejected,
    /// A fresh token was acquired; the request is being sent one last time.
    Retrying,
    /// Terminal: rejection on a request that may not (or may no longer) retry.
    Failed,
}

impl CsrfPhase {
    /// Advance after a response arrived.
    ///
    /// Only mutating requests may retry. Any accepted response resets to `Clean`.
    #[must_use]
    pub fn on_response(self, rejected: bool, mutating: bool) -> Self {
        if !rejected {
            return Self::Clean;
        }
        match self {
            Self::Clean if mutating => Self::Rejected,
            _ => Self::Failed,
        }
    }

    /// Advance after a fresh token was acquired for the retry.
    #[must_use]
    pub fn on_reacquired(self) -> Self {
        match self {
            Self::Rejected => Self::Retrying,
            other => other,
        }
    }
}

/// A 403 whose body mentions `CSRF` is the server's CSRF rejection signal.
#[must_use]
pub fn is_csrf_rejection(response: &HttpResponse) -> bool {
    response.status == CSRF_REJECTION_STATUS && response.body.contains(CSRF_REJECTION_MARKER)
}

/// Fresh CSRF token carried by a successful response, if any.
#[must_use]
pub fn rotated_token(response: &HttpResponse) -> Option<&str> {
    if !response.is_success() {
        return None;
    }
    response
        .header(CSRF_RESPONSE_HEADER)
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
