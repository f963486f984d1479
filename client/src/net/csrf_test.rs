use super::*;

fn response(status: u16, body: &str, headers: &[(&str, &str)]) -> HttpResponse {
    HttpResponse {
        status,
        status_text: String::new(),
        headers: headers.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect(),
        body: body.to_owned(),
    }
}

// =============================================================================
// CsrfPhase
// =============================================================================

#[test]
fn accepted_response_is_clean_from_any_phase() {
    for phase in [CsrfPhase::Clean, CsrfPhase::Rejected, CsrfPhase::Retrying] {
        assert_eq!(phase.on_response(false, true), CsrfPhase::Clean);
    }
}

#[test]
fn first_rejection_of_mutating_request_allows_retry() {
    assert_eq!(CsrfPhase::Clean.on_response(true, true), CsrfPhase::Rejected);
}

#[test]
fn rejection_of_read_request_fails_immediately() {
    assert_eq!(CsrfPhase::Clean.on_response(true, false), CsrfPhase::Failed);
}

#[test]
fn reacquired_token_moves_to_retrying() {
    assert_eq!(CsrfPhase::Rejected.on_reacquired(), CsrfPhase::Retrying);
}

#[test]
fn second_rejection_is_terminal() {
    let phase = CsrfPhase::Clean
        .on_response(true, true)
        .on_reacquired()
        .on_response(true, true);
    assert_eq!(phase, CsrfPhase::Failed);
}

#[test]
fn reacquire_outside_rejected_is_noop() {
    assert_eq!(CsrfPhase::Clean.on_reacquired(), CsrfPhase::Clean);
    assert_eq!(CsrfPhase::Failed.on_reacquired(), CsrfPhase::Failed);
}

// =============================================================================
// is_csrf_rejection
// =============================================================================

#[test]
fn forbidden_with_marker_is_rejection() {
    assert!(is_csrf_rejection(&response(403, "CSRF violation", &[])));
    assert!(is_csrf_rejection(&response(403, r#"{"message":"Invalid CSRF token"}"#, &[])));
}

#[test]
fn forbidden_without_marker_is_not_rejection() {
    assert!(!is_csrf_rejection(&response(403, "forbidden", &[])));
}

#[test]
fn marker_on_other_status_is_not_rejection() {
    assert!(!is_csrf_rejection(&response(400, "CSRF violation", &[])));
}

// =============================================================================
// rotated_token
// =============================================================================

#[test]
fn rotated_token_reads_header_case_insensitively() {
    let resp = response(200, "{}", &[("X-CSRF-Token", "abc")]);
    assert_eq!(rotated_token(&resp), Some("abc"));
}

#[test]
fn rotated_token_ignored_on_error_response() {
    let resp = response(500, "", &[("x-csrf-token", "abc")]);
    assert_eq!(rotated_token(&resp), None);
}

#[test]
fn rotated_token_ignores_blank_header() {
    let resp = response(200, "", &[("x-csrf-token", "  ")]);
    assert_eq!(rotated_token(&resp), None);
}
