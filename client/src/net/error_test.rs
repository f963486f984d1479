use super::*;

// =============================================================================
// from_response
// =============================================================================

#[test]
fn from_response_uses_message_field() {
    let err = ApiError::from_response(400, "Bad Request", r#"{"message":"email already used"}"#);
    assert_eq!(
        err,
        ApiError::Api { message: "email already used".to_owned(), status: 400, code: None }
    );
}

#[test]
fn from_response_falls_back_to_error_field() {
    let err = ApiError::from_response(422, "Unprocessable Entity", r#"{"error":"invalid email"}"#);
    assert_eq!(err.message(), "invalid email");
}

#[test]
fn from_response_keeps_server_code() {
    let err = ApiError::from_response(409, "Conflict", r#"{"message":"taken","code":"USER_EXISTS"}"#);
    assert_eq!(err.code(), "USER_EXISTS");
    assert_eq!(err.status(), Some(409));
}

#[test]
fn from_response_stringifies_numeric_code() {
    let err = ApiError::from_response(500, "Internal Server Error", r#"{"message":"boom","code":42}"#);
    assert_eq!(err.code(), "42");
}

#[test]
fn from_response_non_json_uses_status_line() {
    let err = ApiError::from_response(502, "Bad Gateway", "<html>upstream down</html>");
    assert_eq!(err.message(), "502 Bad Gateway");
    assert_eq!(err.code(), "E_API");
}

#[test]
fn from_response_blank_message_uses_status_line() {
    let err = ApiError::from_response(404, "Not Found", r#"{"message":"  "}"#);
    assert_eq!(err.message(), "404 Not Found");
}

#[test]
fn from_response_missing_status_text_uses_bare_status() {
    let err = ApiError::from_response(418, "", "");
    assert_eq!(err.message(), "418");
}

// =============================================================================
// codes and messages
// =============================================================================

#[test]
fn connection_message_does_not_leak_details() {
    let message = ApiError::Connection.message();
    assert!(message.starts_with("Unable to reach the server"));
    assert_eq!(ApiError::Connection.code(), "E_CONNECTION");
    assert_eq!(ApiError::Connection.status(), None);
}

#[test]
fn csrf_reports_forbidden_status() {
    assert_eq!(ApiError::Csrf.status(), Some(403));
    assert_eq!(ApiError::Csrf.code(), "E_CSRF");
}

#[test]
fn decode_and_timeout_codes() {
    assert_eq!(ApiError::Decode("x".to_owned()).code(), "E_DECODE");
    assert_eq!(ApiError::Timeout.code(), "E_TIMEOUT");
    assert_eq!(ApiError::InvalidRequest("x".to_owned()).code(), "E_INVALID_REQUEST");
}
