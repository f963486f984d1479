//! Sink for browser Content-Security-Policy violation reports.
//!
//! Browsers post `application/csp-report`, which the `Json` extractor
//! refuses, so the body is parsed by hand. Malformed reports are dropped; the
//! browser always gets `204`.

use axum::body::Bytes;
use axum::http::StatusCode;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct CspReport {
    #[serde(rename = "document-uri", default)]
    pub document_uri: Option<String>,
    #[serde(rename = "blocked-uri", default)]
    pub blocked_uri: Option<String>,
    #[serde(rename = "violated-directive", default)]
    pub violated_directive: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReportEnvelope {
    #[serde(rename = "csp-report")]
    report: Option<CspReport>,
}

/// The report inside a `{"csp-report": {...}}` body, if any.
#[must_use]
pub fn parse_report(body: &[u8]) -> Option<CspReport> {
    serde_json::from_slice::<ReportEnvelope>(body).ok()?.report
}

pub async fn csp_report(body: Bytes) -> StatusCode {
    if let Some(report) = parse_report(&body) {
        tracing::warn!(
            document_uri = report.document_uri.as_deref().unwrap_or_default(),
            blocked_uri = report.blocked_uri.as_deref().unwrap_or_default(),
            violated_directive = report.violated_directive.as_deref().unwrap_or_default(),
            "content security policy violation"
        );
    }
    StatusCode::NO_CONTENT
}
