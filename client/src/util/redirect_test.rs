use super::*;

// =============================================================================
// sanitize_redirect
// =============================================================================

#[test]
fn missing_or_empty_candidate_falls_back() {
    assert_eq!(sanitize_redirect(None, "/"), "/");
    assert_eq!(sanitize_redirect(Some(""), "/dashboard"), "/dashboard");
}

#[test]
fn relative_and_external_candidates_fall_back() {
    for candidate in ["dashboard", "https://evil.com", "javascript:alert(1)", " /dashboard", "?redirect=/"] {
        assert_eq!(sanitize_redirect(Some(candidate), "/profile"), "/profile", "{candidate}");
    }
}

#[test]
fn protocol_relative_candidates_fall_back() {
    assert_eq!(sanitize_redirect(Some("//evil.com"), "/"), "/");
    assert_eq!(sanitize_redirect(Some("//evil.com/dashboard"), "/"), "/");
    assert_eq!(sanitize_redirect(Some("/\\evil.com"), "/"), "/");
}

#[test]
fn every_allowed_literal_is_returned_unchanged() {
    for path in ALLOWED_REDIRECTS.iter().filter(|p| !p.contains(':')) {
        assert_eq!(sanitize_redirect(Some(path), "/x"), *path);
    }
}

#[test]
fn single_segment_pattern_matches() {
    assert_eq!(sanitize_redirect(Some("/survey/abc123"), "/"), "/survey/abc123");
}

#[test]
fn pattern_does_not_match_extra_segments() {
    assert_eq!(sanitize_redirect(Some("/survey/abc/extra"), "/"), "/");
    assert_eq!(sanitize_redirect(Some("/survey/"), "/"), "/");
}

#[test]
fn unknown_path_falls_back() {
    assert_eq!(sanitize_redirect(Some("/unknown"), "/"), "/");
    assert_eq!(sanitize_redirect(Some("/dashboards"), "/"), "/");
}

#[test]
fn literal_admits_nested_paths() {
    assert_eq!(sanitize_redirect(Some("/profile/edit"), "/"), "/profile/edit");
    assert_eq!(sanitize_redirect(Some("/admin/users/7"), "/"), "/admin/users/7");
}

#[test]
fn root_does_not_admit_everything() {
    assert_eq!(sanitize_redirect(Some("/anything/at/all"), "/dashboard"), "/dashboard");
}

#[test]
fn query_is_kept_and_fragment_dropped() {
    assert_eq!(sanitize_redirect(Some("/dashboard?tab=stats"), "/"), "/dashboard?tab=stats");
    assert_eq!(sanitize_redirect(Some("/dashboard#section"), "/"), "/dashboard");
    assert_eq!(sanitize_redirect(Some("/dashboard?tab=stats#section"), "/"), "/dashboard?tab=stats");
    assert_eq!(sanitize_redirect(Some("/survey/abc?step=2"), "/"), "/survey/abc?step=2");
}

#[test]
fn empty_query_is_dropped() {
    assert_eq!(sanitize_redirect(Some("/dashboard?"), "/"), "/dashboard");
}

#[test]
fn fragment_cannot_smuggle_a_path() {
    assert_eq!(sanitize_redirect(Some("/unknown#/dashboard"), "/"), "/");
}

#[test]
fn result_is_either_fallback_or_allowed() {
    let policy = RedirectPolicy::default();
    let fallback = "/";
    assert!(policy.is_safe(fallback));

    let candidates = [
        "/", "/dashboard", "/survey/a", "/survey/a/b", "//x", "x", "/profile/p?q=1#f", "/nope", "/admin?",
    ];
    for candidate in candidates {
        let result = policy.sanitize(Some(candidate), fallback);
        assert!(result == fallback || policy.is_safe(&result), "{candidate} -> {result}");
    }
}

// =============================================================================
// is_redirect_safe
// =============================================================================

#[test]
fn is_redirect_safe_reports_acceptance() {
    assert!(is_redirect_safe("/dashboard"));
    assert!(is_redirect_safe("/survey/abc?x=1"));
    assert!(!is_redirect_safe("/unknown"));
    assert!(!is_redirect_safe("//evil.com"));
    assert!(!is_redirect_safe(""));
}

// =============================================================================
// build_login_redirect
// =============================================================================

#[test]
fn login_redirect_encodes_target() {
    assert_eq!(login_redirect("/dashboard"), "/login?redirect=%2Fdashboard");
    assert_eq!(login_redirect("/survey/abc?step=2"), "/login?redirect=%2Fsurvey%2Fabc%3Fstep%3D2");
}

#[test]
fn login_redirect_sanitizes_target() {
    assert_eq!(login_redirect("https://evil.com"), "/login?redirect=%2F");
    assert_eq!(build_login_redirect("/unknown", "/signin"), "/signin?redirect=%2F");
}

// =============================================================================
// RedirectPolicy / PathPattern
// =============================================================================

#[test]
fn custom_policy_uses_its_own_list() {
    let policy = RedirectPolicy::new(["/reports", "/teams/:team/members/:member"]);
    assert!(policy.allows_path("/reports"));
    assert!(policy.allows_path("/reports/2024"));
    assert!(policy.allows_path("/teams/red/members/7"));
    assert!(!policy.allows_path("/teams/red/members"));
    assert!(!policy.allows_path("/dashboard"));
    assert_eq!(policy.sanitize(Some("/dashboard"), "/reports"), "/reports");
}

#[test]
fn path_pattern_matching() {
    let pattern = PathPattern::parse("/survey/:slug");
    assert!(pattern.is_parameterized());
    assert!(pattern.matches("/survey/x"));
    assert!(!pattern.matches("/survey"));
    assert!(!pattern.matches("/survey//"));
    assert!(!pattern.matches("/surveys/x"));

    let literal = PathPattern::parse("/");
    assert!(!literal.is_parameterized());
    assert!(literal.matches("/"));
    assert!(!literal.matches("/x"));
}
