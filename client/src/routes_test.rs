use super::*;

#[test]
fn resolves_static_routes() {
    assert_eq!(resolve("/").map(|r| r.name), Some("home"));
    assert_eq!(resolve("/login").map(|r| r.name), Some("login"));
    assert_eq!(resolve("/dashboard/").map(|r| r.name), Some("dashboard"));
}

#[test]
fn resolves_parameterized_route() {
    assert_eq!(resolve("/survey/abc").map(|r| r.name), Some("survey-slug"));
    assert_eq!(resolve("/survey").map(|r| r.name), Some("survey"));
    assert!(resolve("/survey/abc/extra").is_none());
}

#[test]
fn unknown_path_resolves_to_nothing() {
    assert!(resolve("/nowhere").is_none());
}

#[test]
fn access_rules() {
    let login = by_name("login").unwrap();
    assert!(login.meta.requires_guest());
    assert_eq!(login.meta.redirect_param, Some("redirect"));
    assert!(by_name("register").unwrap().meta.requires_guest());

    for name in ["home", "survey", "survey-slug", "dashboard", "profile", "admin"] {
        assert!(by_name(name).unwrap().meta.requires_auth(), "{name}");
    }
}

#[test]
fn route_names_are_unique() {
    let mut names: Vec<_> = all().iter().map(|r| r.name).collect();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), all().len());
}
