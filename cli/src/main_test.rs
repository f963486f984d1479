use clap::Parser;

use super::*;

#[test]
fn parses_global_options_and_command() {
    let cli = Cli::try_parse_from([
        "survey-cli",
        "--base-url",
        "https://survey.example.com/api",
        "--token-file",
        "/tmp/token",
        "get",
        "/survey",
        "--raw",
    ])
    .unwrap();

    assert_eq!(cli.base_url, "https://survey.example.com/api");
    assert_eq!(cli.token_file, Some(PathBuf::from("/tmp/token")));
    assert!(matches!(cli.command, Command::Get { ref endpoint, raw: true } if endpoint == "/survey"));
}

#[test]
fn login_requires_email() {
    assert!(Cli::try_parse_from(["survey-cli", "login", "--password", "pw"]).is_err());
}

#[test]
fn explicit_token_path_wins() {
    assert_eq!(token_path(Some(PathBuf::from("/tmp/t"))), PathBuf::from("/tmp/t"));
    assert!(token_path(None).ends_with(TOKEN_FILE_NAME));
}

#[test]
fn redirect_report_for_allowed_path() {
    assert_eq!(
        redirect_report("/dashboard?tab=1"),
        "allowed\nsanitized: /dashboard?tab=1\nlogin: /login?redirect=%2Fdashboard%3Ftab%3D1"
    );
}

#[test]
fn redirect_report_for_external_url() {
    assert_eq!(redirect_report("//evil.com"), "blocked\nsanitized: /\nlogin: /login?redirect=%2F");
}
