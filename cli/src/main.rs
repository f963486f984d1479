use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use client::net::api::{ApiClient, ApiConfig, ApiRequest, DEFAULT_CSRF_PATH};
use client::net::error::ApiError;
use client::net::transport::{Method, TransportError};
use client::net::transport_reqwest::ReqwestTransport;
use client::state::session::SessionStore;
use client::state::storage::FileTokenStorage;
use client::util::forms::{validate_login_input, validate_register_input};
use client::util::redirect::{is_redirect_safe, login_redirect, sanitize_redirect};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[cfg(test)]
#[path = "main_test.rs"]
mod main_test;

const TOKEN_FILE_NAME: &str = ".survey-cli-token";

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}")]
    Api(#[from] ApiError),
    #[error("{0}")]
    Auth(String),
    #[error("{0}")]
    Input(&'static str),
    #[error("not signed in; run `survey-cli login` first")]
    NotSignedIn,
    #[error("session expired; sign in again")]
    SessionExpired,
    #[error("http client setup failed: {0}")]
    Transport(#[from] TransportError),
    #[error("invalid JSON output: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "survey-cli", about = "Survey API client: session, CSRF, and redirect checks")]
struct Cli {
    /// API base URL, including the `/api` prefix.
    #[arg(long, env = "SURVEY_BASE_URL", default_value = "http://127.0.0.1:3000/api")]
    base_url: String,

    /// Where the session token is kept between runs. Defaults to `~/.survey-cli-token`.
    #[arg(long, env = "SURVEY_TOKEN_FILE")]
    token_file: Option<PathBuf>,

    #[arg(long, env = "SURVEY_TIMEOUT_SECS", default_value_t = 30)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Call the health endpoint that also issues CSRF tokens.
    Health,
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "SURVEY_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        surname: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "SURVEY_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Show the signed-in user.
    Me,
    Logout,
    /// GET an endpoint and print the JSON.
    Get {
        endpoint: String,
        /// Print the body as sent, without unwrapping a `data` envelope.
        #[arg(long, default_value_t = false)]
        raw: bool,
    },
    /// Show how a post-login redirect target would be treated.
    Redirect { path: String },
}

type Store = SessionStore<ReqwestTransport, FileTokenStorage>;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    if let Command::Redirect { path } = &cli.command {
        println!("{}", redirect_report(path));
        return Ok(());
    }

    let store = open_store(&cli)?;
    match cli.command {
        Command::Health => {
            let body: Value = store.api().send(ApiRequest::new(Method::Get, DEFAULT_CSRF_PATH).raw()).await?;
            print_json(&body)?;
            match store.api().csrf_token() {
                Some(_) => println!("csrf: issued"),
                None => println!("csrf: none"),
            }
        }
        Command::Login { email, password } => {
            let credentials = validate_login_input(&email, &password).map_err(CliError::Input)?;
            let outcome = store.login(&credentials).await;
            if let Some(error) = outcome.error() {
                return Err(CliError::Auth(error.to_owned()));
            }
            store.fetch_user_info().await;
            match store.user() {
                Some(user) => println!("signed in as {} <{}>", user.display_name(), user.email),
                None => println!("signed in"),
            }
        }
        Command::Register { name, surname, email, password } => {
            let request =
                validate_register_input(&name, &surname, &email, &password, &password).map_err(CliError::Input)?;
            let outcome = store.register(&request).await;
            if let Some(error) = outcome.error() {
                return Err(CliError::Auth(error.to_owned()));
            }
            println!("{}", outcome.message().unwrap_or("registered"));
        }
        Command::Me => {
            if !store.is_authenticated() {
                return Err(CliError::NotSignedIn);
            }
            store.fetch_user_info().await;
            let user = store.user().ok_or(CliError::SessionExpired)?;
            print_json(&serde_json::to_value(user)?)?;
        }
        Command::Logout => {
            store.logout().await;
            println!("signed out");
        }
        Command::Get { endpoint, raw } => {
            let mut request = ApiRequest::new(Method::Get, &endpoint);
            if raw {
                request = request.raw();
            }
            let body: Value = store.api().send(request).await?;
            print_json(&body)?;
        }
        Command::Redirect { .. } => {}
    }
    Ok(())
}

fn open_store(cli: &Cli) -> Result<Store, CliError> {
    let config = ApiConfig::default()
        .with_base_url(cli.base_url.as_str())
        .with_timeout(Duration::from_secs(cli.timeout_secs));
    let api = Arc::new(ApiClient::new(ReqwestTransport::new()?, config));
    let storage = FileTokenStorage::new(token_path(cli.token_file.clone()));
    tracing::debug!(token_file = %storage.path().display(), "opening session");
    Ok(SessionStore::new(api, storage))
}

fn token_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit.unwrap_or_else(|| match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(TOKEN_FILE_NAME),
        None => PathBuf::from(TOKEN_FILE_NAME),
    })
}

fn redirect_report(path: &str) -> String {
    let verdict = if is_redirect_safe(path) { "allowed" } else { "blocked" };
    format!("{verdict}\nsanitized: {}\nlogin: {}", sanitize_redirect(Some(path), "/"), login_redirect(path))
}

fn print_json(value: &Value) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
