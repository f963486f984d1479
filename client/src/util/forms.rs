//! Input validation for the login and registration forms.
//!
//! Kept out of the page components so the rules run in native tests.

#[cfg(test)]
#[path = "forms_test.rs"]
mod forms_test;

use crate::net::types::{LoginRequest, RegisterRequest};

pub const LOGIN_FIELDS_REQUIRED: &str = "Enter your email and password.";
pub const REGISTER_FIELDS_REQUIRED: &str = "All fields are required.";
pub const INVALID_EMAIL: &str = "Enter a valid email address.";
pub const PASSWORDS_DIFFER: &str = "Passwords do not match.";

/// Trim the email and require both fields. The password is sent as typed.
///
/// # Errors
///
/// Returns the message to show next to the form.
pub fn validate_login_input(email: &str, password: &str) -> Result<LoginRequest, &'static str> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(LOGIN_FIELDS_REQUIRED);
    }
    if !looks_like_email(email) {
        return Err(INVALID_EMAIL);
    }
    Ok(LoginRequest { email: email.to_owned(), password: password.to_owned() })
}

/// Trim the text fields, require all of them, and check the confirmation.
///
/// # Errors
///
/// Returns the message to show next to the form.
pub fn validate_register_input(
    name: &str,
    surname: &str,
    email: &str,
    password: &str,
    confirm: &str,
) -> Result<RegisterRequest, &'static str> {
    let (name, surname, email) = (name.trim(), surname.trim(), email.trim());
    if [name, surname, email, password].iter().any(|field| field.is_empty()) {
        return Err(REGISTER_FIELDS_REQUIRED);
    }
    if !looks_like_email(email) {
        return Err(INVALID_EMAIL);
    }
    if password != confirm {
        return Err(PASSWORDS_DIFFER);
    }
    Ok(RegisterRequest {
        name: name.to_owned(),
        surname: surname.to_owned(),
        email: email.to_owned(),
        password: password.to_owned(),
    })
}

// The server does the real validation; this only catches typos early.
fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    }
}
