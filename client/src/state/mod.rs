//! Client-side session state.
//!
//! SYSTEM CONTEXT
//! ==============
//! `session` owns the token and user, `storage` persists the token, and `auth`
//! is the read-only snapshot the UI renders from.

pub mod auth;
pub mod session;
pub mod storage;
