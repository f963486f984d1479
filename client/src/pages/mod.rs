//! Page modules for route-level screens.
//!
//! ARCHITECTURE
//! ============
//! Pages own route-scoped orchestration: they validate input with
//! `util::forms`, call the session store from context, and publish the
//! resulting session snapshot.

pub mod home;
pub mod login;
pub mod register;
