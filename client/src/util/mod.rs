//! Utility helpers shared across client modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Pure decision logic (redirect safety, route access, form checks) lives here
//! so pages and the router stay thin.

pub mod auth;
pub mod forms;
pub mod redirect;
