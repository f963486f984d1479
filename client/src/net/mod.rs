//! Networking for the survey backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` is the session-aware HTTP client, `csrf` its token-rejection state
//! machine, `transport` the seam to the network (with browser and native
//! implementations), `services` the typed endpoint wrappers, and `types` the
//! shared wire schema.

pub mod api;
pub mod csrf;
pub mod error;
pub mod services;
pub mod transport;
pub mod types;

#[cfg(feature = "csr")]
pub mod transport_gloo;
#[cfg(feature = "native")]
pub mod transport_reqwest;
