//! # client
//!
//! Leptos + WASM front end for the survey application, plus the API/session
//! core it runs on.
//!
//! The core (`net`, `state`, `routes`, `util`) is plain async Rust over the
//! [`net::transport::Transport`] seam, so the same code drives the browser
//! build (`csr` feature, `gloo-net`), the native CLI (`native` feature,
//! `reqwest`), and the scripted transport used in tests. Pages and the root
//! component are only compiled for the browser.

pub mod net;
pub mod routes;
pub mod state;
pub mod util;

#[cfg(feature = "csr")]
pub mod app;
#[cfg(feature = "csr")]
pub mod pages;

#[cfg(test)]
pub(crate) mod test_support;

/// Browser entry point: install logging and mount the root component.
#[cfg(feature = "csr")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    leptos::mount::mount_to_body(app::App);
}
