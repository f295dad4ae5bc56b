//! Front-end core for a news site.
//!
//! - [`application::markup`] turns author text into escaped HTML blocks, previews
//!   and plain text.
//! - [`cache`] de-duplicates content API reads with a TTL cache.
//! - [`application::theme`] maps theme names to layout and styling bundles.
//! - [`application::auth`] keeps the signed-in state in sync with the API.
//! - [`infra`] holds the HTTP, storage and telemetry adapters.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
pub(crate) mod util;
