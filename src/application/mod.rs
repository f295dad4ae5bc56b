//! Application services: markup rendering, theme resolution and session state.

pub mod auth;
pub mod error;
pub mod markup;
pub mod theme;
