//! Infrastructure adapters and runtime bootstrap.

pub mod api;
pub mod auth;
pub mod error;
pub mod storage;
pub mod telemetry;
