//! Domain layer types and invariants.

pub mod error;
pub mod markup;
pub mod theme;
