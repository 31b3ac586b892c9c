//! Foundational data structures, error types and typed values.

pub mod error;
pub mod models;
pub mod value;
