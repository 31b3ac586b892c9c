//! Codec layer for field values.
//!
//! # Submodules
//!
//! - [`cast`][]: Raw field bytes to typed [`Value`](crate::Value)s
//! - [`charset`][]: Text encodings, WHATWG and DOS code pages

pub mod cast;
pub mod charset;
