//! # Formats Module
//!
//! Text formats for the response log.
//!
//! These are pure transformations; file I/O lives in [`crate::log`].

pub mod csv;

pub use csv::{encode_table, escape_field, parse_table};
