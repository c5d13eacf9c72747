//! # Survey Application Library
//!
//! HTTP API and CLI for the automation tools survey. The binary in
//! `main.rs` is a thin wrapper; integration tests drive [`api`] directly.

pub mod api;
pub mod cli;
