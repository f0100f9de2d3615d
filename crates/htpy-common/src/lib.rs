//! Common utilities for the htpy converter.
//!
//! This crate provides shared infrastructure used by all conversion stages:
//! - **Warning System** - per-conversion diagnostics with de-duplication

pub mod warning;

pub use warning::{Diagnostic, DiagnosticKind, Diagnostics, Severity};
