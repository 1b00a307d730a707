//! Regraft CLI library.
//!
//! Exposes the argument definitions, handlers and helpers used by the
//! `regraft` binary so they can be exercised from tests.

pub mod cli;
pub mod clipboard;
pub mod config;
pub mod output;
