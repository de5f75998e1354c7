//! Utility modules shared across the crate.
//!
//! - [`datetime`] - Date parsing, creation timestamps and human-readable due dates

pub mod datetime;
