//! Repository layer for database operations.
//!
//! Repositories keep entities as pure data models while providing reusable
//! database access methods.

pub mod mirror;

pub use mirror::MirrorRepository;
