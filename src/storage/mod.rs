//! Local storage module for the task mirror
//!
//! This module provides:
//! - [`MirrorCache`], the durable key/value contract
//! - [`LocalStorage`], a SeaORM/SQLite implementation of it
//! - [`MemoryMirror`], an in-process implementation
//! - [`TaskMirror`], typed access to the task snapshot

pub mod db;
pub mod mirror;

pub use db::LocalStorage;
pub use mirror::{MemoryMirror, MirrorCache, TaskMirror};
