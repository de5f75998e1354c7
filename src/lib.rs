//! tasksync - task synchronization core
//!
//! This library keeps a user's tasks in sync between a remote document store
//! and a durable local mirror, and exposes the in-memory collection to a
//! presentation layer as named lists.
//!
//! # Modules
//!
//! * [`sync`] - Load/create/update/delete with mirror fallback
//! * [`backend`] - Remote task stores (Firestore, in-memory)
//! * [`storage`] - Local mirror cache (SQLite via SeaORM, in-memory)
//! * [`identity`] - Signed-in user and session events
//! * [`lists`] - Named lists computed from the collection
//! * [`weather`] - Weather context for outdoor tasks
//! * [`app`] - Explicitly constructed application state
//! * [`config`] - Application configuration management

/// Explicitly constructed application state
pub mod app;

/// Remote task store abstraction and implementations
pub mod backend;

/// Configuration module for managing application settings
pub mod config;

/// Application constants and default values
pub mod constants;

/// SeaORM entity models for database tables
pub mod entities;

/// Identity context and session events
pub mod identity;

/// Named task lists and filtered views
pub mod lists;

/// Logging utilities for debugging and error tracking
pub mod logger;

/// Task data model
pub mod model;

/// Repository layer for database operations
pub mod repositories;

/// Local mirror cache
pub mod storage;

/// Synchronization between the remote store, memory and the mirror
pub mod sync;

/// Utility functions for date/time handling
pub mod utils;

/// Weather lookup for outdoor tasks
pub mod weather;

pub use model::{Priority, Repeat, Task, TaskDraft};
