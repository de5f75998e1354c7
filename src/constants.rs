//! Constants used throughout the application
//!
//! Well-known list identifiers, storage keys and user-facing messages live
//! here so the sync layer, the views and the CLI agree on them.

// Well-known list identifiers
pub const LIST_ALL: &str = "all";
pub const LIST_TODAY: &str = "today";
pub const LIST_IMPORTANT: &str = "important";
pub const LIST_PLANNED: &str = "planned";
pub const LIST_ASSIGNED: &str = "assigned";

/// List a task belongs to when it has no `listId`
pub const DEFAULT_LIST_ID: &str = LIST_TODAY;

// Storage
/// Mirror cache key holding the serialized task snapshot
pub const MIRROR_TASKS_KEY: &str = "tasks";
/// Remote collection holding task documents
pub const TASKS_COLLECTION: &str = "tasks";

// Weather
pub const OPENWEATHER_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
pub const WEATHER_CACHE_MINUTES: u64 = 30;
/// Main conditions that make a task location unfriendly for outdoor work
pub const BAD_WEATHER_CONDITIONS: [&str; 6] = ["Rain", "Thunderstorm", "Snow", "Extreme", "Drizzle", "Storm"];
pub const OUTDOOR_MIN_TEMP_C: f64 = 10.0;
pub const OUTDOOR_MAX_TEMP_C: f64 = 35.0;

// Remote store
pub const FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com/v1";

// Environment
pub const ENV_USER_ID: &str = "TASKSYNC_USER_ID";
pub const ENV_USER_NAME: &str = "TASKSYNC_USER_NAME";
pub const ENV_USER_EMAIL: &str = "TASKSYNC_USER_EMAIL";

// Success Messages
pub const SUCCESS_TASK_CREATED: &str = "✅ Task created";
pub const SUCCESS_TASK_UPDATED: &str = "✅ Task updated";
pub const SUCCESS_TASK_DELETED: &str = "✅ Task deleted";

// Error Messages
pub const ERROR_TASK_CREATE_FAILED: &str = "❌ Failed to create task";
pub const ERROR_TASK_UPDATE_FAILED: &str = "❌ Failed to update task";
pub const ERROR_TASK_DELETE_FAILED: &str = "❌ Failed to delete task";
pub const ERROR_NOT_SIGNED_IN: &str = "❌ Not signed in";

// Config
pub const CONFIG_GENERATED: &str = "Generated default configuration at";
