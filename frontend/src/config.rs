//! Application configuration.
//!
//! Compile-time settings for the dashboard frontend.

/// Backend API base URL.
pub const BACKEND_URL: &str = "http://localhost:3000";

/// Maximum size of one uploaded file (in bytes).
///
/// Matches the backend's default `FUNNEL_MAX_UPLOAD_MB`.
pub const MAX_FILE_SIZE: usize = 50 * 1024 * 1024;

/// Maximum logs to keep in memory.
pub const MAX_LOG_ENTRIES: usize = 100;

/// Chart palette.
pub mod palette {
    pub const PRIMARY: &str = "#4a90e2";
    pub const SECONDARY: &str = "#7c4dff";
    pub const SUCCESS: &str = "#00c853";
    pub const WARNING: &str = "#ff9100";
    pub const INFO: &str = "#00b8d4";
    pub const CONVERTED: &str = "#2e7d32";
    pub const NOT_CONVERTED: &str = "#b71c1c";
}
