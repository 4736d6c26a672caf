//! HTTP API: router, payload types and the log stream.

pub mod logs;
pub mod server;
pub mod types;

pub use logs::{
    log_error, log_info, log_session, log_success, log_warning, scoped, LogEntry, LogLevel,
};
pub use server::{router, start_server, AppState};
pub use types::{error_response, SnapshotResponse, UploadResponse};
