//! Common types used across the frontend application.
//!
//! The API types mirror the backend's JSON payloads (camelCase on the wire).
//!
//! # Categories
//!
//! - **Log Types** - Real-time log streaming
//! - **Dashboard Types** - Snapshot, KPIs, chart series
//! - **API Types** - Backend response structures
//! - **Error Types** - Frontend error handling

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Log Types
// =============================================================================

/// Log severity level, as streamed by `/api/logs`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl LogLevel {
    /// Get CSS class for styling.
    pub fn css_class(&self) -> &'static str {
        match self {
            LogLevel::Info => "log-info",
            LogLevel::Success => "log-success",
            LogLevel::Warning => "log-warning",
            LogLevel::Error => "log-error",
        }
    }
}

/// A single log entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    /// RFC 3339 from the backend; displayed as local HH:MM:SS
    pub timestamp: String,
}

// =============================================================================
// Dashboard Types
// =============================================================================

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filters {
    /// `YYYY-MM-DD`, as produced by `<input type="date">`
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    /// `None` selects every segment
    pub segments: Option<Vec<String>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DateBounds {
    pub min: String,
    pub max: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterControls {
    pub date_bounds: Option<DateBounds>,
    pub segment_options: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TableCounts {
    pub mql: Option<usize>,
    pub cld: Option<usize>,
    pub order: Option<usize>,
    pub merged: Option<usize>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Kpis {
    pub total_mqls: usize,
    pub closed_deals: usize,
    pub conversion_rate: f64,
    pub avg_time_to_close: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub label: String,
    pub value: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BarChart {
    pub title: String,
    pub bars: Vec<Bar>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PieSlice {
    pub label: String,
    pub value: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PieChart {
    pub title: String,
    pub slices: Vec<PieSlice>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    pub title: String,
    pub bins: Vec<HistogramBin>,
    pub mean: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Indicator {
    pub title: String,
    pub value: f64,
    pub suffix: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionPanel {
    pub overall: PieChart,
    pub by_channel: Option<BarChart>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessPanel {
    pub by_segment: BarChart,
    pub by_lead_type: BarChart,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimePanel {
    pub closing_time: Option<Histogram>,
    pub velocity: Option<BarChart>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamPanel {
    pub top_sdrs: Option<BarChart>,
    pub top_srs: Option<BarChart>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPanel {
    pub delivery_time: Option<Histogram>,
    pub delayed: Option<Indicator>,
}

/// Everything the dashboard draws.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub filters: Filters,
    pub controls: FilterControls,
    pub tables: TableCounts,
    pub kpis: Kpis,
    pub conversion: ConversionPanel,
    pub business: BusinessPanel,
    pub time: TimePanel,
    pub team: TeamPanel,
    pub orders: OrderPanel,
}

// =============================================================================
// API Response Types
// =============================================================================

/// Per-file summary of an upload batch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSummary {
    pub name: String,
    /// "mql", "cld", "order", or `None` when ignored
    pub kind: Option<String>,
    pub encoding: String,
    pub delimiter: String,
    pub columns: Vec<String>,
    pub raw_rows: usize,
    pub clean_rows: Option<usize>,
}

/// Response from `POST /api/upload`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub session_id: String,
    /// "ready", or "warning" when files were ignored
    pub status: String,
    pub files: Vec<FileSummary>,
    pub ignored: Vec<String>,
    pub snapshot: DashboardSnapshot,
}

/// Response from the session endpoints.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotResponse {
    pub session_id: String,
    pub snapshot: DashboardSnapshot,
}

/// Body of a non-2xx response.
#[derive(Clone, Debug, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

// =============================================================================
// Error Types
// =============================================================================

/// Frontend application errors.
#[derive(Clone, Debug, PartialEq)]
pub enum AppError {
    /// File selection or upload rejected.
    Upload(String),
    /// Network/HTTP error.
    Network(String),
    /// Backend answered with an error.
    Server { status: u16, message: String },
    /// Response did not match the expected shape.
    Decode(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Upload(msg) => write!(f, "Upload error: {}", msg),
            AppError::Network(msg) => write!(f, "Network error: {}", msg),
            AppError::Server { status, message } => write!(f, "Server error ({}): {}", status, message),
            AppError::Decode(msg) => write!(f, "Invalid response: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

/// Result type alias for frontend operations.
pub type AppResult<T> = Result<T, AppError>;
