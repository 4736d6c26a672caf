//! # Funnel - Olist sales funnel cleaning and dashboard metrics
//!
//! Funnel cleans the Olist marketing-funnel exports (marketing-qualified
//! leads, closed deals, orders), joins leads with their deals, and computes
//! the KPIs and charts of the sales-funnel dashboard.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  CSV Files  │────▶│   Parser    │────▶│    Clean    │────▶│  Dashboard  │
//! │  (ISO/UTF8) │     │  (auto-enc) │     │ (+ merge)   │     │  snapshot   │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use funnel::{clean_paths, recompute, Filters};
//!
//! let report = clean_paths(&["leads.csv", "deals.csv"])?;
//! let snapshot = recompute(&report.tables, &Filters::default());
//! println!("Conversion rate: {:.2}%", snapshot.kpis.conversion_rate);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types per layer
//! - [`models`] - Typed table rows
//! - [`parser`] - CSV parsing with auto-detection
//! - [`clean`] - Classification, cleaning and merge
//! - [`dashboard`] - Filters, KPIs and chart panels
//! - [`session`] - Per-user dashboard state
//! - [`config`] - Server configuration
//! - [`api`] - HTTP API server

// Core modules
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Cleaning
pub mod clean;

// Metrics
pub mod dashboard;

// State
pub mod session;

// HTTP API
pub mod api;
pub mod config;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{CleanError, CsvError, PipelineError, ServerError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    BehaviourProfile, CleanedTables, ClosedDeal, Lead, MergedLead, Order, Table, TableCounts,
    TableKind,
};

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use parser::{
    decode_content, detect_delimiter, detect_encoding, parse_bytes_auto, parse_csv,
    parse_csv_file_auto, ParseResult, RawTable,
};

// =============================================================================
// Re-exports - Cleaning
// =============================================================================

pub use clean::{
    classify, clean_deals, clean_files, clean_leads, clean_orders, clean_paths, merge_leads,
    BatchReport, FileSummary, UploadedFile,
};

// =============================================================================
// Re-exports - Dashboard
// =============================================================================

pub use dashboard::{recompute, DashboardSnapshot, FilterControls, Filters, Kpis};

// =============================================================================
// Re-exports - Session and server
// =============================================================================

pub use config::ServerConfig;
pub use session::{Session, SessionStore};

pub mod server {
    pub use crate::api::server::start_server;
}
