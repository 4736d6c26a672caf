//! UI Components for the funnel dashboard.
//!
//! # Layout Components
//! - [`Header`] - Session badge and reset
//! - [`Hero`] - Main title and description
//! - [`Footer`] - Page footer
//!
//! # Feature Components
//! - [`UploadSection`] - Multi-file CSV upload
//! - [`FiltersSidebar`] - Date range and segment filters
//! - [`Dashboard`] - KPI cards and tabbed panels
//! - [`LogsPanel`] - Real-time pipeline logs (SSE)
//!
//! Charts are drawn as inline SVG by the views in [`charts`].

pub mod charts;
mod dashboard;
mod filters;
mod footer;
mod header;
mod hero;
mod logs;
mod upload;

pub use dashboard::*;
pub use filters::*;
pub use footer::*;
pub use header::*;
pub use hero::*;
pub use logs::*;
pub use upload::*;
