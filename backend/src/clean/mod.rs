//! Cleaning pipeline: classify uploaded files, clean each recognized table,
//! and join leads with closed deals.
//!
//! ```text
//! files ──▶ parse ──▶ classify ──┬─▶ clean_leads  ──┐
//!                                ├─▶ clean_deals  ──┼─▶ merge_leads ──▶ CleanedTables
//!                                └─▶ clean_orders ──┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use funnel::clean::{clean_files, UploadedFile};
//!
//! let files = vec![UploadedFile::new("leads.csv", std::fs::read("leads.csv")?)];
//! let report = clean_files(&files)?;
//! println!("{:?}", report.tables.row_counts());
//! ```

pub mod classify;
pub mod dates;
pub mod deals;
pub mod export;
pub mod leads;
pub mod merge;
pub mod orders;

pub use classify::{classify, classify_headers};
pub use dates::{days_between, parse_timestamp};
pub use deals::{clean_deals, most_frequent, DROPPED_COLUMNS};
pub use export::write_tables;
pub use leads::clean_leads;
pub use merge::merge_leads;
pub use orders::clean_orders;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::api::logs::{log_info, log_success, log_warning};
use crate::error::{CleanError, CleanResult, PipelineError, PipelineResult};
use crate::models::{CleanedTables, TableKind};
use crate::parser::{parse_bytes_auto, RawRow, RawTable};

// =============================================================================
// Column access
// =============================================================================

/// A named column resolved against a table header.
///
/// Resolution never fails; reading a row from an absent column does. With no
/// surviving rows, an absent column is therefore never an error.
pub(crate) struct Column {
    name: &'static str,
    index: Option<usize>,
}

impl Column {
    pub(crate) fn resolve(table: &RawTable, name: &'static str) -> Self {
        Self {
            name,
            index: table.column_index(name),
        }
    }

    pub(crate) fn is_present(&self) -> bool {
        self.index.is_some()
    }

    fn index(&self) -> CleanResult<usize> {
        self.index
            .ok_or_else(|| CleanError::MissingColumn(self.name.to_string()))
    }

    /// Cell text; error when the column is absent.
    pub(crate) fn text(&self, row: &RawRow) -> CleanResult<Option<String>> {
        Ok(row.get(self.index()?).map(String::from))
    }

    /// Cell text; `None` when the column is absent.
    pub(crate) fn optional_text(&self, row: &RawRow) -> Option<String> {
        self.index.and_then(|i| row.get(i)).map(String::from)
    }

    /// Parsed timestamp; missing cells are `None`, bad values an error.
    pub(crate) fn timestamp(&self, row: &RawRow) -> CleanResult<Option<NaiveDateTime>> {
        match row.get(self.index()?) {
            None => Ok(None),
            Some(raw) => parse_timestamp(raw)
                .map(Some)
                .ok_or_else(|| CleanError::InvalidDate {
                    column: self.name.to_string(),
                    line: row.line,
                    value: raw.to_string(),
                }),
        }
    }

    /// Parsed timestamp on a column already filtered for missing values.
    pub(crate) fn required_timestamp(&self, row: &RawRow) -> CleanResult<NaiveDateTime> {
        self.timestamp(row)?
            .ok_or_else(|| CleanError::MissingColumn(self.name.to_string()))
    }
}

// =============================================================================
// Batch
// =============================================================================

/// One uploaded file.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

/// What happened to one file of the batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSummary {
    pub name: String,
    /// `None` when the file was not recognized and ignored
    pub kind: Option<TableKind>,
    pub encoding: String,
    pub delimiter: String,
    pub columns: Vec<String>,
    pub raw_rows: usize,
    /// Rows left after cleaning; `None` for ignored files
    pub clean_rows: Option<usize>,
}

/// Result of cleaning one upload batch.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub tables: CleanedTables,
    pub files: Vec<FileSummary>,
    /// Names of files whose columns matched no known dataset
    pub ignored: Vec<String>,
}

/// Clean one recognized table into `tables`, replacing any earlier table of
/// the same kind. Returns the cleaned row count.
pub fn clean_table(
    kind: TableKind,
    raw: RawTable,
    tables: &mut CleanedTables,
) -> CleanResult<usize> {
    let rows = match kind {
        TableKind::Mql => {
            let t = clean_leads(raw)?;
            let n = t.len();
            tables.mql = Some(t);
            n
        }
        TableKind::Cld => {
            let t = clean_deals(raw)?;
            let n = t.len();
            tables.cld = Some(t);
            n
        }
        TableKind::Order => {
            let t = clean_orders(raw)?;
            let n = t.len();
            tables.order = Some(t);
            n
        }
    };
    Ok(rows)
}

/// Parse, classify and clean a batch of files, then build the merged table.
///
/// Unrecognized files are skipped. The first file that fails to parse or
/// clean aborts the batch with an error naming it.
pub fn clean_files(files: &[UploadedFile]) -> PipelineResult<BatchReport> {
    let mut report = BatchReport::default();

    log_info(format!("📖 Reading {} file(s)...", files.len()));

    for file in files {
        let parsed = parse_bytes_auto(&file.bytes).map_err(|source| PipelineError::Csv {
            file: file.name.clone(),
            source,
        })?;

        let raw_rows = parsed.table.len();
        let columns = parsed.table.headers.clone();
        let kind = classify(&parsed.table);

        let clean_rows = match kind {
            None => {
                log_warning(format!("{}: unrecognized columns, ignored", file.name));
                report.ignored.push(file.name.clone());
                None
            }
            Some(kind) => {
                if report.files.iter().any(|f| f.kind == Some(kind)) {
                    log_warning(format!(
                        "{}: replaces the {} table from an earlier file",
                        file.name, kind
                    ));
                }
                log_info(format!("{}: {} table, {} rows", file.name, kind, raw_rows));

                let n = clean_table(kind, parsed.table, &mut report.tables).map_err(|source| {
                    PipelineError::Clean {
                        file: file.name.clone(),
                        source,
                    }
                })?;
                log_success(format!("{}: {} rows after cleaning", file.name, n));
                Some(n)
            }
        };

        report.files.push(FileSummary {
            name: file.name.clone(),
            kind,
            encoding: parsed.encoding,
            delimiter: format_delimiter(parsed.delimiter).to_string(),
            columns,
            raw_rows,
            clean_rows,
        });
    }

    if let (Some(mql), Some(cld)) = (&report.tables.mql, &report.tables.cld) {
        let merged = merge_leads(&cld.rows, &mql.rows);
        log_success(format!("🔗 Merged {} lead-deal rows", merged.len()));
        report.tables.merged = Some(merged);
    }

    Ok(report)
}

/// Read and clean files from disk.
pub fn clean_paths<P: AsRef<Path>>(paths: &[P]) -> PipelineResult<BatchReport> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        files.push(UploadedFile::new(name, std::fs::read(path)?));
    }
    clean_files(&files)
}

/// Format delimiter for display
pub fn format_delimiter(d: char) -> &'static str {
    match d {
        ';' => ";",
        ',' => ",",
        '\t' => "TAB",
        '|' => "|",
        _ => "?",
    }
}
