//! CSV reader with encoding and delimiter auto-detection.
//!
//! Produces a [`RawTable`]: header names plus string cells, missing cells
//! normalized to `None`. No funnel-specific logic here.

pub mod table;

pub use table::{is_missing, normalize_cell, RawRow, RawTable};

use std::io::Read;
use std::path::Path;

/// CSV parsing error with context
#[derive(Debug, Clone)]
pub struct CsvError {
    pub line: usize,
    pub column: Option<String>,
    pub value: Option<String>,
    pub message: String,
}

impl std::fmt::Display for CsvError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.column, &self.value) {
            (Some(col), Some(val)) => {
                write!(f, "Line {}, column '{}' (value '{}'): {}", self.line, col, val, self.message)
            }
            (Some(col), None) => {
                write!(f, "Line {}, column '{}': {}", self.line, col, self.message)
            }
            _ => {
                write!(f, "Line {}: {}", self.line, self.message)
            }
        }
    }
}

impl std::error::Error for CsvError {}

impl CsvError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column: None,
            value: None,
            message: message.into(),
        }
    }

    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

impl From<csv::Error> for CsvError {
    fn from(e: csv::Error) -> Self {
        let line = e
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(0);
        CsvError::new(line, e.to_string())
    }
}

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Parsed table
    pub table: RawTable,
    /// Detected or used encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding.
///
/// Unknown encodings fall back to lossy UTF-8. A leading byte-order mark is
/// stripped.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    let content = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => match std::str::from_utf8(bytes) {
            Ok(s) => s.to_string(),
            Err(_) => String::from_utf8_lossy(bytes).to_string(),
        },
        "iso-8859-1" | "latin-1" | "latin1" => {
            encoding_rs::ISO_8859_15.decode(bytes).0.to_string()
        }
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.to_string(),
        _ => String::from_utf8_lossy(bytes).to_string(),
    };

    match content.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => content,
    }
}

/// Detect the delimiter by counting occurrences in the first line.
///
/// Comma wins ties, including the zero-count case of a single-column file.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse CSV from a reader into a [`RawTable`].
///
/// Rows shorter than the header are padded with missing cells, longer rows
/// are truncated. Blank lines are skipped.
pub fn parse_csv<R: Read>(reader: R, delimiter: char) -> Result<RawTable, CsvError> {
    let delimiter = u8::try_from(delimiter)
        .map_err(|_| CsvError::new(0, format!("Unsupported delimiter '{}'", delimiter)))?;

    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.is_empty() || headers.iter().all(String::is_empty) {
        return Err(CsvError::new(1, "Empty CSV file"));
    }

    let mut table = RawTable::new(headers);

    for result in rdr.records() {
        let record = result?;
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(table.len() + 2);

        if record.iter().all(|c| c.trim().is_empty()) {
            continue;
        }

        table.push_row(line, record.iter().map(normalize_cell).collect());
    }

    Ok(table)
}

/// Parse a CSV string with an explicit delimiter.
///
/// # Example
/// ```ignore
/// use funnel::parser::csv_to_table;
///
/// let table = csv_to_table("mql_id,origin\nm1,paid_search", ',').unwrap();
/// assert_eq!(table.headers, vec!["mql_id", "origin"]);
/// assert_eq!(table.rows[0].get(1), Some("paid_search"));
/// ```
pub fn csv_to_table(csv: &str, delimiter: char) -> Result<RawTable, CsvError> {
    parse_csv(csv.as_bytes(), delimiter)
}

/// Parse CSV bytes with auto-detection of encoding and delimiter.
pub fn parse_bytes_auto(bytes: &[u8]) -> Result<ParseResult, CsvError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(CsvError::new(1, "Empty CSV file"));
    }

    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    let delimiter = detect_delimiter(&content);
    let table = parse_csv(content.as_bytes(), delimiter)?;

    Ok(ParseResult {
        table,
        encoding,
        delimiter,
    })
}

/// Parse a CSV file with auto-detection of encoding and delimiter.
pub fn parse_csv_file_auto<P: AsRef<Path>>(path: P) -> Result<ParseResult, CsvError> {
    let bytes = std::fs::read(path.as_ref())
        .map_err(|e| CsvError::new(0, format!("Cannot read file: {}", e)))?;

    parse_bytes_auto(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_csv() {
        let table = csv_to_table("mql_id,origin\nm1,organic_search\nm2,paid_search", ',').unwrap();

        assert_eq!(table.headers, vec!["mql_id", "origin"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0].get(1), Some("organic_search"));
        assert_eq!(table.rows[1].get(0), Some("m2"));
    }

    #[test]
    fn test_quoted_values_with_delimiter() {
        let csv = "order_id,note\no1,\"late, but fine\"";
        let table = csv_to_table(csv, ',').unwrap();
        assert_eq!(table.rows[0].get(1), Some("late, but fine"));
    }

    #[test]
    fn test_missing_values_normalized() {
        let table = csv_to_table("a,b,c\n1,,NaN", ',').unwrap();
        assert_eq!(table.rows[0].get(0), Some("1"));
        assert_eq!(table.rows[0].get(1), None);
        assert_eq!(table.rows[0].get(2), None);
    }

    #[test]
    fn test_empty_lines_skipped() {
        let table = csv_to_table("a,b\n1,2\n\n3,4\n", ',').unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_line_numbers_tracked() {
        let table = csv_to_table("a,b\n1,2\n3,4", ',').unwrap();
        assert_eq!(table.rows[0].line, 2);
        assert_eq!(table.rows[1].line, 3);
    }

    #[test]
    fn test_empty_csv_error() {
        assert!(parse_bytes_auto(b"").is_err());
        assert!(parse_bytes_auto(b"  \n").is_err());
    }

    #[test]
    fn test_error_message_format() {
        let err = CsvError::new(5, "Invalid value")
            .with_column("won_date")
            .with_value("abc");

        let msg = err.to_string();
        assert!(msg.contains("Line 5"));
        assert!(msg.contains("column 'won_date'"));
        assert!(msg.contains("value 'abc'"));
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
        assert_eq!(detect_delimiter("a\tb\tc\n1\t2\t3"), '\t');
        assert_eq!(detect_delimiter("a|b|c\n1|2|3"), '|');
        assert_eq!(detect_delimiter("single\nvalue"), ',');
    }

    #[test]
    fn test_auto_parse_semicolon() {
        let result = parse_bytes_auto(b"mql_id;origin\nm1;social").unwrap();
        assert_eq!(result.delimiter, ';');
        assert_eq!(result.table.headers, vec!["mql_id", "origin"]);
        assert_eq!(result.table.len(), 1);
    }

    #[test]
    fn test_bom_stripped() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"mql_id,origin\nm1,email");
        let result = parse_bytes_auto(&bytes).unwrap();
        assert_eq!(result.table.headers[0], "mql_id");
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1");
        assert_eq!(decoded, "Société");
    }
}
