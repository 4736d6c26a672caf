//! In-memory raw table: a header row plus string cells, with missing cells
//! already normalized to `None`.

use serde::Serialize;

/// Conventional NA markers that read as a missing cell.
const NA_MARKERS: &[&str] = &[
    "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "null", "NULL", "None", "<NA>", "#N/A",
    "#NA", "#N/A N/A", "-1.#IND", "-1.#QNAN", "1.#IND", "1.#QNAN",
];

/// Returns true when a raw cell should be treated as missing: empty, or
/// exactly one of the NA markers.
pub fn is_missing(raw: &str) -> bool {
    raw.is_empty() || NA_MARKERS.contains(&raw)
}

/// Normalize a raw cell: the text as written, or `None` when missing.
///
/// Surrounding whitespace is kept, so `" cat"` is not the profile `cat`.
pub fn normalize_cell(raw: &str) -> Option<String> {
    if is_missing(raw) {
        None
    } else {
        Some(raw.to_string())
    }
}

/// A single data row with its line number in the source file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawRow {
    /// 1-based line in the source file (header is line 1)
    pub line: usize,
    /// Cells aligned with [`RawTable::headers`]
    pub cells: Vec<Option<String>>,
}

impl RawRow {
    /// Cell at `idx`, `None` when missing or out of range.
    pub fn get(&self, idx: usize) -> Option<&str> {
        self.cells.get(idx).and_then(|c| c.as_deref())
    }
}

/// Untyped table read from a CSV file.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Append a row, padding or truncating it to the header width.
    pub fn push_row(&mut self, line: usize, mut cells: Vec<Option<String>>) {
        cells.resize(self.headers.len(), None);
        self.rows.push(RawRow { line, cells });
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Position of the first column named `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Keep only rows where every column in `subset` has a value.
    ///
    /// A column absent from the header counts as missing in every row.
    pub fn drop_missing(&mut self, subset: &[&str]) {
        let indices: Vec<Option<usize>> = subset.iter().map(|c| self.column_index(c)).collect();
        if indices.iter().any(Option::is_none) {
            self.rows.clear();
            return;
        }
        let indices: Vec<usize> = indices.into_iter().flatten().collect();
        self.rows
            .retain(|row| indices.iter().all(|&i| row.get(i).is_some()));
    }

    /// Remove the named columns. Every name must exist; on error the table is
    /// left untouched and the first absent name is returned.
    pub fn drop_columns(&mut self, names: &[&str]) -> Result<(), String> {
        let mut indices = Vec::with_capacity(names.len());
        for name in names {
            let idx = self
                .column_index(name)
                .ok_or_else(|| (*name).to_string())?;
            indices.push(idx);
        }

        let keep: Vec<bool> = (0..self.headers.len())
            .map(|i| !indices.contains(&i))
            .collect();

        self.headers = self
            .headers
            .drain(..)
            .zip(&keep)
            .filter_map(|(h, &k)| k.then_some(h))
            .collect();

        for row in &mut self.rows {
            row.cells = row
                .cells
                .drain(..)
                .zip(&keep)
                .filter_map(|(c, &k)| k.then_some(c))
                .collect();
        }
        Ok(())
    }

    /// Columns not listed in `known`, in header order, with their indices.
    pub fn extra_columns(&self, known: &[&str]) -> Vec<(usize, String)> {
        self.headers
            .iter()
            .enumerate()
            .filter(|(_, h)| !known.contains(&h.as_str()))
            .map(|(i, h)| (i, h.clone()))
            .collect()
    }
}
