//! Write cleaned tables back out as CSV.

use chrono::NaiveDateTime;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::PipelineResult;
use crate::models::{CleanedTables, ClosedDeal, Lead, MergedLead, Order};

/// Fractional seconds are written only when non-zero.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// A row that can be written as one CSV record.
pub trait CsvRow {
    /// Typed column names, written before the extra columns.
    const COLUMNS: &'static [&'static str];

    fn fields(&self) -> Vec<String>;

    fn extra(&self) -> &[Option<String>] {
        &[]
    }
}

fn ts(value: Option<NaiveDateTime>) -> String {
    value
        .map(|t| t.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_default()
}

fn opt(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

impl CsvRow for Lead {
    const COLUMNS: &'static [&'static str] = &["mql_id", "first_contact_date", "origin"];

    fn fields(&self) -> Vec<String> {
        vec![
            self.mql_id.clone(),
            ts(self.first_contact_date),
            self.origin.clone(),
        ]
    }

    fn extra(&self) -> &[Option<String>] {
        &self.extra
    }
}

impl CsvRow for ClosedDeal {
    const COLUMNS: &'static [&'static str] = &[
        "mql_id",
        "seller_id",
        "sdr_id",
        "sr_id",
        "won_date",
        "business_segment",
        "lead_type",
        "lead_behaviour_profile",
        "business_type",
    ];

    fn fields(&self) -> Vec<String> {
        vec![
            self.mql_id.clone(),
            opt(&self.seller_id),
            opt(&self.sdr_id),
            opt(&self.sr_id),
            ts(self.won_date),
            self.business_segment.clone(),
            self.lead_type.clone(),
            self.lead_behaviour_profile.to_string(),
            self.business_type.clone(),
        ]
    }

    fn extra(&self) -> &[Option<String>] {
        &self.extra
    }
}

impl CsvRow for Order {
    const COLUMNS: &'static [&'static str] = &[
        "order_id",
        "order_status",
        "order_purchase_timestamp",
        "order_approved_at",
        "order_delivered_carrier_date",
        "order_delivered_customer_date",
        "order_estimated_delivery_date",
    ];

    fn fields(&self) -> Vec<String> {
        vec![
            self.order_id.clone(),
            opt(&self.order_status),
            ts(self.order_purchase_timestamp),
            ts(Some(self.order_approved_at)),
            ts(Some(self.order_delivered_carrier_date)),
            ts(self.order_delivered_customer_date),
            ts(self.order_estimated_delivery_date),
        ]
    }

    fn extra(&self) -> &[Option<String>] {
        &self.extra
    }
}

impl CsvRow for MergedLead {
    const COLUMNS: &'static [&'static str] = &[
        "mql_id",
        "won_date",
        "business_segment",
        "lead_type",
        "first_contact_date",
        "origin",
        "time_to_close",
    ];

    fn fields(&self) -> Vec<String> {
        vec![
            self.mql_id.clone(),
            ts(self.won_date),
            self.business_segment.clone(),
            self.lead_type.clone(),
            ts(self.first_contact_date),
            self.origin.clone(),
            self.time_to_close.map(|d| d.to_string()).unwrap_or_default(),
        ]
    }
}

/// Write `rows` with the typed columns first, then `extra_columns`.
pub fn write_rows<R: CsvRow, W: io::Write>(
    writer: W,
    extra_columns: &[String],
    rows: &[R],
) -> io::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    let header = R::COLUMNS
        .iter()
        .map(|c| c.to_string())
        .chain(extra_columns.iter().cloned());
    wtr.write_record(header)?;

    for row in rows {
        let extra = row.extra().iter().map(opt);
        wtr.write_record(row.fields().into_iter().chain(extra))?;
    }

    wtr.flush()
}

fn write_file<R: CsvRow>(
    path: PathBuf,
    extra_columns: &[String],
    rows: &[R],
    written: &mut Vec<PathBuf>,
) -> io::Result<()> {
    let file = std::fs::File::create(&path)?;
    write_rows(file, extra_columns, rows)?;
    written.push(path);
    Ok(())
}

/// Write `mql.csv`, `cld.csv`, `order.csv` and `merged.csv` into `dir` for
/// the tables that exist. Returns the written paths.
pub fn write_tables(tables: &CleanedTables, dir: &Path) -> PipelineResult<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::new();

    if let Some(t) = &tables.mql {
        write_file(dir.join("mql.csv"), &t.extra_columns, &t.rows, &mut written)?;
    }
    if let Some(t) = &tables.cld {
        write_file(dir.join("cld.csv"), &t.extra_columns, &t.rows, &mut written)?;
    }
    if let Some(t) = &tables.order {
        write_file(dir.join("order.csv"), &t.extra_columns, &t.rows, &mut written)?;
    }
    if let Some(rows) = &tables.merged {
        write_file(dir.join("merged.csv"), &[], rows, &mut written)?;
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clean::parse_timestamp;
    use crate::models::Table;

    fn lead(id: &str, page: Option<&str>) -> Lead {
        Lead {
            mql_id: id.into(),
            first_contact_date: parse_timestamp("2021-01-01"),
            origin: "ads".into(),
            extra: vec![page.map(String::from)],
        }
    }

    #[test]
    fn test_write_rows_with_extras() {
        let mut buf = Vec::new();
        write_rows(
            &mut buf,
            &["landing_page_id".to_string()],
            &[lead("1", Some("lp1")), lead("2", None)],
        )
        .unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "mql_id,first_contact_date,origin,landing_page_id\n\
             1,2021-01-01 00:00:00,ads,lp1\n\
             2,2021-01-01 00:00:00,ads,\n"
        );
    }

    #[test]
    fn test_fractional_seconds_survive_export() {
        let stamp = parse_timestamp("2021-01-01 10:15:30.250").unwrap();
        let row = Lead {
            first_contact_date: Some(stamp),
            extra: vec![],
            ..lead("1", None)
        };
        let mut buf = Vec::new();
        write_rows(&mut buf, &[], &[row]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().nth(1), Some("1,2021-01-01 10:15:30.250,ads"));

        let written = text.lines().nth(1).unwrap().split(',').nth(1).unwrap();
        assert_eq!(parse_timestamp(written), Some(stamp));
    }

    #[test]
    fn test_write_tables_only_present() {
        let dir = tempfile::tempdir().unwrap();
        let tables = CleanedTables {
            mql: Some(Table::new(vec!["landing_page_id".into()], vec![lead("1", None)])),
            ..CleanedTables::default()
        };
        let written = write_tables(&tables, dir.path()).unwrap();
        assert_eq!(written, vec![dir.path().join("mql.csv")]);
        assert!(!dir.path().join("cld.csv").exists());
    }
}
