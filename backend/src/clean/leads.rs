//! Lead (MQL) cleaner.

use super::Column;
use crate::error::CleanResult;
use crate::models::{Lead, LeadTable};
use crate::parser::RawTable;

pub(crate) const KNOWN_COLUMNS: &[&str] = &["mql_id", "first_contact_date", "origin"];

/// Drop leads without an `origin` and parse `first_contact_date`.
pub fn clean_leads(mut table: RawTable) -> CleanResult<LeadTable> {
    table.drop_missing(&["origin"]);

    let mql_id = Column::resolve(&table, "mql_id");
    let first_contact = Column::resolve(&table, "first_contact_date");
    let origin = Column::resolve(&table, "origin");
    let extras = table.extra_columns(KNOWN_COLUMNS);

    let mut rows = Vec::with_capacity(table.len());
    for row in &table.rows {
        rows.push(Lead {
            mql_id: mql_id.text(row)?.unwrap_or_default(),
            first_contact_date: first_contact.timestamp(row)?,
            origin: origin.text(row)?.unwrap_or_default(),
            extra: extras.iter().map(|(i, _)| row.get(*i).map(String::from)).collect(),
        });
    }

    Ok(LeadTable::new(
        extras.into_iter().map(|(_, name)| name).collect(),
        rows,
    ))
}
