//! Column-signature classification of uploaded files.

use crate::models::TableKind;
use crate::parser::RawTable;

/// Decide which dataset a table holds from its header.
///
/// - `mql_id` + `seller_id` → closed deals
/// - `mql_id` only → leads
/// - `order_id` (and no `mql_id`) → orders
/// - anything else → `None`, the file is ignored
pub fn classify(table: &RawTable) -> Option<TableKind> {
    classify_headers(&table.headers)
}

pub fn classify_headers(headers: &[String]) -> Option<TableKind> {
    let has = |name: &str| headers.iter().any(|h| h == name);

    if has("mql_id") {
        if has("seller_id") {
            Some(TableKind::Cld)
        } else {
            Some(TableKind::Mql)
        }
    } else if has("order_id") {
        Some(TableKind::Order)
    } else {
        None
    }
}
