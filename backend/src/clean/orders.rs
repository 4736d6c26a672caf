//! Order cleaner.

use super::Column;
use crate::error::CleanResult;
use crate::models::{Order, OrderTable};
use crate::parser::RawTable;

pub(crate) const KNOWN_COLUMNS: &[&str] = &[
    "order_id",
    "order_status",
    "order_purchase_timestamp",
    "order_approved_at",
    "order_delivered_carrier_date",
    "order_delivered_customer_date",
    "order_estimated_delivery_date",
];

/// Drop orders that were never approved or handed to a carrier, then parse
/// the timestamp columns.
///
/// `order_estimated_delivery_date` is optional: when the column is absent the
/// estimate is left empty on every row.
pub fn clean_orders(mut table: RawTable) -> CleanResult<OrderTable> {
    table.drop_missing(&["order_approved_at", "order_delivered_carrier_date"]);

    let order_id = Column::resolve(&table, "order_id");
    let status = Column::resolve(&table, "order_status");
    let purchase = Column::resolve(&table, "order_purchase_timestamp");
    let approved = Column::resolve(&table, "order_approved_at");
    let carrier = Column::resolve(&table, "order_delivered_carrier_date");
    let customer = Column::resolve(&table, "order_delivered_customer_date");
    let estimated = Column::resolve(&table, "order_estimated_delivery_date");
    let extras = table.extra_columns(KNOWN_COLUMNS);

    let mut rows = Vec::with_capacity(table.len());
    for row in &table.rows {
        rows.push(Order {
            order_id: order_id.text(row)?.unwrap_or_default(),
            order_status: status.optional_text(row),
            order_purchase_timestamp: purchase.timestamp(row)?,
            order_approved_at: approved.required_timestamp(row)?,
            order_delivered_carrier_date: carrier.required_timestamp(row)?,
            order_delivered_customer_date: customer.timestamp(row)?,
            order_estimated_delivery_date: if estimated.is_present() {
                estimated.timestamp(row)?
            } else {
                None
            },
            extra: extras.iter().map(|(i, _)| row.get(*i).map(String::from)).collect(),
        });
    }

    Ok(OrderTable::new(
        extras.into_iter().map(|(_, name)| name).collect(),
        rows,
    ))
}
