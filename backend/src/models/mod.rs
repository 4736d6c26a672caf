//! Domain models for the funnel cleaning pipeline.
//!
//! - [`TableKind`] - Which dataset an uploaded file holds
//! - [`Lead`] - Marketing-qualified lead (MQL)
//! - [`ClosedDeal`] - Won deal (CLD)
//! - [`Order`] - Marketplace order
//! - [`MergedLead`] - Lead joined with its closed deal
//! - [`Table`] - Typed rows plus the input columns kept verbatim
//! - [`CleanedTables`] - Everything one upload batch produces

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Table Kind
// =============================================================================

/// Dataset kind, decided from the column signature of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableKind {
    /// Marketing-qualified leads
    Mql,
    /// Closed deals
    Cld,
    /// Orders
    Order,
}

impl TableKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableKind::Mql => "mql",
            TableKind::Cld => "cld",
            TableKind::Order => "order",
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Lead Behaviour Profile
// =============================================================================

/// DISC-style behaviour profile recorded for a closed deal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BehaviourProfile {
    Cat,
    Eagle,
    Shark,
    Wolf,
}

impl BehaviourProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            BehaviourProfile::Cat => "cat",
            BehaviourProfile::Eagle => "eagle",
            BehaviourProfile::Shark => "shark",
            BehaviourProfile::Wolf => "wolf",
        }
    }
}

impl FromStr for BehaviourProfile {
    type Err = ();

    /// Exact match only: mixed values such as `"cat, wolf"` are not a profile.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cat" => Ok(BehaviourProfile::Cat),
            "eagle" => Ok(BehaviourProfile::Eagle),
            "shark" => Ok(BehaviourProfile::Shark),
            "wolf" => Ok(BehaviourProfile::Wolf),
            _ => Err(()),
        }
    }
}

impl fmt::Display for BehaviourProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Records
// =============================================================================

/// A marketing-qualified lead.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lead {
    pub mql_id: String,
    pub first_contact_date: Option<NaiveDateTime>,
    /// Marketing channel, never missing after cleaning
    pub origin: String,
    /// Values of [`Table::extra_columns`]
    pub extra: Vec<Option<String>>,
}

/// A closed (won) deal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClosedDeal {
    pub mql_id: String,
    pub seller_id: Option<String>,
    pub sdr_id: Option<String>,
    pub sr_id: Option<String>,
    pub won_date: Option<NaiveDateTime>,
    pub business_segment: String,
    pub lead_type: String,
    pub business_type: String,
    pub lead_behaviour_profile: BehaviourProfile,
    pub extra: Vec<Option<String>>,
}

/// A marketplace order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    pub order_id: String,
    pub order_status: Option<String>,
    pub order_purchase_timestamp: Option<NaiveDateTime>,
    pub order_approved_at: NaiveDateTime,
    pub order_delivered_carrier_date: NaiveDateTime,
    pub order_delivered_customer_date: Option<NaiveDateTime>,
    pub order_estimated_delivery_date: Option<NaiveDateTime>,
    pub extra: Vec<Option<String>>,
}

impl Order {
    pub fn is_delivered(&self) -> bool {
        self.order_status.as_deref() == Some("delivered")
    }
}

/// A closed deal joined with its lead.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedLead {
    pub mql_id: String,
    pub won_date: Option<NaiveDateTime>,
    pub business_segment: String,
    pub lead_type: String,
    pub first_contact_date: Option<NaiveDateTime>,
    pub origin: String,
    /// Whole days from first contact to won date, floored. May be negative.
    pub time_to_close: Option<i64>,
}

// =============================================================================
// Tables
// =============================================================================

/// Typed rows plus the names of the input columns carried along verbatim.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table<R> {
    pub extra_columns: Vec<String>,
    pub rows: Vec<R>,
}

impl<R> Table<R> {
    pub fn new(extra_columns: Vec<String>, rows: Vec<R>) -> Self {
        Self {
            extra_columns,
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<R> Default for Table<R> {
    fn default() -> Self {
        Self {
            extra_columns: Vec::new(),
            rows: Vec::new(),
        }
    }
}

pub type LeadTable = Table<Lead>;
pub type DealTable = Table<ClosedDeal>;
pub type OrderTable = Table<Order>;

/// Everything one upload batch produces. A table is `None` when no file of
/// that kind was uploaded; `merged` exists only when both leads and deals do.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CleanedTables {
    pub mql: Option<LeadTable>,
    pub cld: Option<DealTable>,
    pub order: Option<OrderTable>,
    pub merged: Option<Vec<MergedLead>>,
}

impl CleanedTables {
    pub fn is_empty(&self) -> bool {
        self.mql.is_none() && self.cld.is_none() && self.order.is_none()
    }

    /// Row counts per table, for summaries.
    pub fn row_counts(&self) -> TableCounts {
        TableCounts {
            mql: self.mql.as_ref().map(Table::len),
            cld: self.cld.as_ref().map(Table::len),
            order: self.order.as_ref().map(Table::len),
            merged: self.merged.as_ref().map(Vec::len),
        }
    }
}

/// Row counts of the cleaned tables; `None` for absent tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCounts {
    pub mql: Option<usize>,
    pub cld: Option<usize>,
    pub order: Option<usize>,
    pub merged: Option<usize>,
}
