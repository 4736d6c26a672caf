//! Headline KPI cards.

use serde::{Deserialize, Serialize};

use super::charts::mean;
use super::filters::FilteredView;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Kpis {
    pub total_mqls: usize,
    pub closed_deals: usize,
    /// Closed deals per hundred leads; 0 without leads
    pub conversion_rate: f64,
    /// Mean days to close over the filtered merged rows; 0 when empty
    pub avg_time_to_close: f64,
}

/// `part / whole * 100`, or 0 when `whole` is 0.
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

pub fn compute_kpis(view: &FilteredView<'_>) -> Kpis {
    let total_mqls = view.leads.len();
    let closed_deals = view.deals.len();
    let durations: Vec<i64> = view.merged.iter().filter_map(|m| m.time_to_close).collect();

    Kpis {
        total_mqls,
        closed_deals,
        conversion_rate: percentage(closed_deals, total_mqls),
        avg_time_to_close: mean(&durations).unwrap_or(0.0),
    }
}
