//! The five chart panels of the dashboard.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::charts::{count_by, histogram, Bar, BarChart, Histogram, Indicator, PieChart, PieSlice};
use super::filters::FilteredView;
use super::kpi::percentage;
use crate::clean::days_between;

pub const HISTOGRAM_BINS: usize = 20;
pub const TOP_REPS: usize = 10;

/// Upper-inclusive day edges of the closing-velocity segments.
const VELOCITY_EDGES: [i64; 6] = [0, 7, 15, 30, 60, 365];
const VELOCITY_LABELS: [&str; 5] = ["0-7 days", "8-15 days", "16-30 days", "31-60 days", "60+ days"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionPanel {
    pub overall: PieChart,
    pub by_channel: Option<BarChart>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessPanel {
    pub by_segment: BarChart,
    pub by_lead_type: BarChart,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimePanel {
    pub closing_time: Option<Histogram>,
    pub velocity: Option<BarChart>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamPanel {
    pub top_sdrs: Option<BarChart>,
    pub top_srs: Option<BarChart>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPanel {
    pub delivery_time: Option<Histogram>,
    pub delayed: Option<Indicator>,
}

// =============================================================================
// Conversion
// =============================================================================

pub fn conversion_panel(view: &FilteredView<'_>) -> ConversionPanel {
    let closed = view.deals.len();
    let overall = PieChart {
        title: "Overall Conversion Rate".into(),
        slices: vec![
            PieSlice {
                label: "Converted".into(),
                value: closed,
            },
            PieSlice {
                label: "Not Converted".into(),
                value: view.leads.len().saturating_sub(closed),
            },
        ],
    };

    let by_channel = (!view.merged.is_empty()).then(|| {
        BarChart::new(
            "Conversion Rate by Marketing Channel",
            conversion_by_channel(view),
        )
    });

    ConversionPanel { overall, by_channel }
}

/// Merged rows per origin divided by leads per origin, highest first.
///
/// Only origins present on both sides get a rate; ties sort by name.
pub fn conversion_by_channel(view: &FilteredView<'_>) -> Vec<Bar> {
    let mut leads: HashMap<&str, usize> = HashMap::new();
    for lead in &view.leads {
        *leads.entry(lead.origin.as_str()).or_insert(0) += 1;
    }
    let mut closed: HashMap<&str, usize> = HashMap::new();
    for row in &view.merged {
        *closed.entry(row.origin.as_str()).or_insert(0) += 1;
    }

    let mut origins: Vec<&str> = closed
        .keys()
        .copied()
        .filter(|o| leads.contains_key(o))
        .collect();
    origins.sort_unstable();

    let mut bars: Vec<Bar> = origins
        .into_iter()
        .map(|o| Bar {
            label: o.to_string(),
            value: closed[o] as f64 / leads[o] as f64,
        })
        .collect();
    bars.sort_by(|a, b| b.value.total_cmp(&a.value));
    bars
}

// =============================================================================
// Business
// =============================================================================

pub fn business_panel(view: &FilteredView<'_>) -> BusinessPanel {
    BusinessPanel {
        by_segment: BarChart::from_counts(
            "Closed Deals by Business Segment",
            count_by(view.deals.iter().map(|d| d.business_segment.as_str())),
        ),
        by_lead_type: BarChart::from_counts(
            "Closed Deals by Lead Type",
            count_by(view.deals.iter().map(|d| d.lead_type.as_str())),
        ),
    }
}

// =============================================================================
// Time
// =============================================================================

pub fn time_panel(view: &FilteredView<'_>) -> TimePanel {
    if view.merged.is_empty() {
        return TimePanel {
            closing_time: None,
            velocity: None,
        };
    }

    let durations: Vec<i64> = view.merged.iter().filter_map(|m| m.time_to_close).collect();

    TimePanel {
        closing_time: Some(histogram(
            "Deal Closing Time Distribution",
            &durations,
            HISTOGRAM_BINS,
        )),
        velocity: Some(BarChart::from_counts(
            "Conversion Velocity by Time Segments",
            velocity_segments(&durations),
        )),
    }
}

/// Segment label for a closing time; `None` outside (0, 365] days.
pub fn velocity_segment(days: i64) -> Option<&'static str> {
    VELOCITY_EDGES
        .windows(2)
        .position(|w| days > w[0] && days <= w[1])
        .map(|i| VELOCITY_LABELS[i])
}

/// Counts for every segment, largest first; ties keep segment order.
pub fn velocity_segments(durations: &[i64]) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = VELOCITY_LABELS
        .iter()
        .map(|l| (l.to_string(), 0))
        .collect();

    for &d in durations {
        if let Some(label) = velocity_segment(d) {
            if let Some(slot) = counts.iter_mut().find(|(l, _)| l == label) {
                slot.1 += 1;
            }
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

// =============================================================================
// Team
// =============================================================================

pub fn team_panel(view: &FilteredView<'_>) -> TeamPanel {
    if view.deals.is_empty() {
        return TeamPanel {
            top_sdrs: None,
            top_srs: None,
        };
    }

    let top = |title: &str, ids: Vec<&str>| {
        let mut counts = count_by(ids);
        counts.truncate(TOP_REPS);
        BarChart::from_counts(title, counts)
    };

    TeamPanel {
        top_sdrs: Some(top(
            "Top 10 SDRs by Closed Deals",
            view.deals.iter().filter_map(|d| d.sdr_id.as_deref()).collect(),
        )),
        top_srs: Some(top(
            "Top 10 SRs by Closed Deals",
            view.deals.iter().filter_map(|d| d.sr_id.as_deref()).collect(),
        )),
    }
}

// =============================================================================
// Orders
// =============================================================================

pub fn order_panel(view: &FilteredView<'_>) -> OrderPanel {
    if view.orders.is_empty() {
        return OrderPanel {
            delivery_time: None,
            delayed: None,
        };
    }

    let delivered: Vec<_> = view.orders.iter().filter(|o| o.is_delivered()).collect();

    let delivery_days: Vec<i64> = delivered
        .iter()
        .filter_map(|o| match (o.order_delivered_customer_date, o.order_purchase_timestamp) {
            (Some(done), Some(bought)) => Some(days_between(done, bought)),
            _ => None,
        })
        .collect();

    let late = delivered
        .iter()
        .filter(|o| match (o.order_delivered_customer_date, o.order_estimated_delivery_date) {
            (Some(done), Some(eta)) => done > eta,
            _ => false,
        })
        .count();

    OrderPanel {
        delivery_time: Some(histogram(
            "Delivery Time Distribution",
            &delivery_days,
            HISTOGRAM_BINS,
        )),
        delayed: Some(Indicator {
            title: "Delayed Orders Percentage".into(),
            value: percentage(late, delivered.len()),
            suffix: "%".into(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clean::parse_timestamp;
    use crate::models::{BehaviourProfile, ClosedDeal, Lead, MergedLead, Order};

    fn lead(id: &str, origin: &str) -> Lead {
        Lead {
            mql_id: id.into(),
            first_contact_date: parse_timestamp("2021-01-01"),
            origin: origin.into(),
            extra: vec![],
        }
    }

    fn deal(id: &str, segment: &str, sdr: Option<&str>) -> ClosedDeal {
        ClosedDeal {
            mql_id: id.into(),
            seller_id: None,
            sdr_id: sdr.map(String::from),
            sr_id: Some("sr-1".into()),
            won_date: parse_timestamp("2021-01-10"),
            business_segment: segment.into(),
            lead_type: "online_big".into(),
            business_type: "reseller".into(),
            lead_behaviour_profile: BehaviourProfile::Cat,
            extra: vec![],
        }
    }

    fn merged(id: &str, origin: &str, days: Option<i64>) -> MergedLead {
        MergedLead {
            mql_id: id.into(),
            won_date: None,
            business_segment: "retail".into(),
            lead_type: "online_big".into(),
            first_contact_date: None,
            origin: origin.into(),
            time_to_close: days,
        }
    }

    fn order(status: &str, purchase: &str, delivered: &str, eta: &str) -> Order {
        Order {
            order_id: "o".into(),
            order_status: Some(status.into()),
            order_purchase_timestamp: parse_timestamp(purchase),
            order_approved_at: parse_timestamp(purchase).unwrap(),
            order_delivered_carrier_date: parse_timestamp(purchase).unwrap(),
            order_delivered_customer_date: parse_timestamp(delivered),
            order_estimated_delivery_date: parse_timestamp(eta),
            extra: vec![],
        }
    }

    #[test]
    fn test_conversion_by_channel() {
        let leads = vec![lead("1", "ads"), lead("2", "ads"), lead("3", "social"), lead("4", "email")];
        let rows = vec![merged("1", "ads", Some(1)), merged("3", "social", Some(2)), merged("9", "direct", Some(3))];
        let view = FilteredView {
            leads: leads.iter().collect(),
            merged: rows.iter().collect(),
            ..FilteredView::default()
        };
        let bars = conversion_by_channel(&view);
        let pairs: Vec<(&str, f64)> = bars.iter().map(|b| (b.label.as_str(), b.value)).collect();
        assert_eq!(pairs, vec![("social", 1.0), ("ads", 0.5)]);
    }

    #[test]
    fn test_overall_pie_floors_at_zero() {
        let deals = vec![deal("1", "a", None), deal("2", "a", None)];
        let leads = vec![lead("1", "ads")];
        let view = FilteredView {
            leads: leads.iter().collect(),
            deals: deals.iter().collect(),
            ..FilteredView::default()
        };
        let panel = conversion_panel(&view);
        assert_eq!(panel.overall.slices[0].value, 2);
        assert_eq!(panel.overall.slices[1].value, 0);
        assert!(panel.by_channel.is_none());
    }

    #[test]
    fn test_velocity_segments_are_right_closed() {
        assert_eq!(velocity_segment(0), None);
        assert_eq!(velocity_segment(1), Some("0-7 days"));
        assert_eq!(velocity_segment(7), Some("0-7 days"));
        assert_eq!(velocity_segment(8), Some("8-15 days"));
        assert_eq!(velocity_segment(60), Some("31-60 days"));
        assert_eq!(velocity_segment(365), Some("60+ days"));
        assert_eq!(velocity_segment(366), None);
        assert_eq!(velocity_segment(-3), None);
    }

    #[test]
    fn test_velocity_lists_all_segments() {
        let counts = velocity_segments(&[3, 20, 25, 0, 400]);
        assert_eq!(
            counts,
            vec![
                ("16-30 days".to_string(), 2),
                ("0-7 days".to_string(), 1),
                ("8-15 days".to_string(), 0),
                ("31-60 days".to_string(), 0),
                ("60+ days".to_string(), 0),
            ]
        );
    }

    #[test]
    fn test_time_panel_hidden_without_merged_rows() {
        let panel = time_panel(&FilteredView::default());
        assert!(panel.closing_time.is_none());
        assert!(panel.velocity.is_none());
    }

    #[test]
    fn test_team_top_ten() {
        let ids: Vec<String> = (0..12).map(|i| format!("sdr-{i}")).collect();
        let mut deals: Vec<ClosedDeal> = ids.iter().map(|s| deal("x", "a", Some(s))).collect();
        deals.push(deal("y", "a", Some("sdr-11")));
        deals.push(deal("z", "a", None));
        let view = FilteredView {
            deals: deals.iter().collect(),
            ..FilteredView::default()
        };
        let panel = team_panel(&view);
        let sdrs = panel.top_sdrs.unwrap();
        assert_eq!(sdrs.bars.len(), TOP_REPS);
        assert_eq!(sdrs.bars[0].label, "sdr-11");
        assert_eq!(sdrs.bars[0].value, 2.0);
        assert_eq!(sdrs.bars[1].label, "sdr-0");
        let srs = panel.top_srs.unwrap();
        assert_eq!(srs.bars, vec![Bar { label: "sr-1".into(), value: 14.0 }]);
    }

    #[test]
    fn test_order_panel_delay_and_delivery() {
        let orders = vec![
            order("delivered", "2021-01-01", "2021-01-05", "2021-01-10"),
            order("delivered", "2021-01-01", "2021-01-12", "2021-01-10"),
            order("delivered", "2021-01-01", "", "2021-01-10"),
            order("shipped", "2021-01-01", "2021-01-30", "2021-01-10"),
        ];
        let view = FilteredView {
            orders: orders.iter().collect(),
            ..FilteredView::default()
        };
        let panel = order_panel(&view);
        let delayed = panel.delayed.unwrap();
        assert!((delayed.value - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(delayed.suffix, "%");
        let hist = panel.delivery_time.unwrap();
        assert_eq!(hist.mean, Some(7.5));
        assert_eq!(hist.bins.iter().map(|b| b.count).sum::<usize>(), 2);
    }

    #[test]
    fn test_order_panel_no_delivered_is_zero_percent() {
        let orders = vec![order("canceled", "2021-01-01", "", "")];
        let view = FilteredView {
            orders: orders.iter().collect(),
            ..FilteredView::default()
        };
        let panel = order_panel(&view);
        assert_eq!(panel.delayed.unwrap().value, 0.0);
        assert_eq!(panel.delivery_time.unwrap().mean, None);
    }
}
