//! Sidebar filters: date range and business-segment selection.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::{CleanedTables, ClosedDeal, Lead, MergedLead, Order};

/// Filter selection sent by the UI. Unset fields take their defaults:
/// the full lead date range and every observed segment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filters {
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// `None` selects all segments; `Some(vec![])` selects none
    #[serde(default)]
    pub segments: Option<Vec<String>>,
}

/// Date range whose ends both sit at midnight.
///
/// A timestamp later in the day than `max` falls outside the range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateBounds {
    pub min: NaiveDate,
    pub max: NaiveDate,
}

impl DateBounds {
    pub fn contains(&self, ts: Option<NaiveDateTime>) -> bool {
        let start = self.min.and_time(NaiveTime::MIN);
        let end = self.max.and_time(NaiveTime::MIN);
        ts.is_some_and(|t| t >= start && t <= end)
    }
}

/// Choices the UI offers, derived from the unfiltered tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterControls {
    /// Min/max lead first-contact date; `None` without dated leads
    pub date_bounds: Option<DateBounds>,
    /// Distinct deal segments in first-appearance order
    pub segment_options: Vec<String>,
}

impl FilterControls {
    pub fn from_tables(tables: &CleanedTables) -> Self {
        let date_bounds = tables.mql.as_ref().and_then(|mql| {
            let dates = mql
                .rows
                .iter()
                .filter_map(|l| l.first_contact_date.map(|d| d.date()));
            let (min, max) = dates.fold(None, |acc: Option<(NaiveDate, NaiveDate)>, d| match acc {
                None => Some((d, d)),
                Some((lo, hi)) => Some((lo.min(d), hi.max(d))),
            })?;
            Some(DateBounds { min, max })
        });

        let mut segment_options: Vec<String> = Vec::new();
        if let Some(cld) = &tables.cld {
            for deal in &cld.rows {
                if !segment_options.contains(&deal.business_segment) {
                    segment_options.push(deal.business_segment.clone());
                }
            }
        }

        Self {
            date_bounds,
            segment_options,
        }
    }
}

impl Filters {
    /// Fill unset fields from the controls' defaults.
    pub fn resolve(&self, controls: &FilterControls) -> Filters {
        Filters {
            start_date: self
                .start_date
                .or(controls.date_bounds.map(|b| b.min)),
            end_date: self.end_date.or(controls.date_bounds.map(|b| b.max)),
            segments: Some(
                self.segments
                    .clone()
                    .unwrap_or_else(|| controls.segment_options.clone()),
            ),
        }
    }

    /// Active date range, when both ends are known.
    pub fn date_range(&self) -> Option<DateBounds> {
        match (self.start_date, self.end_date) {
            (Some(min), Some(max)) => Some(DateBounds { min, max }),
            (Some(min), None) => Some(DateBounds {
                min,
                max: NaiveDate::MAX,
            }),
            (None, Some(max)) => Some(DateBounds {
                min: NaiveDate::MIN,
                max,
            }),
            (None, None) => None,
        }
    }
}

/// Rows of each table that pass the filters, borrowed from the tables.
#[derive(Debug, Default)]
pub struct FilteredView<'a> {
    pub leads: Vec<&'a Lead>,
    pub deals: Vec<&'a ClosedDeal>,
    pub merged: Vec<&'a MergedLead>,
    pub orders: Vec<&'a Order>,
}

/// Apply resolved filters.
///
/// Leads and orders are filtered by date; deals by segment; merged rows are
/// re-derived by joining the filtered deals' ids against the merged table.
pub fn apply_filters<'a>(tables: &'a CleanedTables, filters: &Filters) -> FilteredView<'a> {
    let range = filters.date_range();
    let in_range = |ts: Option<NaiveDateTime>| range.map_or(true, |r| r.contains(ts));

    let leads: Vec<&Lead> = tables
        .mql
        .iter()
        .flat_map(|t| t.rows.iter())
        .filter(|l| in_range(l.first_contact_date))
        .collect();

    let deals: Vec<&ClosedDeal> = tables
        .cld
        .iter()
        .flat_map(|t| t.rows.iter())
        .filter(|d| {
            filters
                .segments
                .as_ref()
                .map_or(true, |s| s.contains(&d.business_segment))
        })
        .collect();

    let orders: Vec<&Order> = tables
        .order
        .iter()
        .flat_map(|t| t.rows.iter())
        .filter(|o| in_range(o.order_purchase_timestamp))
        .collect();

    let merged = match &tables.merged {
        Some(rows) if !rows.is_empty() && !deals.is_empty() => rejoin_merged(&deals, rows),
        _ => Vec::new(),
    };

    FilteredView {
        leads,
        deals,
        merged,
        orders,
    }
}

/// Inner join of filtered deal ids against merged rows, in deal order.
fn rejoin_merged<'a>(deals: &[&ClosedDeal], merged: &'a [MergedLead]) -> Vec<&'a MergedLead> {
    let mut by_id: HashMap<&str, Vec<&MergedLead>> = HashMap::new();
    for row in merged {
        by_id.entry(row.mql_id.as_str()).or_default().push(row);
    }

    deals
        .iter()
        .filter_map(|d| by_id.get(d.mql_id.as_str()))
        .flatten()
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clean::{merge_leads, parse_timestamp};
    use crate::models::{BehaviourProfile, Table};

    fn lead(id: &str, date: &str) -> Lead {
        Lead {
            mql_id: id.into(),
            first_contact_date: parse_timestamp(date),
            origin: "ads".into(),
            extra: vec![],
        }
    }

    fn deal(id: &str, segment: &str) -> ClosedDeal {
        ClosedDeal {
            mql_id: id.into(),
            seller_id: None,
            sdr_id: None,
            sr_id: None,
            won_date: parse_timestamp("2021-02-01"),
            business_segment: segment.into(),
            lead_type: "online".into(),
            business_type: "reseller".into(),
            lead_behaviour_profile: BehaviourProfile::Cat,
            extra: vec![],
        }
    }

    fn tables() -> CleanedTables {
        let leads = vec![
            lead("1", "2021-01-01"),
            lead("2", "2021-01-15"),
            lead("3", "2021-01-31 18:30:00"),
            lead("4", ""),
        ];
        let deals = vec![deal("1", "retail"), deal("2", "pet"), deal("3", "retail")];
        let merged = merge_leads(&deals, &leads);
        CleanedTables {
            mql: Some(Table::new(vec![], leads)),
            cld: Some(Table::new(vec![], deals)),
            order: None,
            merged: Some(merged),
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_controls_from_tables() {
        let controls = FilterControls::from_tables(&tables());
        assert_eq!(
            controls.date_bounds,
            Some(DateBounds {
                min: date("2021-01-01"),
                max: date("2021-01-31")
            })
        );
        assert_eq!(controls.segment_options, vec!["retail", "pet"]);
    }

    #[test]
    fn test_default_filters_keep_dated_rows() {
        let t = tables();
        let controls = FilterControls::from_tables(&t);
        let view = apply_filters(&t, &Filters::default().resolve(&controls));
        // lead 3 is contacted after midnight of the last day; lead 4 has no date
        let ids: Vec<&str> = view.leads.iter().map(|l| l.mql_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert_eq!(view.deals.len(), 3);
        assert_eq!(view.merged.len(), 3);
    }

    #[test]
    fn test_date_range_ends_at_midnight() {
        let t = tables();
        let filters = Filters {
            start_date: Some(date("2021-01-15")),
            end_date: Some(date("2021-01-31")),
            segments: None,
        };
        let view = apply_filters(&t, &filters);
        let ids: Vec<&str> = view.leads.iter().map(|l| l.mql_id.as_str()).collect();
        assert_eq!(ids, vec!["2"]);

        let next_day = Filters {
            end_date: Some(date("2021-02-01")),
            ..filters
        };
        let view = apply_filters(&t, &next_day);
        let ids: Vec<&str> = view.leads.iter().map(|l| l.mql_id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3"]);
    }

    #[test]
    fn test_order_bought_on_end_day_is_excluded() {
        let order = |id: &str, ts: &str| Order {
            order_id: id.into(),
            order_status: Some("delivered".into()),
            order_purchase_timestamp: parse_timestamp(ts),
            order_approved_at: parse_timestamp(ts).unwrap(),
            order_delivered_carrier_date: parse_timestamp(ts).unwrap(),
            order_delivered_customer_date: None,
            order_estimated_delivery_date: None,
            extra: vec![],
        };
        let t = CleanedTables {
            order: Some(Table::new(
                vec![],
                vec![
                    order("o1", "2021-01-31 00:00:00"),
                    order("o2", "2021-01-31 10:00:00"),
                ],
            )),
            ..CleanedTables::default()
        };
        let filters = Filters {
            start_date: Some(date("2021-01-01")),
            end_date: Some(date("2021-01-31")),
            segments: None,
        };
        let view = apply_filters(&t, &filters);
        let ids: Vec<&str> = view.orders.iter().map(|o| o.order_id.as_str()).collect();
        assert_eq!(ids, vec!["o1"]);
    }

    #[test]
    fn test_segment_filter_drives_merged() {
        let t = tables();
        let filters = Filters {
            segments: Some(vec!["retail".into()]),
            ..Filters::default()
        };
        let view = apply_filters(&t, &filters);
        assert!(view.deals.iter().all(|d| d.business_segment == "retail"));
        let ids: Vec<&str> = view.merged.iter().map(|m| m.mql_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
        // the merged rows are a subset of the unfiltered merged table
        let all = t.merged.as_ref().unwrap();
        assert!(view.merged.iter().all(|m| all.iter().any(|a| a.mql_id == m.mql_id)));
    }

    #[test]
    fn test_empty_segment_selection() {
        let t = tables();
        let filters = Filters {
            segments: Some(vec![]),
            ..Filters::default()
        };
        let view = apply_filters(&t, &filters);
        assert!(view.deals.is_empty());
        assert!(view.merged.is_empty());
    }

    #[test]
    fn test_filters_deserialize_partial() {
        let f: Filters = serde_json::from_str(r#"{"startDate":"2021-01-02"}"#).unwrap();
        assert_eq!(f.start_date, Some(date("2021-01-02")));
        assert_eq!(f.end_date, None);
        assert_eq!(f.segments, None);
    }
}
