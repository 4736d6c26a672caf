//! Closed-deal (CLD) cleaner.

use std::collections::HashMap;

use super::Column;
use crate::error::{CleanError, CleanResult};
use crate::models::{BehaviourProfile, ClosedDeal, DealTable};
use crate::parser::RawTable;

/// Seller attributes with no analytical use; removed unconditionally.
pub const DROPPED_COLUMNS: &[&str] = &[
    "has_company",
    "has_gtin",
    "average_stock",
    "declared_product_catalog_size",
];

const REQUIRED_COLUMNS: &[&str] = &["business_segment", "lead_type", "business_type"];

const PROFILE_COLUMN: &str = "lead_behaviour_profile";

pub(crate) const KNOWN_COLUMNS: &[&str] = &[
    "mql_id",
    "seller_id",
    "sdr_id",
    "sr_id",
    "won_date",
    "business_segment",
    "lead_type",
    "business_type",
    PROFILE_COLUMN,
];

/// Clean a closed-deals table.
///
/// Rows missing a segment, lead type or business type are dropped, the four
/// [`DROPPED_COLUMNS`] are removed, `won_date` is parsed, and the behaviour
/// profile is restricted to the four known values with gaps filled by the
/// most frequent one.
pub fn clean_deals(mut table: RawTable) -> CleanResult<DealTable> {
    table.drop_missing(REQUIRED_COLUMNS);
    table
        .drop_columns(DROPPED_COLUMNS)
        .map_err(CleanError::MissingColumn)?;

    let mql_id = Column::resolve(&table, "mql_id");
    let seller_id = Column::resolve(&table, "seller_id");
    let sdr_id = Column::resolve(&table, "sdr_id");
    let sr_id = Column::resolve(&table, "sr_id");
    let won_date = Column::resolve(&table, "won_date");
    let segment = Column::resolve(&table, "business_segment");
    let lead_type = Column::resolve(&table, "lead_type");
    let business_type = Column::resolve(&table, "business_type");
    let profile = Column::resolve(&table, PROFILE_COLUMN);
    let extras = table.extra_columns(KNOWN_COLUMNS);

    // Parse everything first; the profile fill needs the whole column.
    let mut parsed = Vec::with_capacity(table.len());
    for row in &table.rows {
        let raw_profile = profile.text(row)?;
        parsed.push((
            row,
            won_date.timestamp(row)?,
            raw_profile.and_then(|p| p.parse::<BehaviourProfile>().ok()),
        ));
    }

    let profiles: Vec<Option<BehaviourProfile>> = parsed.iter().map(|(_, _, p)| *p).collect();
    let fill = most_frequent(&profiles).ok_or_else(|| CleanError::EmptyMode(PROFILE_COLUMN.into()))?;

    let mut rows = Vec::with_capacity(parsed.len());
    for (row, won, profile) in parsed {
        rows.push(ClosedDeal {
            mql_id: mql_id.text(row)?.unwrap_or_default(),
            seller_id: seller_id.optional_text(row),
            sdr_id: sdr_id.optional_text(row),
            sr_id: sr_id.optional_text(row),
            won_date: won,
            business_segment: segment.text(row)?.unwrap_or_default(),
            lead_type: lead_type.text(row)?.unwrap_or_default(),
            business_type: business_type.text(row)?.unwrap_or_default(),
            lead_behaviour_profile: profile.unwrap_or(fill),
            extra: extras.iter().map(|(i, _)| row.get(*i).map(String::from)).collect(),
        });
    }

    Ok(DealTable::new(
        extras.into_iter().map(|(_, name)| name).collect(),
        rows,
    ))
}

/// Most frequent present value; ties go to the smallest value.
pub fn most_frequent(values: &[Option<BehaviourProfile>]) -> Option<BehaviourProfile> {
    let mut counts: HashMap<BehaviourProfile, usize> = HashMap::new();
    for v in values.iter().flatten() {
        *counts.entry(*v).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
        .map(|(profile, _)| profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::csv_to_table;

    const HEADER: &str = "mql_id,seller_id,sdr_id,sr_id,won_date,business_segment,lead_type,\
lead_behaviour_profile,has_company,has_gtin,average_stock,business_type,\
declared_product_catalog_size,declared_monthly_revenue";

    fn deals(rows: &[&str]) -> RawTable {
        let csv = format!("{}\n{}", HEADER, rows.join("\n"));
        csv_to_table(&csv, ',').unwrap()
    }

    #[test]
    fn test_drops_incomplete_rows() {
        let raw = deals(&[
            "m1,s1,d1,r1,2018-02-26 19:58:54,pet,online_medium,cat,,,,reseller,,0",
            "m2,s2,d1,r1,2018-05-08 20:17:59,,industry,wolf,,,,reseller,,0",
            "m3,s3,d2,r2,2018-06-05 17:27:23,car_accessories,online_big,,,,,,,0",
        ]);
        let table = clean_deals(raw).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0].mql_id, "m1");
        assert_eq!(table.rows[0].business_type, "reseller");
    }

    #[test]
    fn test_removes_seller_attribute_columns() {
        let raw = deals(&["m1,s1,d1,r1,2018-02-26,pet,online_medium,cat,,,,reseller,,0"]);
        let table = clean_deals(raw).unwrap();
        for dropped in DROPPED_COLUMNS {
            assert!(!table.extra_columns.iter().any(|c| c == dropped));
        }
        assert_eq!(table.extra_columns, vec!["declared_monthly_revenue"]);
        assert_eq!(table.rows[0].extra, vec![Some("0".to_string())]);
    }

    #[test]
    fn test_absent_dropped_column_fails() {
        let raw = csv_to_table(
            "mql_id,seller_id,won_date,business_segment,lead_type,business_type,lead_behaviour_profile\n\
             m1,s1,2018-02-26,pet,online_medium,reseller,cat",
            ',',
        )
        .unwrap();
        let err = clean_deals(raw).unwrap_err();
        assert!(matches!(err, CleanError::MissingColumn(ref c) if c == "has_company"));
    }

    #[test]
    fn test_profile_normalized_and_filled_with_mode() {
        let raw = deals(&[
            "m1,s1,d1,r1,2018-02-26,pet,online_medium,wolf,,,,reseller,,0",
            "m2,s2,d1,r1,2018-02-27,pet,online_medium,\"cat, wolf\",,,,reseller,,0",
            "m3,s3,d1,r1,2018-02-28,pet,online_medium,,,,,reseller,,0",
            "m4,s4,d1,r1,2018-03-01,pet,online_medium,wolf,,,,reseller,,0",
            "m5,s5,d1,r1,2018-03-02,pet,online_medium,shark,,,,reseller,,0",
        ]);
        let table = clean_deals(raw).unwrap();
        let profiles: Vec<&str> = table
            .rows
            .iter()
            .map(|d| d.lead_behaviour_profile.as_str())
            .collect();
        assert_eq!(profiles, vec!["wolf", "wolf", "wolf", "wolf", "shark"]);
    }

    #[test]
    fn test_padded_profile_is_not_valid() {
        let raw = deals(&[
            "m1,s1,d1,r1,2018-02-26,pet,online_medium,wolf,,,,reseller,,0",
            "m2,s2,d1,r1,2018-02-27,pet,online_medium, cat,,,,reseller,,0",
        ]);
        let table = clean_deals(raw).unwrap();
        assert_eq!(table.rows[1].lead_behaviour_profile, BehaviourProfile::Wolf);
    }

    #[test]
    fn test_mode_tie_prefers_smallest() {
        let values = vec![
            Some(BehaviourProfile::Wolf),
            Some(BehaviourProfile::Eagle),
            None,
        ];
        assert_eq!(most_frequent(&values), Some(BehaviourProfile::Eagle));
    }

    #[test]
    fn test_no_valid_profile_fails() {
        let raw = deals(&["m1,s1,d1,r1,2018-02-26,pet,online_medium,lion,,,,reseller,,0"]);
        let err = clean_deals(raw).unwrap_err();
        assert!(matches!(err, CleanError::EmptyMode(_)));
    }

    #[test]
    fn test_bad_won_date_fails() {
        let raw = deals(&["m1,s1,d1,r1,not-a-date,pet,online_medium,cat,,,,reseller,,0"]);
        let err = clean_deals(raw).unwrap_err();
        assert!(matches!(err, CleanError::InvalidDate { ref column, .. } if column == "won_date"));
    }
}
