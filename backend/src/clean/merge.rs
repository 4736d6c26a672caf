//! Lead-to-deal join.

use std::collections::HashMap;

use super::dates::days_between;
use crate::models::{ClosedDeal, Lead, MergedLead};

/// Inner join of deals and leads on `mql_id`.
///
/// Output follows deal order, then lead order within one id; repeated ids
/// produce every pairing. Empty ids never match.
pub fn merge_leads(deals: &[ClosedDeal], leads: &[Lead]) -> Vec<MergedLead> {
    let mut by_id: HashMap<&str, Vec<&Lead>> = HashMap::new();
    for lead in leads.iter().filter(|l| !l.mql_id.is_empty()) {
        by_id.entry(lead.mql_id.as_str()).or_default().push(lead);
    }

    let mut merged = Vec::new();
    for deal in deals {
        let Some(matches) = by_id.get(deal.mql_id.as_str()) else {
            continue;
        };
        for lead in matches {
            merged.push(MergedLead {
                mql_id: deal.mql_id.clone(),
                won_date: deal.won_date,
                business_segment: deal.business_segment.clone(),
                lead_type: deal.lead_type.clone(),
                first_contact_date: lead.first_contact_date,
                origin: lead.origin.clone(),
                time_to_close: match (deal.won_date, lead.first_contact_date) {
                    (Some(won), Some(first)) => Some(days_between(won, first)),
                    _ => None,
                },
            });
        }
    }
    merged
}
