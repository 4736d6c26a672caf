//! Dashboard computation: filters, KPIs and chart panels.
//!
//! [`recompute`] is pure. Given the cleaned tables and the user's filters it
//! returns everything the UI draws, so the same snapshot can be rendered by
//! the browser or dumped as JSON from the CLI.

pub mod charts;
pub mod filters;
pub mod kpi;
pub mod panels;

pub use charts::{Bar, BarChart, Histogram, HistogramBin, Indicator, PieChart, PieSlice};
pub use filters::{apply_filters, DateBounds, FilterControls, FilteredView, Filters};
pub use kpi::{compute_kpis, Kpis};
pub use panels::{BusinessPanel, ConversionPanel, OrderPanel, TeamPanel, TimePanel};

use serde::{Deserialize, Serialize};

use crate::models::{CleanedTables, TableCounts};

/// Everything the dashboard shows for one set of tables and filters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    /// Filters after defaults were filled in
    pub filters: Filters,
    pub controls: FilterControls,
    pub tables: TableCounts,
    pub kpis: Kpis,
    pub conversion: ConversionPanel,
    pub business: BusinessPanel,
    pub time: TimePanel,
    pub team: TeamPanel,
    pub orders: OrderPanel,
}

pub fn recompute(tables: &CleanedTables, filters: &Filters) -> DashboardSnapshot {
    let controls = FilterControls::from_tables(tables);
    let filters = filters.resolve(&controls);
    let view = apply_filters(tables, &filters);

    DashboardSnapshot {
        kpis: compute_kpis(&view),
        conversion: panels::conversion_panel(&view),
        business: panels::business_panel(&view),
        time: panels::time_panel(&view),
        team: panels::team_panel(&view),
        orders: panels::order_panel(&view),
        tables: tables.row_counts(),
        filters,
        controls,
    }
}
