//! KPI cards and the five metric panels.

use leptos::*;

use super::charts::{BarChartView, HistogramView, IndicatorView, PieChartView};
use crate::config::palette;
use crate::types::{
    BusinessPanel, ConversionPanel, DashboardSnapshot, Kpis, OrderPanel, TeamPanel, TimePanel,
};

/// Panel tabs, in display order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tab {
    Conversion,
    Business,
    Time,
    Team,
    Orders,
}

impl Tab {
    pub const ALL: [Tab; 5] = [Tab::Conversion, Tab::Business, Tab::Time, Tab::Team, Tab::Orders];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Conversion => "Conversion Metrics",
            Tab::Business => "Business Metrics",
            Tab::Time => "Time Metrics",
            Tab::Team => "Team Performance",
            Tab::Orders => "Order Analysis",
        }
    }
}

/// The four headline numbers, formatted for the cards.
pub fn kpi_cards(kpis: &Kpis) -> [(&'static str, String); 4] {
    [
        ("Total MQLs", kpis.total_mqls.to_string()),
        ("Closed Deals", kpis.closed_deals.to_string()),
        ("Conversion Rate", format!("{:.2}%", kpis.conversion_rate)),
        ("Avg Time to Close", format!("{:.1} days", kpis.avg_time_to_close)),
    ]
}

#[component]
pub fn KpiRow(kpis: Kpis) -> impl IntoView {
    let cards = kpi_cards(&kpis)
        .into_iter()
        .map(|(label, value)| {
            view! {
                <div class="kpi-card">
                    <div class="kpi-label">{label}</div>
                    <div class="kpi-value">{value}</div>
                </div>
            }
        })
        .collect_view();

    view! { <div class="kpi-row">{cards}</div> }
}

fn empty(message: &'static str) -> View {
    view! { <div class="chart-empty">{message}</div> }.into_view()
}

#[component]
fn ConversionView(panel: ConversionPanel) -> impl IntoView {
    view! {
        <div class="panel-grid">
            <PieChartView chart=panel.overall/>
            {match panel.by_channel {
                Some(chart) => view! { <BarChartView chart=chart color=palette::PRIMARY as_rate=true/> }.into_view(),
                None => empty("Upload both leads and closed deals to see conversion by channel"),
            }}
        </div>
    }
}

#[component]
fn BusinessView(panel: BusinessPanel) -> impl IntoView {
    view! {
        <div class="panel-grid">
            <BarChartView chart=panel.by_segment color=palette::SECONDARY/>
            <BarChartView chart=panel.by_lead_type color=palette::INFO/>
        </div>
    }
}

#[component]
fn TimeView(panel: TimePanel) -> impl IntoView {
    view! {
        <div class="panel-grid">
            {match panel.closing_time {
                Some(h) => view! { <HistogramView histogram=h/> }.into_view(),
                None => empty("No merged leads for the current filters"),
            }}
            {panel.velocity.map(|chart| view! { <BarChartView chart=chart color=palette::SUCCESS/> })}
        </div>
    }
}

#[component]
fn TeamView(panel: TeamPanel) -> impl IntoView {
    view! {
        <div class="panel-grid">
            {match panel.top_sdrs {
                Some(chart) => view! { <BarChartView chart=chart color=palette::PRIMARY/> }.into_view(),
                None => empty("No closed deals for the current filters"),
            }}
            {panel.top_srs.map(|chart| view! { <BarChartView chart=chart color=palette::WARNING/> })}
        </div>
    }
}

#[component]
fn OrdersView(panel: OrderPanel) -> impl IntoView {
    view! {
        <div class="panel-grid">
            {match panel.delivery_time {
                Some(h) => view! { <HistogramView histogram=h color=palette::INFO/> }.into_view(),
                None => empty("Upload an orders file to see delivery metrics"),
            }}
            {panel.delayed.map(|indicator| view! { <IndicatorView indicator=indicator/> })}
        </div>
    }
}

#[component]
fn TabBar(tab: ReadSignal<Tab>, set_tab: WriteSignal<Tab>) -> impl IntoView {
    let buttons = Tab::ALL
        .into_iter()
        .map(|t| {
            view! {
                <button
                    class="tab"
                    class:active=move || tab.get() == t
                    on:click=move |_| set_tab.set(t)
                >
                    {t.label()}
                </button>
            }
        })
        .collect_view();

    view! { <div class="tabs">{buttons}</div> }
}

/// KPI row plus the tabbed panels for the current snapshot.
#[component]
pub fn Dashboard(snapshot: ReadSignal<Option<DashboardSnapshot>>) -> impl IntoView {
    let (tab, set_tab) = create_signal(Tab::Conversion);

    let kpis = move || snapshot.get().map(|s| view! { <KpiRow kpis=s.kpis/> });

    let panel = move || {
        let Some(snap) = snapshot.get() else {
            return empty("Upload CSV files to start");
        };
        match tab.get() {
            Tab::Conversion => view! { <ConversionView panel=snap.conversion/> }.into_view(),
            Tab::Business => view! { <BusinessView panel=snap.business/> }.into_view(),
            Tab::Time => view! { <TimeView panel=snap.time/> }.into_view(),
            Tab::Team => view! { <TeamView panel=snap.team/> }.into_view(),
            Tab::Orders => view! { <OrdersView panel=snap.orders/> }.into_view(),
        }
    };

    view! {
        <section class="dashboard">
            {kpis}
            <TabBar tab=tab set_tab=set_tab/>
            <div class="panel">{panel}</div>
        </section>
    }
}
