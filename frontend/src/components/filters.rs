//! Sidebar with the date-range picker and the business-segment selection.
//!
//! Every change is sent to the backend, which answers with a new snapshot.

use leptos::*;
use web_sys::{Event, HtmlInputElement};

use crate::services::apply_filters;
use crate::types::{DashboardSnapshot, Filters};
use crate::BACKEND_URL;

/// Selection after toggling `segment`, kept in the order of `options`.
pub fn toggle_segment(
    options: &[String],
    selected: &[String],
    segment: &str,
    checked: bool,
) -> Vec<String> {
    options
        .iter()
        .filter(|o| {
            if o.as_str() == segment {
                checked
            } else {
                selected.contains(o)
            }
        })
        .cloned()
        .collect()
}

/// Empty date inputs clear the bound.
fn date_value(ev: &Event) -> Option<String> {
    let input: HtmlInputElement = event_target(ev);
    let value = input.value();
    (!value.is_empty()).then_some(value)
}

#[component]
pub fn FiltersSidebar(
    session_id: ReadSignal<Option<String>>,
    snapshot: ReadSignal<Option<DashboardSnapshot>>,
    on_snapshot: Callback<DashboardSnapshot>,
) -> impl IntoView {
    let (error, set_error) = create_signal(None::<String>);

    let send = move |filters: Filters| {
        let Some(id) = session_id.get_untracked() else {
            return;
        };
        spawn_local(async move {
            match apply_filters(&id, &filters, BACKEND_URL).await {
                Ok(resp) => {
                    set_error.set(None);
                    on_snapshot.call(resp.snapshot);
                }
                Err(e) => {
                    log::error!("Filter update failed: {}", e);
                    set_error.set(Some(e.to_string()));
                }
            }
        });
    };

    let current = move || {
        snapshot
            .get_untracked()
            .map(|s| s.filters)
            .unwrap_or_default()
    };

    let on_start = move |ev: Event| {
        send(Filters {
            start_date: date_value(&ev),
            ..current()
        })
    };
    let on_end = move |ev: Event| {
        send(Filters {
            end_date: date_value(&ev),
            ..current()
        })
    };

    let bounds = move || snapshot.get().and_then(|s| s.controls.date_bounds);
    let options = move || {
        snapshot
            .get()
            .map(|s| s.controls.segment_options)
            .unwrap_or_default()
    };
    let selected = move || {
        snapshot
            .get()
            .and_then(|s| s.filters.segments)
            .unwrap_or_default()
    };

    view! {
        <aside class="sidebar">
            <h3>"Filters"</h3>

            <label class="filter-label">"Start date"</label>
            <input
                type="date"
                prop:value=move || snapshot.get().and_then(|s| s.filters.start_date).unwrap_or_default()
                min=move || bounds().map(|b| b.min)
                max=move || bounds().map(|b| b.max)
                on:change=on_start
            />

            <label class="filter-label">"End date"</label>
            <input
                type="date"
                prop:value=move || snapshot.get().and_then(|s| s.filters.end_date).unwrap_or_default()
                min=move || bounds().map(|b| b.min)
                max=move || bounds().map(|b| b.max)
                on:change=on_end
            />

            <label class="filter-label">"Business segments"</label>
            <div class="segment-list">
                <Show
                    when=move || !options().is_empty()
                    fallback=|| view! { <div class="hint">"Upload closed deals to filter by segment"</div> }
                >
                    <For
                        each=options
                        key=|segment| segment.clone()
                        children=move |segment| {
                            let name = segment.clone();
                            let checked = {
                                let segment = segment.clone();
                                move || selected().contains(&segment)
                            };
                            let on_toggle = move |ev: Event| {
                                let input: HtmlInputElement = event_target(&ev);
                                let segments = toggle_segment(
                                    &options(),
                                    &selected(),
                                    &segment,
                                    input.checked(),
                                );
                                send(Filters {
                                    segments: Some(segments),
                                    ..current()
                                });
                            };
                            view! {
                                <label class="segment-option">
                                    <input type="checkbox" prop:checked=checked on:change=on_toggle/>
                                    {name}
                                </label>
                            }
                        }
                    />
                </Show>
            </div>

            <button
                class="btn btn-secondary"
                on:click=move |_| send(Filters::default())
            >
                "Reset filters"
            </button>

            <Show when=move || error.get().is_some() fallback=|| view! {}>
                <div class="error-message">{move || error.get().unwrap_or_default()}</div>
            </Show>
        </aside>
    }
}
