//! Hero section component

use leptos::*;

#[component]
pub fn Hero() -> impl IntoView {
    view! {
        <div class="hero">
            <h1>"Olist Sales Funnel Analysis"</h1>
            <p class="subtitle">
                "From marketing qualified leads to closed deals and delivered orders. "
                "Upload the exports, then narrow the view by date and business segment."
            </p>
        </div>
    }
}
