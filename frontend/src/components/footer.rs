//! Footer component

use leptos::*;

#[component]
pub fn Footer() -> impl IntoView {
    view! {
        <footer>
            <div>"Sales funnel dashboard • Powered by " <span class="rust-badge">"🦀 Rust + Leptos"</span></div>
            <div class="footer-links">
                <a href="https://www.kaggle.com/datasets/olistbr/marketing-funnel-olist" class="footer-link" target="_blank">
                    "Marketing Funnel dataset"
                </a>
                <a href="https://www.kaggle.com/datasets/olistbr/brazilian-ecommerce" class="footer-link" target="_blank">
                    "Orders dataset"
                </a>
            </div>
        </footer>
    }
}
