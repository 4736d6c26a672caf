//! Funnel Dashboard - Frontend Rust/Leptos Application
//!
//! A WebAssembly frontend for uploading the Olist CSV exports and exploring
//! the sales funnel they describe.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        App                                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Header (session badge, new upload)                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  MainContent                                                 │
//! │  ├── Hero (title, description)                              │
//! │  ├── UploadSection (until a session exists)                 │
//! │  ├── FiltersSidebar + Dashboard (once a session exists)     │
//! │  └── LogsPanel (when logs exist)                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Footer                                                      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`types`] - Wire types mirroring the backend snapshot
//! - [`components`] - UI components (Upload, Filters, Dashboard, charts)
//! - [`services`] - Backend communication

use leptos::*;
use leptos_meta::*;
use leptos_router::*;

// =============================================================================
// Module declarations
// =============================================================================

pub mod config;
pub mod types;
pub mod components;
pub mod services;

// =============================================================================
// Re-exports
// =============================================================================

// Configuration
pub use config::*;

// Types
pub use types::{
    // Dashboard
    DashboardSnapshot, Filters, Kpis,
    // Logs
    LogEntry, LogLevel,
    // API
    FileSummary, SnapshotResponse, UploadResponse,
    // Errors
    AppError, AppResult,
};

// Components
pub use components::*;

// Services
pub use services::*;

// =============================================================================
// Application
// =============================================================================

#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    view! {
        <Title text="Olist Sales Funnel"/>
        <Router>
            <main>
                <Routes>
                    <Route path="/" view=MainContent/>
                </Routes>
            </main>
        </Router>
    }
}

#[component]
fn MainContent() -> impl IntoView {
    let (session_id, set_session_id) = create_signal(None::<String>);
    let (snapshot, set_snapshot) = create_signal(None::<DashboardSnapshot>);
    let (logs, set_logs) = create_signal(Vec::<LogEntry>::new());

    // One backend session per tab; it survives reloads
    let token = session_token();

    // Initialize SSE connection ONCE at app startup
    init_sse_logs(set_logs, &token);

    {
        let token = token.clone();
        spawn_local(async move {
            match fetch_snapshot(&token, BACKEND_URL).await {
                Ok(resp) => {
                    log::info!("Restored session {}", resp.session_id);
                    set_session_id.set(Some(resp.session_id));
                    set_snapshot.set(Some(resp.snapshot));
                }
                Err(AppError::Server { status: 404, .. }) => {}
                Err(e) => log::warn!("Could not restore session: {}", e),
            }
        });
    }

    let on_uploaded = Callback::new(move |response: UploadResponse| {
        set_session_id.set(Some(response.session_id));
        set_snapshot.set(Some(response.snapshot));
    });

    let on_snapshot = Callback::new(move |snap: DashboardSnapshot| set_snapshot.set(Some(snap)));

    let on_new_upload = Callback::new(move |_: ()| {
        if let Some(id) = session_id.get_untracked() {
            spawn_local(async move {
                if let Err(e) = close_session(&id, BACKEND_URL).await {
                    log::warn!("Could not close session {}: {}", id, e);
                }
            });
        }
        set_session_id.set(None);
        set_snapshot.set(None);
        set_logs.set(Vec::new());
    });

    view! {
        <Header session_id=session_id on_new_upload=on_new_upload/>

        <div class="container">
            <Hero/>

            <Show
                when=move || session_id.get().is_some()
                fallback=move || {
                    view! { <UploadSection on_uploaded=on_uploaded set_logs=set_logs session_token=token.clone()/> }
                }
            >
                <div class="dashboard-layout">
                    <FiltersSidebar session_id=session_id snapshot=snapshot on_snapshot=on_snapshot/>
                    <Dashboard snapshot=snapshot/>
                </div>
            </Show>

            <Show when=move || !logs.get().is_empty() fallback=|| view! {}>
                <LogsPanel logs=logs set_logs=set_logs/>
            </Show>
        </div>

        <Footer/>
    }
}
