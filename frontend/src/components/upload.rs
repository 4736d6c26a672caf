//! CSV upload component.
//!
//! Accepts several files at once (leads, closed deals, orders); the backend
//! classifies each file from its columns.

use leptos::*;
use wasm_bindgen::JsCast;
use web_sys::{Event, File, HtmlInputElement};

use crate::services::upload_files;
use crate::types::{FileSummary, LogEntry, LogLevel, UploadResponse};
use crate::BACKEND_URL;

#[component]
pub fn UploadSection(
    /// Receives the backend answer after a successful upload
    on_uploaded: Callback<UploadResponse>,
    set_logs: WriteSignal<Vec<LogEntry>>,
    /// Session the batch is uploaded into
    session_token: String,
) -> impl IntoView {
    let (is_uploading, set_is_uploading) = create_signal(false);
    let (error, set_error) = create_signal(None::<String>);

    let on_file_change = move |ev: Event| {
        let input: HtmlInputElement = event_target(&ev);
        let Some(list) = input.files() else {
            return;
        };
        let files: Vec<File> = (0..list.length()).filter_map(|i| list.get(i)).collect();
        if files.is_empty() {
            return;
        }

        set_error.set(None);
        set_logs.set(Vec::new());
        let token = session_token.clone();

        spawn_local(async move {
            set_is_uploading.set(true);
            add_log(
                set_logs,
                LogLevel::Info,
                &format!("📤 Uploading {} file(s)...", files.len()),
            );

            match upload_files(files, &token, BACKEND_URL).await {
                Ok(response) => {
                    for file in &response.files {
                        add_log(set_logs, LogLevel::Success, &describe_file(file));
                    }
                    for name in &response.ignored {
                        add_log(
                            set_logs,
                            LogLevel::Warning,
                            &format!("{}: unrecognized columns, ignored", name),
                        );
                    }
                    on_uploaded.call(response);
                }
                Err(e) => {
                    add_log(set_logs, LogLevel::Error, &format!("❌ Upload failed: {}", e));
                    set_error.set(Some(e.to_string()));
                }
            }

            set_is_uploading.set(false);
        });
    };

    let trigger_file_input = move |_| {
        if let Some(input) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("fileInput"))
        {
            if let Some(html_input) = input.dyn_ref::<HtmlInputElement>() {
                html_input.click();
            }
        }
    };

    view! {
        <div class="upload-section" id="uploadZone" on:click=trigger_file_input>
            <div class="upload-icon">"📊"</div>
            <div class="upload-text">
                {move || if is_uploading.get() {
                    "⏳ Cleaning and merging..."
                } else {
                    "Select the Olist CSV exports"
                }}
            </div>

            <Show when=move || !is_uploading.get() fallback=|| view! {}>
                <div class="upload-hint">
                    "Marketing qualified leads, closed deals and orders. "
                    "Files are recognized from their columns; others are ignored."
                </div>
            </Show>

            <Show when=move || error.get().is_some() fallback=|| view! {}>
                <div class="error-message">{move || error.get().unwrap_or_default()}</div>
            </Show>

            <input
                type="file"
                id="fileInput"
                accept=".csv"
                multiple=true
                style="display:none"
                on:change=on_file_change
            />
        </div>
    }
}

/// One-line description of an uploaded file.
pub fn describe_file(file: &FileSummary) -> String {
    match (&file.kind, file.clean_rows) {
        (Some(kind), Some(rows)) => format!(
            "{}: {} table, {} rows ({} after cleaning, {} / '{}')",
            file.name,
            kind.to_uppercase(),
            file.raw_rows,
            rows,
            file.encoding,
            file.delimiter
        ),
        _ => format!("{}: ignored", file.name),
    }
}

fn add_log(set_logs: WriteSignal<Vec<LogEntry>>, level: LogLevel, message: &str) {
    let timestamp = String::from(js_sys::Date::new_0().to_iso_string());

    set_logs.update(|logs| {
        logs.push(LogEntry {
            level,
            message: message.to_string(),
            timestamp,
        });
    });

    log::info!("{}", message);
}
