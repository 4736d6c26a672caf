use leptos::*;

/// Top bar with the open session and a button to start over.
#[component]
pub fn Header(
    session_id: ReadSignal<Option<String>>,
    on_new_upload: Callback<()>,
) -> impl IntoView {
    view! {
        <header>
            <div class="header-left">
                <a href="#" class="logo">"OLIST FUNNEL"</a>
                <span class="badge">
                    {move || match session_id.get() {
                        Some(id) => format!("Session {}", short_id(&id)),
                        None => "No data loaded".to_string(),
                    }}
                </span>
            </div>
            <div class="header-right">
                <Show when=move || session_id.get().is_some() fallback=|| view! {}>
                    <button class="btn btn-secondary" on:click=move |_| on_new_upload.call(())>
                        "New upload"
                    </button>
                </Show>
            </div>
        </header>
    }
}

/// First eight characters of a session id.
pub fn short_id(id: &str) -> &str {
    id.char_indices().nth(8).map_or(id, |(i, _)| &id[..i])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("123e4567-e89b-12d3"), "123e4567");
        assert_eq!(short_id("abc"), "abc");
    }
}
