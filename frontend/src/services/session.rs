//! Browser-side session id.
//!
//! One id per tab, kept in `sessionStorage` so a reload finds the same
//! backend session. The id names the upload's session and scopes the log
//! stream.

const STORAGE_KEY: &str = "funnel.session";

/// Stored id for this tab, creating and storing one on first use.
pub fn session_token() -> String {
    let storage = web_sys::window().and_then(|w| w.session_storage().ok().flatten());

    if let Some(existing) = storage
        .as_ref()
        .and_then(|s| s.get_item(STORAGE_KEY).ok().flatten())
        .filter(|id| is_uuid(id))
    {
        return existing;
    }

    let token = new_uuid();
    if let Some(storage) = storage {
        if let Err(e) = storage.set_item(STORAGE_KEY, &token) {
            log::warn!("Could not store session id: {:?}", e);
        }
    }
    token
}

fn new_uuid() -> String {
    web_sys::window()
        .and_then(|w| w.crypto().ok())
        .map(|c| c.random_uuid())
        .unwrap_or_else(|| {
            let mut bytes = [0u8; 16];
            for b in bytes.iter_mut() {
                *b = (js_sys::Math::random() * 256.0) as u8;
            }
            format_uuid_v4(bytes)
        })
}

/// Hyphenated version-4 UUID from 16 random bytes.
pub fn format_uuid_v4(mut bytes: [u8; 16]) -> String {
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;
    let hex: String = bytes.iter().map(|b| format!("{:02x}", b)).collect();
    format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    )
}

/// Loose shape check: 36 chars, hex digits and hyphens in UUID positions.
pub fn is_uuid(s: &str) -> bool {
    s.len() == 36
        && s.char_indices().all(|(i, c)| match i {
            8 | 13 | 18 | 23 => c == '-',
            _ => c.is_ascii_hexdigit(),
        })
}
