//! API utilities for frontend-backend communication

/// Base URL for API requests.
///
/// An explicit `base_url` wins; otherwise requests go to the page origin.
/// Empty string when no window is available.
pub fn api_base(base_url: &str) -> String {
    if !base_url.is_empty() {
        return base_url.trim_end_matches('/').to_string();
    }
    let Some(window) = web_sys::window() else {
        return String::new();
    };
    window.location().origin().unwrap_or_default()
}

/// Full API URL from a path starting with `/api/`
pub fn api_url(base_url: &str, path: &str) -> String {
    format!("{}{}", api_base(base_url), path)
}
