/// Check if debug logging is enabled via environment variable
///
/// This is checked once at first use to avoid repeated environment variable lookups.
static DEBUG_ENABLED: std::sync::OnceLock<bool> = std::sync::OnceLock::new();

fn is_debug_enabled() -> bool {
    *DEBUG_ENABLED.get_or_init(|| {
        let value = std::env::var("COPYDESK_DEBUG").unwrap_or_default();
        value == "1" || value.eq_ignore_ascii_case("true")
    })
}

/// Debug logging utility function
///
/// Prints debug messages with a colored prefix when the `COPYDESK_DEBUG`
/// environment variable is set to "1".
pub fn debug_log(msg: &str) {
    if is_debug_enabled() {
        eprintln!("\x1b[1;33m[copydesk]\x1b[0m {}", msg);
    }
}

/// Current unix timestamp in seconds.
pub fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}
