//! Shared User-Agent string for backend HTTP traffic.

/// Project URL for User-Agent identification (good citizenship; RFC 9308).
const PROJECT_UA_URL: &str = "https://github.com/librova/librova-reader";

/// Default User-Agent for asset requests (identifies the reader and its version).
#[must_use]
pub(crate) fn default_reader_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("librova-reader/{version} (+{PROJECT_UA_URL})")
}
