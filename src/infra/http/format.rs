//! Caller preferences that shape response rendering but never business
//! logic.

use axum::http::HeaderMap;
use chrono_tz::Tz;

pub const ACCEPT_TIMEZONE_HEADER: &str = "accept-timezone";

#[derive(Debug, Clone, Copy)]
pub struct OutputFormat {
    pub timezone: Tz,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self { timezone: Tz::UTC }
    }
}

impl OutputFormat {
    /// Resolve the `Accept-Timezone` header against the tz database.
    /// Missing or unknown zones fall back to UTC.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let timezone = headers
            .get(ACCEPT_TIMEZONE_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|name| name.parse::<Tz>().ok())
            .unwrap_or(Tz::UTC);
        Self { timezone }
    }
}
