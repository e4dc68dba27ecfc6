//! Telegram transport settings.

use std::time::Duration;

/// Long-polling timeout (seconds) passed to `getUpdates`.
/// Default: 10 seconds.
pub const POLL_TIMEOUT_SECS: u64 = 10;

/// Get the long-polling timeout from env or default.
///
/// Environment variable: `POLL_TIMEOUT_SECS`.
#[must_use]
pub fn get_poll_timeout() -> Duration {
    parse_poll_timeout(std::env::var("POLL_TIMEOUT_SECS").ok().as_deref())
}

fn parse_poll_timeout(raw: Option<&str>) -> Duration {
    let secs = raw
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(POLL_TIMEOUT_SECS);
    Duration::from_secs(secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_timeout_parsing() {
        assert_eq!(parse_poll_timeout(None), Duration::from_secs(10));
        assert_eq!(parse_poll_timeout(Some("25")), Duration::from_secs(25));
        assert_eq!(parse_poll_timeout(Some(" 3 ")), Duration::from_secs(3));

        // Garbage falls back to the default
        assert_eq!(parse_poll_timeout(Some("soon")), Duration::from_secs(10));
        assert_eq!(parse_poll_timeout(Some("-5")), Duration::from_secs(10));
    }
}
