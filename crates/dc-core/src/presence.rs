//! Presence/liveness protocol
//!
//! Each receiving host keeps one marker file in the sync folder, refreshed
//! on an interval shorter than its staleness threshold. The marker's
//! existence and modification time are the entire protocol: a marker older
//! than the staleness window is treated as if absent.

/// Suffix of presence marker files: `<host>.is-receiving.txt`.
pub const PRESENCE_MARKER_SUFFIX: &str = ".is-receiving.txt";

/// Interval at which a receiving host rewrites its own marker.
pub const PRESENCE_REFRESH_SECS: u64 = 4 * 60;

/// Markers older than this are treated as absent. Roughly 2.5x the refresh
/// interval, so one missed refresh does not flap liveness.
pub const PRESENCE_STALE_SECS: u64 = 10 * 60;

/// The marker file name for a host identity.
pub fn marker_name(host: &str) -> String {
    format!("{host}{PRESENCE_MARKER_SUFFIX}")
}

/// Whether a file name is a presence marker (any host's).
pub fn is_presence_marker(name: &str) -> bool {
    name.ends_with(PRESENCE_MARKER_SUFFIX)
}

/// Whether a marker with the given modification time still signals a live
/// receiver at `now_ms`.
pub fn marker_is_fresh(modified_ms: u64, now_ms: u64) -> bool {
    now_ms.saturating_sub(modified_ms) < PRESENCE_STALE_SECS * 1_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_name_round_trips_through_detection() {
        let name = marker_name("alpha");
        assert_eq!(name, "alpha.is-receiving.txt");
        assert!(is_presence_marker(&name));
        assert!(!is_presence_marker("alpha.is-reading.txt"));
        assert!(!is_presence_marker("5-alpha.text.json"));
    }

    #[test]
    fn marker_expires_at_the_staleness_window() {
        let written = 1_000_000;
        let stale_ms = PRESENCE_STALE_SECS * 1_000;
        assert!(marker_is_fresh(written, written + stale_ms - 1));
        assert!(!marker_is_fresh(written, written + stale_ms));
    }

    #[test]
    fn refresh_interval_is_well_inside_the_staleness_window() {
        // one missed refresh must not expire the marker
        assert!(PRESENCE_REFRESH_SECS * 2 <= PRESENCE_STALE_SECS);
    }
}
