use std::sync::LazyLock;

use regex_lite::Regex;

/// Bare `<beat>-<host>.txt` artifacts from the first protocol generation.
static LEGACY_TEXT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+-[0-9a-zA-Z-]+\.txt$").expect("legacy grammar"));

/// Whether a name matches an artifact pattern from a previous protocol
/// generation.
///
/// Such entries are recognized only so the retention sweep can delete them;
/// they are never parsed or applied. Unrecognized unparsable entries are the
/// user's business and are left alone.
pub fn is_legacy_artifact(name: &str) -> bool {
    if !name.ends_with(".txt") {
        return false;
    }
    name.starts_with("receiving-")
        || name.contains(".is-reading.")
        || LEGACY_TEXT_REGEX.is_match(name)
}
