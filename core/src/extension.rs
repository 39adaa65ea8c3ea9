//! File-type hints from resource locators.

use percent_encoding::percent_decode_str;

/// Derive a lowercase file-type hint from a resource locator.
///
/// Returns the text after the last `.` of the final path segment, or an
/// empty string when the segment has no `.` or ends with one. The MIME type
/// reported by the host is not consulted.
///
/// Locators with a scheme (`content://…`) lose their query and fragment
/// first. Percent-escapes are decoded before splitting, since document
/// providers encode `/` inside the last segment as `%2F`.
pub fn resolve_extension(locator: &str) -> String {
    let path = if locator.contains("://") {
        locator.split(['?', '#']).next().unwrap_or(locator)
    } else {
        locator
    };
    let decoded = percent_decode_str(path).decode_utf8_lossy();

    let segment = decoded.rsplit('/').next().unwrap_or_default();
    match segment.rfind('.') {
        Some(dot) if dot + 1 < segment.len() => segment[dot + 1..].to_lowercase(),
        _ => String::new(),
    }
}
