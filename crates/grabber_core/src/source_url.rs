/// Drops tracking/playlist parameters from a pasted video link.
///
/// Everything from the first `&` is removed; short `youtu.be/` links also lose
/// their query string.
pub fn normalize_source_url(raw: &str) -> String {
    let trimmed = raw.trim();
    let mut cleaned = trimmed.split('&').next().unwrap_or(trimmed);
    if cleaned.contains("youtu.be/") {
        cleaned = cleaned.split('?').next().unwrap_or(cleaned);
    }
    cleaned.to_string()
}
