/// Normalizes a raw search key for URL substitution: surrounding
/// whitespace is trimmed and internal spaces are stripped, so " E1 7AD "
/// becomes "E17AD".
pub fn normalize_postcode(raw: &str) -> String {
    raw.trim().replace(' ', "")
}
