/// Canonical form used when comparing identifiers from different sources.
pub fn normalize_identifier(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    cleaned.trim().trim_matches('"').trim().to_lowercase()
}
