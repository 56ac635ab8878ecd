/// Get current timestamp in ISO 8601 format
pub fn now_iso() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Treat `Some("")` like `None`; optional inputs often arrive as empty strings.
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_iso_is_rfc3339() {
        assert!(chrono::DateTime::parse_from_rfc3339(&now_iso()).is_ok());
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Some("Foo")), Some("Foo"));
        assert_eq!(non_empty(Some("")), None);
        assert_eq!(non_empty(None), None);
    }
}
