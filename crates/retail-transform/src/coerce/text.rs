//! String normalization and table-driven value repair.

use std::collections::BTreeMap;

/// Trims a raw value and maps blanks to `None`.
pub fn normalize_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

/// Replaces a value found in `repairs`; returns whether a replacement happened.
pub fn repair_value(value: &mut String, repairs: &BTreeMap<String, String>) -> bool {
    match repairs.get(value.as_str()) {
        Some(fixed) if fixed != value => {
            value.clone_from(fixed);
            true
        }
        _ => false,
    }
}

/// Uppercases a code; returns whether the value changed.
pub fn uppercase_code(value: &mut String) -> bool {
    if value.chars().any(char::is_lowercase) {
        *value = value.to_uppercase();
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text(Some("  Germany ")).as_deref(), Some("Germany"));
        assert_eq!(normalize_text(Some("   ")), None);
        assert_eq!(normalize_text(None), None);
    }

    #[test]
    fn test_repair_value() {
        let repairs: BTreeMap<String, String> =
            [("GGB".to_string(), "GB".to_string())].into_iter().collect();
        let mut code = "GGB".to_string();
        assert!(repair_value(&mut code, &repairs));
        assert_eq!(code, "GB");
        assert!(!repair_value(&mut code, &repairs));
    }

    #[test]
    fn test_uppercase_code() {
        let mut code = "r7-3126933h".to_string();
        assert!(uppercase_code(&mut code));
        assert_eq!(code, "R7-3126933H");
        assert!(!uppercase_code(&mut code));
    }
}
