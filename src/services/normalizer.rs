//! Label normalization service
//!
//! Maps raw categorical cells to the labels used as grouping keys so that
//! breakdowns, leaderboards and filters agree on what "the same value" is.

use crate::types::{Month, NOT_AVAILABLE};

/// Normalize a categorical cell to its grouping label.
///
/// Transformations:
/// - Surrounding whitespace is trimmed: " NORTE " → "NORTE"
/// - Missing or blank values become "N/A"
///
/// # Examples
/// ```
/// use fieldmetrics::services::normalizer::label_or_na;
///
/// assert_eq!(label_or_na(" NORTE "), "NORTE");
/// assert_eq!(label_or_na(""), "N/A");
/// ```
pub fn label_or_na(raw: &str) -> &str {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        NOT_AVAILABLE
    } else {
        trimmed
    }
}

/// Grouping label for a `mes` cell: the canonical month name, or "N/A" when
/// the cell is not one of the twelve months.
pub fn month_label(raw: &str) -> &'static str {
    Month::from_label(raw).map_or(NOT_AVAILABLE, Month::name)
}

/// Case-insensitive comparison of two labels after trimming
pub fn same_label(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========== label_or_na ==========

    #[test]
    fn test_label_trimmed() {
        assert_eq!(label_or_na("  SUR"), "SUR");
    }

    #[test]
    fn test_label_blank_is_na() {
        assert_eq!(label_or_na(""), "N/A");
        assert_eq!(label_or_na("   "), "N/A");
    }

    #[test]
    fn test_label_case_preserved() {
        assert_eq!(label_or_na("Fibra"), "Fibra");
    }

    // ========== month_label ==========

    #[test]
    fn test_month_label_canonical() {
        assert_eq!(month_label("enero"), "ENERO");
        assert_eq!(month_label("SETIEMBRE"), "SEPTIEMBRE");
    }

    #[test]
    fn test_month_label_unknown() {
        assert_eq!(month_label("ENE"), "N/A");
        assert_eq!(month_label(""), "N/A");
    }

    // ========== same_label ==========

    #[test]
    fn test_same_label() {
        assert!(same_label("Nuevo Servicio", "NUEVO SERVICIO "));
        assert!(!same_label("NUEVO", "NUEVO SERVICIO"));
    }
}
