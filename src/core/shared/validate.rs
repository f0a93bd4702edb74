use chrono::{DateTime, Utc};

use super::error::{StoreError, StoreResult};

/// Checks a create or update input before any SQL is issued.
pub trait Validate {
    fn validate(&self) -> StoreResult<()>;
}

/// Partial update input (an `AsChangeset` struct with optional fields).
pub trait Changes {
    /// True when no caller-supplied field is set. `updatedAt` does not count.
    fn is_empty(&self) -> bool;

    /// Stamps `updatedAt` on models that carry it.
    fn touch(&mut self, _now: DateTime<Utc>) {}
}

pub fn non_empty(field: &str, value: &str) -> StoreResult<()> {
    if value.trim().is_empty() {
        return Err(StoreError::validation(format!("{field} must not be empty")));
    }
    Ok(())
}

pub fn non_negative(field: &str, value: i32) -> StoreResult<()> {
    if value < 0 {
        return Err(StoreError::validation(format!(
            "{field} must not be negative (got {value})"
        )));
    }
    Ok(())
}

pub fn json_text(field: &str, value: &str) -> StoreResult<()> {
    serde_json::from_str::<serde_json::Value>(value)
        .map(|_| ())
        .map_err(|e| StoreError::validation(format!("{field} is not valid JSON: {e}")))
}

/// Millisecond range of a candidate or clip: `0 <= start < end`.
pub fn time_range(start_ms: i32, end_ms: i32) -> StoreResult<()> {
    non_negative("startMs", start_ms)?;
    if end_ms <= start_ms {
        return Err(StoreError::validation(format!(
            "endMs ({end_ms}) must be greater than startMs ({start_ms})"
        )));
    }
    Ok(())
}

/// Accepts `#RRGGBB`, `#RRGGBBAA`, `&HBBGGRR` and `&HAABBGGRR` (ASS style).
pub fn color(field: &str, value: &str) -> StoreResult<()> {
    let digits = value
        .strip_prefix('#')
        .or_else(|| value.strip_prefix("&H"))
        .or_else(|| value.strip_prefix("&h"))
        .map(|d| d.trim_end_matches('&'));
    match digits {
        Some(d) if matches!(d.len(), 6 | 8) && d.chars().all(|c| c.is_ascii_hexdigit()) => Ok(()),
        _ => Err(StoreError::validation(format!(
            "{field} is not a colour: {value}"
        ))),
    }
}

pub fn alignment(value: i32) -> StoreResult<()> {
    if !(1..=9).contains(&value) {
        return Err(StoreError::validation(format!(
            "alignment must be between 1 and 9 (got {value})"
        )));
    }
    Ok(())
}

pub fn optional<T>(value: &Option<T>, check: impl FnOnce(&T) -> StoreResult<()>) -> StoreResult<()> {
    match value {
        Some(v) => check(v),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_range() {
        assert!(time_range(0, 1500).is_ok());
        assert!(time_range(1500, 1500).is_err());
        assert!(time_range(2000, 1000).is_err());
        assert!(time_range(-1, 1000).is_err());
    }

    #[test]
    fn test_json_text() {
        assert!(json_text("statsJson", r#"{"energy": 0.7}"#).is_ok());
        assert!(json_text("statsJson", "[]").is_ok());
        let err = json_text("statsJson", "{not json").unwrap_err();
        assert!(err.to_string().contains("statsJson"));
    }

    #[test]
    fn test_color_formats() {
        assert!(color("primaryColor", "#FFFFFF").is_ok());
        assert!(color("primaryColor", "#ff00ff80").is_ok());
        assert!(color("outlineColor", "&H00000000").is_ok());
        assert!(color("outlineColor", "&H00FFFF&").is_ok());
        assert!(color("outlineColor", "white").is_err());
        assert!(color("outlineColor", "#FFF").is_err());
    }

    #[test]
    fn test_alignment_bounds() {
        assert!(alignment(2).is_ok());
        assert!(alignment(0).is_err());
        assert!(alignment(10).is_err());
    }

    #[test]
    fn test_non_empty_and_non_negative() {
        assert!(non_empty("title", "  ").is_err());
        assert!(non_empty("title", "Podcast #12").is_ok());
        assert!(non_negative("views", -3).is_err());
        assert!(non_negative("views", 0).is_ok());
    }

    #[test]
    fn test_optional_skips_none() {
        assert!(optional(&None::<i32>, |v| non_negative("views", *v)).is_ok());
        assert!(optional(&Some(-1), |v| non_negative("views", *v)).is_err());
    }
}
