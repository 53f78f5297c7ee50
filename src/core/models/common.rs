use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Records that carry a creation timestamp and can be placed on a timeline.
pub trait Timestamped {
    fn created_at(&self) -> Option<DateTime<Utc>>;
}

/// Records whose status is reported as a free-form label.
pub trait HasStatus {
    fn status_label(&self) -> &str;
}

/// Parse a decimal that may arrive as a string with thousands separators.
///
/// - Trims whitespace.
/// - Rejects values that contain alphabetic characters (`NaN`, `inf`, `12abc`).
/// - Strips `","` before parsing.
/// - Returns `None` for anything that is not a finite number.
pub fn parse_decimal(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    s.replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

fn decimal_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_decimal(s),
        _ => None,
    }
}

/// Deserialize a decimal field leniently: numbers and numeric strings are
/// accepted, everything else (null, objects, garbage text) becomes `None`.
pub fn lenient_decimal<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(decimal_from_value))
}

/// Deserialize a non-negative counter leniently. Negative or fractional
/// values are truncated toward zero, unparseable values become `None`.
pub fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let truncate = |f: f64| f.max(0.0).trunc() as u64;
    Ok(match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(truncate)),
        Some(Value::String(s)) => parse_decimal(&s).map(truncate),
        _ => None,
    })
}

/// Deserialize a timestamp leniently. RFC 3339 strings and bare `YYYY-MM-DD`
/// dates are accepted; anything else becomes `None`.
pub fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => parse_timestamp(&s),
        _ => None,
    })
}

/// Deserialize a text field leniently. Strings pass through, numbers keep
/// their textual form, `null` and anything else become the empty string.
pub fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}

/// Deserialize a status label leniently into any label type built from a
/// string. A `null` or non-string label yields the type's default.
pub fn lenient_label<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: From<String> + Default,
{
    Ok(lenient_optional_label(deserializer)?.unwrap_or_default())
}

/// Like [`lenient_label`], for labels that may be absent.
pub fn lenient_optional_label<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: From<String>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(T::from(s)),
        _ => None,
    })
}

pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Normalize a status label for matching: trimmed, lowercase, with spaces and
/// dashes folded into underscores.
pub(crate) fn normalize_label(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[derive(Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "lenient_decimal")]
        amount: Option<f64>,
        #[serde(default, deserialize_with = "lenient_count")]
        count: Option<u64>,
        #[serde(default, deserialize_with = "lenient_timestamp")]
        at: Option<DateTime<Utc>>,
    }

    #[derive(Deserialize)]
    struct Labelled {
        #[serde(default, deserialize_with = "lenient_string")]
        name: String,
        #[serde(default, deserialize_with = "lenient_label")]
        label: Fallback,
        #[serde(default, deserialize_with = "lenient_optional_label")]
        extra: Option<Fallback>,
    }

    #[derive(Debug, PartialEq)]
    struct Fallback(String);

    impl From<String> for Fallback {
        fn from(raw: String) -> Self {
            Fallback(raw)
        }
    }

    impl Default for Fallback {
        fn default() -> Self {
            Fallback("unset".to_string())
        }
    }

    #[test]
    fn test_parse_decimal_strips_separators() {
        assert_eq!(parse_decimal(" 1,250.50 "), Some(1250.5));
        assert_eq!(parse_decimal("500"), Some(500.0));
    }

    #[test]
    fn test_parse_decimal_rejects_text_and_non_finite() {
        assert_eq!(parse_decimal(""), None);
        assert_eq!(parse_decimal("NaN"), None);
        assert_eq!(parse_decimal("inf"), None);
        assert_eq!(parse_decimal("12abc"), None);
    }

    #[test]
    fn test_lenient_fields_accept_sparse_input() {
        let sample: Sample = serde_json::from_str(r#"{"amount": null, "count": "3", "at": "garbage"}"#).unwrap();
        assert_eq!(sample.amount, None);
        assert_eq!(sample.count, Some(3));
        assert_eq!(sample.at, None);

        let sample: Sample = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(sample.amount, None);
        assert_eq!(sample.count, None);

        let sample: Sample = serde_json::from_str(r#"{"amount": {"value": 1}, "count": -4}"#).unwrap();
        assert_eq!(sample.amount, None);
        assert_eq!(sample.count, Some(0));
    }

    #[test]
    fn test_null_text_and_labels_fall_back_to_defaults() {
        let labelled: Labelled = serde_json::from_str(r#"{"name": null, "label": null, "extra": null}"#).unwrap();
        assert_eq!(labelled.name, "");
        assert_eq!(labelled.label, Fallback::default());
        assert_eq!(labelled.extra, None);

        let labelled: Labelled = serde_json::from_str(r#"{"name": 42, "label": ["x"], "extra": 7}"#).unwrap();
        assert_eq!(labelled.name, "42");
        assert_eq!(labelled.label, Fallback::default());
        assert_eq!(labelled.extra, None);

        let labelled: Labelled = serde_json::from_str(r#"{"name": "n", "label": "open", "extra": "x"}"#).unwrap();
        assert_eq!(labelled.name, "n");
        assert_eq!(labelled.label, Fallback("open".to_string()));
        assert_eq!(labelled.extra, Some(Fallback("x".to_string())));

        let labelled: Labelled = serde_json::from_str("{}").unwrap();
        assert_eq!(labelled.label, Fallback::default());
    }

    #[test]
    fn test_parse_timestamp_normalizes_to_utc() {
        let ts = parse_timestamp("2024-03-01T23:30:00-05:00").unwrap();
        assert_eq!(ts.day(), 2);
        assert_eq!(ts.hour(), 4);

        let ts = parse_timestamp("2024-03-01").unwrap();
        assert_eq!(ts.day(), 1);
        assert_eq!(ts.hour(), 0);
    }

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label(" Under Review "), "under_review");
        assert_eq!(normalize_label("under-review"), "under_review");
    }
}
