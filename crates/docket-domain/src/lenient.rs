//! Forgiving field deserializers for model-produced records
//!
//! Models answer `"123 apples"` for a quantity or `05/01/2024` for a date.
//! Unusable values become `None` instead of failing the whole record.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Leading numeric prefix of a value, e.g. `"-12.5 USD"` -> `-12.5`
pub(crate) fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim_start();
            let mut end = 0;
            let mut seen_dot = false;
            for (i, c) in s.char_indices() {
                let ok = c.is_ascii_digit()
                    || (c == '-' && i == 0)
                    || (c == '.' && !seen_dot && i > 0);
                if !ok {
                    break;
                }
                seen_dot |= c == '.';
                end = i + c.len_utf8();
            }
            s[..end].trim_end_matches('.').parse().ok()
        }
        _ => None,
    }
}

/// Date in one of the formats models commonly produce
pub(crate) fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    // Datetimes: keep the date part only
    let raw = raw.split(['T', ' ']).next().unwrap_or(raw);
    let normalized = raw.replace(['.', '/'], "-");
    ["%Y-%m-%d", "%d-%m-%Y", "%m-%d-%Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&normalized, fmt).ok())
}

pub(crate) fn number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    let v = Option::<Value>::deserialize(d)?;
    Ok(v.as_ref().and_then(parse_number))
}

pub(crate) fn integer<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    let v = Option::<Value>::deserialize(d)?;
    Ok(v.as_ref().and_then(parse_number).map(|n| n.trunc() as i64))
}

pub(crate) fn date<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
    let v = Option::<Value>::deserialize(d)?;
    Ok(match v {
        Some(Value::String(s)) => parse_date(&s),
        _ => None,
    })
}

/// Strings, with numbers and booleans rendered as text
pub(crate) fn text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let v = Option::<Value>::deserialize(d)?;
    Ok(match v {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// Lists whose elements failed to parse are dropped element by element
pub(crate) fn list<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let v = Option::<Value>::deserialize(d)?;
    Ok(match v {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(&json!(3)), Some(3.0));
        assert_eq!(parse_number(&json!("123 apples")), Some(123.0));
        assert_eq!(parse_number(&json!(" -12.50 USD")), Some(-12.5));
        assert_eq!(parse_number(&json!("7.")), Some(7.0));
        assert_eq!(parse_number(&json!("abc")), None);
        assert_eq!(parse_number(&json!(null)), None);
    }

    #[test]
    fn test_parse_date() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 15);
        assert_eq!(parse_date("2024-03-15"), expected);
        assert_eq!(parse_date("15/03/2024"), expected);
        assert_eq!(parse_date("15.03.2024"), expected);
        assert_eq!(parse_date("2024/03/15"), expected);
        assert_eq!(parse_date("2024-03-15T10:00:00Z"), expected);
        assert_eq!(parse_date("March 15"), None);
    }
}
