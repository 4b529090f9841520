//! Parse model output into a JSON record

use crate::error::ExtractorError;
use serde_json::Value;

/// Body of a fenced response
///
/// Takes the text after the first code fence (dropping its language tag)
/// up to the closing fence, which may be missing when the response was
/// truncated. Unfenced text is returned trimmed.
pub fn strip_fences(response: &str) -> &str {
    let trimmed = response.trim();
    let Some(open) = trimmed.find("```") else {
        return trimmed;
    };
    let after = &trimmed[open + 3..];
    // Language tag runs to the end of the fence line
    let body = match after.find(|c: char| c == '\n' || c == '{' || c == '[') {
        Some(i) if after[..i].chars().all(|c| c.is_ascii_alphanumeric() || c == ' ') => &after[i..],
        _ => after,
    };
    let body = match body.find("```") {
        Some(close) => &body[..close],
        None => body,
    };
    body.trim()
}

/// JSON text of a response: fences removed, leading prose dropped
pub fn json_body(response: &str) -> &str {
    let body = strip_fences(response);
    match body.find('{') {
        Some(start) => &body[start..],
        None => body,
    }
}

/// Parse a response into a JSON object
///
/// # Errors
///
/// `StructuralParse` when the body is not valid JSON or not an object.
pub fn parse_record(response: &str) -> Result<Value, ExtractorError> {
    let body = json_body(response);
    let value: Value = serde_json::from_str(body)?;
    if !value.is_object() {
        return Err(ExtractorError::StructuralParse(
            "Expected a JSON object".to_string(),
        ));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fenced_response() {
        let r = "```json\n{\"a\": 1}\n```";
        assert_eq!(strip_fences(r), "{\"a\": 1}");
        assert_eq!(parse_record(r).unwrap()["a"], 1);
    }

    #[test]
    fn test_prose_around_fence() {
        let r = "Here you go:\n```json\n{\"a\": [1]}\n```\nAnything else?";
        assert_eq!(parse_record(r).unwrap()["a"][0], 1);
    }

    #[test]
    fn test_unclosed_fence_keeps_body() {
        let r = "```json\n{\"a\": [1, 2";
        assert_eq!(strip_fences(r), "{\"a\": [1, 2");
        assert!(matches!(parse_record(r), Err(ExtractorError::StructuralParse(_))));
    }

    #[test]
    fn test_bare_json_and_same_line_fence() {
        assert_eq!(parse_record("  {\"a\": 2} ").unwrap()["a"], 2);
        assert_eq!(parse_record("```{\"a\": 3}```").unwrap()["a"], 3);
    }

    #[test]
    fn test_non_object_is_rejected() {
        assert!(parse_record("[1, 2]").is_err());
        assert!(parse_record("not json").is_err());
    }
}
