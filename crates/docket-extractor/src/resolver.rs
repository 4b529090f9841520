//! Reprocessing context resolver
//!
//! Works out which list a truncated response was filling, where the model
//! should resume, and how to stitch the continuation back in. Like the
//! scanner, everything here is pure text work.

use crate::error::ExtractorError;
use crate::parser::strip_fences;
use crate::prompt::render;
use crate::scanner::{remove_trailing_commas, string_mask, unclosed};
use docket_domain::{Anchor, ListSpec, PromptOperation, RepairContext, RepairProfile};
use regex::Regex;

/// Byte ranges of every `"name":` key in the text
fn keys(text: &str, name: &str) -> Vec<(usize, usize)> {
    let pattern = format!(r#""{}"\s*:\s*"#, regex::escape(name));
    match Regex::new(&pattern) {
        Ok(re) => re.find_iter(text).map(|m| (m.start(), m.end())).collect(),
        Err(_) => Vec::new(),
    }
}

/// Byte range of the last `"name":` key in the text
fn last_key(text: &str, name: &str) -> Option<(usize, usize)> {
    keys(text, name).pop()
}

/// Repairable list whose key appears last in the text
///
/// That list is taken to be the one the model was filling when it was cut
/// off. `None` means the context is unknown.
pub fn detect_context<'a>(cleaned: &str, profile: &'a RepairProfile) -> Option<&'a ListSpec> {
    profile
        .lists
        .iter()
        .filter_map(|list| last_key(cleaned, &list.name).map(|(start, _)| (start, list)))
        .max_by_key(|(start, _)| *start)
        .map(|(_, list)| list)
}

/// Literal value of the last `attribute` inside the named list
///
/// Quoted values run to the next unescaped quote and are returned without
/// the quotes. Bare values are a run of digits, `.` and `-` that must parse
/// as a number. Returns `None` when the attribute never occurs.
///
/// # Examples
///
/// ```
/// use docket_extractor::resolver::extract_anchor;
///
/// let text = r#"{"movements": [{"value": -12.5, "note": "a \"b\""},"#;
/// assert_eq!(extract_anchor(text, "movements", "value").as_deref(), Some("-12.5"));
/// assert_eq!(extract_anchor(text, "movements", "note").as_deref(), Some(r#"a \"b\""#));
/// assert_eq!(extract_anchor(text, "movements", "missing"), None);
/// ```
pub fn extract_anchor(cleaned: &str, list: &str, attribute: &str) -> Option<String> {
    let region_start = last_key(cleaned, list).map(|(_, end)| end).unwrap_or(0);
    anchor_in(&cleaned[region_start..], attribute)
}

fn anchor_in(region: &str, attribute: &str) -> Option<String> {
    let (_, value_start) = last_key(region, attribute)?;
    let rest = &region[value_start..];

    if let Some(quoted) = rest.strip_prefix('"') {
        let mut escaped = false;
        for (i, c) in quoted.char_indices() {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                return Some(quoted[..i].to_string());
            }
        }
        return None;
    }

    let end = rest
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-'))
        .unwrap_or(rest.len());
    let literal = &rest[..end];
    literal.parse::<f64>().ok().map(|_| literal.to_string())
}

/// Whether the named list was opened but holds nothing yet
pub fn is_empty_list(cleaned: &str, list: &str) -> bool {
    let pattern = format!(r#""{}"\s*:\s*\[\s*$"#, regex::escape(list));
    Regex::new(&pattern)
        .map(|re| re.is_match(cleaned))
        .unwrap_or(false)
}

/// Whether the list starting at the beginning of `rest` is never closed
fn list_is_open(rest: &str) -> bool {
    if !rest.starts_with('[') {
        return false;
    }
    let mask = string_mask(rest);
    let mut depth = 0usize;
    for (i, b) in rest.bytes().enumerate() {
        if mask[i] {
            continue;
        }
        match b {
            b'[' | b'{' => depth += 1,
            b']' | b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    true
}

/// Innermost repairable list that is still open, with the end of its key
///
/// Keys are tried from the last occurrence backwards, so a closed list of
/// the same name nested in an earlier element is skipped.
fn open_list<'a>(cleaned: &str, profile: &'a RepairProfile) -> Option<(&'a ListSpec, usize)> {
    let mut candidates: Vec<(usize, usize, &ListSpec)> = profile
        .lists
        .iter()
        .flat_map(|list| {
            keys(cleaned, &list.name)
                .into_iter()
                .map(move |(start, end)| (start, end, list))
        })
        .collect();
    candidates.sort_by(|a, b| b.0.cmp(&a.0));
    candidates
        .into_iter()
        .find(|(_, end, _)| list_is_open(&cleaned[*end..]))
        .map(|(_, end, list)| (list, end))
}

/// Build the repair context for scanner output
///
/// # Errors
///
/// `ReprocessingAborted` when no repairable list is found, when every list
/// found is already closed, or when an anchor attribute is missing from the
/// last complete element.
pub fn resolve(cleaned: &str, profile: &RepairProfile) -> Result<RepairContext, ExtractorError> {
    let detected = detect_context(cleaned, profile).ok_or_else(|| {
        ExtractorError::ReprocessingAborted("no repairable list in response".to_string())
    })?;

    let (list, key_end) = open_list(cleaned, profile).ok_or_else(|| {
        ExtractorError::ReprocessingAborted(format!(
            "response was cut outside the `{}` list",
            detected.name
        ))
    })?;
    let region = &cleaned[key_end..];

    if is_empty_list(cleaned, &list.name) {
        return Ok(RepairContext {
            array_path: list.name.clone(),
            last_complete_element_anchor: Vec::new(),
            continuation_template_ref: PromptOperation::ReprocessWithoutContext,
        });
    }

    let anchors = list
        .anchors
        .iter()
        .map(|attribute| {
            anchor_in(region, attribute)
                .map(|value| Anchor {
                    attribute: attribute.clone(),
                    value,
                })
                .ok_or_else(|| {
                    ExtractorError::ReprocessingAborted(format!(
                        "anchor `{}` not found in `{}`",
                        attribute, list.name
                    ))
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RepairContext {
        array_path: list.name.clone(),
        last_complete_element_anchor: anchors,
        continuation_template_ref: PromptOperation::ReprocessWithContext,
    })
}

/// Render a continuation request from its template
///
/// Binds `{list}`, `{anchors}`, `{anchor_1}`, `{anchor_2}` and
/// `{instruction}`.
pub fn continuation_prompt(template: &str, context: &RepairContext) -> String {
    let anchors = context
        .last_complete_element_anchor
        .iter()
        .map(|a| format!("{} = {}", a.attribute, a.value))
        .collect::<Vec<_>>()
        .join(", ");
    let anchor_at = |i: usize| {
        context
            .last_complete_element_anchor
            .get(i)
            .map(|a| a.value.as_str())
            .unwrap_or("")
    };
    let instruction = if context.from_beginning() {
        format!(
            "list every element of `{}` starting from the beginning",
            context.array_path
        )
    } else {
        format!(
            "starting right after the element with {}; do not repeat that element or any before it",
            anchors
        )
    };

    render(
        template,
        &[
            ("list", &context.array_path),
            ("anchors", &anchors),
            ("anchor_1", anchor_at(0)),
            ("anchor_2", anchor_at(1)),
            ("instruction", &instruction),
        ],
    )
}

/// Append a continuation to the cleaned prefix
///
/// The continuation's fences and leading `[` are dropped since its
/// elements go inside the list that is still open. Commas left before a
/// closer are removed and the record is completed by [`finalize`].
pub fn stitch(cleaned: &str, continuation: &str, profile: &RepairProfile) -> String {
    let body = strip_fences(continuation);
    let body = body.strip_prefix('[').unwrap_or(body).trim();
    let base = cleaned.trim_end();
    let joined = if body.is_empty() {
        format!("{}]", base)
    } else {
        format!("{}\n{}", base, body)
    };
    finalize(&remove_trailing_commas(&joined), profile)
}

/// Add required lists that never appeared and close the enclosing object
///
/// Applies only when the top-level object is the last thing open, or has
/// just been closed. Deeper truncation is left alone for the next round.
pub fn finalize(text: &str, profile: &RepairProfile) -> String {
    let t = text.trim_end();
    let missing: Vec<&str> = profile
        .lists
        .iter()
        .filter(|l| last_key(t, &l.name).is_none())
        .map(|l| l.name.as_str())
        .collect();

    let open_body = match unclosed(t) {
        Some(stack) if stack == [b'{'] => t,
        Some(stack) if stack.is_empty() && !missing.is_empty() => match t.strip_suffix('}') {
            Some(body) => body.trim_end(),
            None => return t.to_string(),
        },
        _ => return t.to_string(),
    };

    let open_body = open_body.strip_suffix(',').unwrap_or(open_body);
    let mut out = open_body.to_string();
    for name in missing {
        out.push_str(&format!(",\n  \"{}\": []", name));
    }
    out.push_str("\n}");
    out
}
