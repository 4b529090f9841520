//! Truncation scanner
//!
//! Pure text analysis of JSON that was cut off mid-structure. Nothing here
//! performs I/O, so every function can be tested without a model.
//!
//! The scans work on bytes. Every structural character is ASCII and UTF-8
//! continuation bytes are always `>= 0x80`, so a byte offset that holds a
//! structural character is always a valid `str` slice boundary.

/// Mark every byte that belongs to a string literal, quotes included
///
/// Escapes are honoured, so `"a\"]"` is masked end to end. Bytes after an
/// unterminated opening quote are all masked.
pub fn string_mask(text: &str) -> Vec<bool> {
    scan_strings(text).0
}

/// String mask plus whether the text ends inside an unterminated literal
fn scan_strings(text: &str) -> (Vec<bool>, bool) {
    let bytes = text.as_bytes();
    let mut mask = vec![false; bytes.len()];
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate() {
        if in_string {
            mask[i] = true;
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
        } else if b == b'"' {
            in_string = true;
            mask[i] = true;
        }
    }
    (mask, in_string)
}

/// Cut truncated JSON back to the last complete element of its last list
///
/// Finds the last array opened at bracket depth 0 and keeps everything up
/// to the end of its last fully-closed object element:
///
/// - the element is followed by a comma: the comma is kept;
/// - it is followed by `]` or `}`: the text stops at the element;
/// - anything else (usually end of text): a comma is appended.
///
/// When the list holds no complete element the text ends right after its
/// `[`. Text without an array, or whose last array is already closed, is
/// returned unchanged, so complete JSON is never altered and the function
/// is idempotent.
///
/// Only objects that are direct children of the list count as elements;
/// a complete object nested inside a partial element is never returned as
/// the cut point.
///
/// # Examples
///
/// ```
/// use docket_extractor::scanner::truncate_to_complete;
///
/// let cut = truncate_to_complete(r#"{"items": [{"a": 1}, {"a": 2}, {"a"#);
/// assert_eq!(cut, r#"{"items": [{"a": 1}, {"a": 2},"#);
/// ```
pub fn truncate_to_complete(text: &str) -> String {
    let t = text.trim_end();
    let bytes = t.as_bytes();
    let mask = string_mask(t);

    let Some(array_start) = last_open_top_level_array(bytes, &mask) else {
        return text.to_string();
    };

    // Depth of each offset relative to the inside of the list, used to
    // tell direct elements from objects nested in a partial element.
    let mut relative_depth = vec![0usize; bytes.len()];
    let mut depth = 0usize;
    for i in array_start + 1..bytes.len() {
        relative_depth[i] = depth;
        if mask[i] {
            continue;
        }
        match bytes[i] {
            b'{' | b'[' => depth += 1,
            b'}' | b']' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }

    let mut nested_arrays = 0usize;
    let mut braces = 0usize;
    let mut last_end: Option<usize> = None;
    let mut i = bytes.len();
    while i > array_start + 1 {
        i -= 1;
        if mask[i] {
            continue;
        }
        match bytes[i] {
            b']' => nested_arrays += 1,
            b'[' => nested_arrays = nested_arrays.saturating_sub(1),
            b'}' => {
                braces += 1;
                if braces == 1 && nested_arrays == 0 && last_end.is_none() {
                    last_end = Some(i);
                }
            }
            b'{' => {
                if braces == 0 {
                    continue;
                }
                braces -= 1;
                if braces != 0 || nested_arrays != 0 {
                    continue;
                }
                let Some(end) = last_end else { continue };
                if relative_depth[i] != 0 {
                    // Complete object inside a partial element
                    last_end = None;
                    continue;
                }
                return finish_after(t, end);
            }
            _ => {}
        }
    }

    t[..=array_start].to_string()
}

fn finish_after(t: &str, end: usize) -> String {
    let bytes = t.as_bytes();
    let mut j = end + 1;
    while j < bytes.len() && bytes[j].is_ascii_whitespace() {
        j += 1;
    }
    match bytes.get(j) {
        Some(b',') => t[..=j].to_string(),
        Some(b']') | Some(b'}') => t[..=end].to_string(),
        _ => format!("{},", &t[..=end]),
    }
}

/// Offset of the last `[` opened at bracket depth 0, if that list is still open
fn last_open_top_level_array(bytes: &[u8], mask: &[bool]) -> Option<usize> {
    let mut depth = 0usize;
    let mut start = None;
    let mut closed = false;
    for (i, &b) in bytes.iter().enumerate() {
        if mask[i] {
            continue;
        }
        match b {
            b'[' => {
                if depth == 0 {
                    start = Some(i);
                    closed = false;
                }
                depth += 1;
            }
            b']' => {
                if depth > 0 {
                    depth -= 1;
                    if depth == 0 {
                        closed = true;
                    }
                }
            }
            _ => {}
        }
    }
    if closed {
        None
    } else {
        start
    }
}

/// Openers (`{` or `[`) still unclosed at the end of the text, outermost first
///
/// Returns `None` when the text ends inside a string literal.
pub fn unclosed(text: &str) -> Option<Vec<u8>> {
    let bytes = text.as_bytes();
    let (mask, ends_in_string) = scan_strings(text);
    if ends_in_string {
        return None;
    }
    let mut stack = Vec::new();
    for (i, &b) in bytes.iter().enumerate() {
        if mask[i] {
            continue;
        }
        match b {
            b'{' | b'[' => stack.push(b),
            b'}' | b']' => {
                stack.pop();
            }
            _ => {}
        }
    }
    Some(stack)
}

/// Remove commas that directly precede a closer, ignoring string contents
///
/// `[1, 2, ]` becomes `[1, 2 ]`.
pub fn remove_trailing_commas(text: &str) -> String {
    let bytes = text.as_bytes();
    let mask = string_mask(text);
    let mut keep = vec![true; bytes.len()];
    for (i, &b) in bytes.iter().enumerate() {
        if mask[i] || b != b',' {
            continue;
        }
        let next = bytes[i + 1..]
            .iter()
            .position(|c| !c.is_ascii_whitespace())
            .map(|p| bytes[i + 1 + p]);
        if matches!(next, Some(b']') | Some(b'}')) {
            keep[i] = false;
        }
    }
    let kept: Vec<u8> = bytes
        .iter()
        .zip(keep)
        .filter_map(|(&b, k)| k.then_some(b))
        .collect();
    // Only ASCII commas were removed, so the bytes are still valid UTF-8
    String::from_utf8(kept).unwrap_or_else(|_| text.to_string())
}

/// Whether the text stops right after a complete value
///
/// True when the last token is a closer, a terminated string, a `true`,
/// `false` or `null` literal, or a comma following any value. A bare number
/// at the end may have been cut mid-digit and is never complete.
pub fn ends_on_complete_value(text: &str) -> bool {
    let t = text.trim_end();
    if unclosed(t).is_none() {
        return false;
    }
    if t.ends_with(',') {
        return true;
    }
    match t.as_bytes().last() {
        Some(b'}') | Some(b']') | Some(b'"') => true,
        _ => t.ends_with("true") || t.ends_with("false") || t.ends_with("null"),
    }
}

/// Close every open structure of a truncated-but-clean prefix
///
/// Drops a dangling trailing comma and appends the matching closers.
/// Returns `None` when the text ends inside a string literal.
pub fn close(text: &str) -> Option<String> {
    let trimmed = text.trim_end();
    let trimmed = trimmed.strip_suffix(',').unwrap_or(trimmed);
    let stack = unclosed(trimmed)?;
    let mut closed = trimmed.to_string();
    for opener in stack.iter().rev() {
        closed.push(if *opener == b'{' { '}' } else { ']' });
    }
    Some(closed)
}
