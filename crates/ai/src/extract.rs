//! Locating structured data inside model text.

const FENCE: &str = "```";

/// Strip one code fence enclosing `text`.
///
/// The opening fence may carry a language tag (```` ```json ````). Text
/// that is not wrapped in a fence is returned unchanged.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix(FENCE) else {
        return text;
    };
    let Some((_tag, body)) = rest.split_once('\n') else {
        return text;
    };
    match body.trim_end().strip_suffix(FENCE) {
        Some(inner) => inner.trim(),
        None => text,
    }
}
