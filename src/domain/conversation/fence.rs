//! Markdown code fence removal for model output.

/// Strips a surrounding markdown code fence from model output.
///
/// The input is trimmed. When it opens with ```` ``` ```` the whole first line
/// (including an optional language tag) is dropped; an opening fence with no
/// newline after it yields an empty string. A trailing ```` ``` ```` is then
/// removed and the result trimmed again.
///
/// Unfenced, trimmed input is returned unchanged, so the function is
/// idempotent on its own output.
pub fn strip_code_fence(raw: &str) -> String {
    let mut text = raw.trim();

    if text.starts_with("```") {
        match text.find('\n') {
            Some(newline) => text = &text[newline + 1..],
            None => return String::new(),
        }
    }

    let text = text.trim();
    let text = text.strip_suffix("```").unwrap_or(text);
    text.trim().to_string()
}
