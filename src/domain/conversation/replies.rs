//! Fixed user-facing reply texts and footers.

/// Sent whenever the dialogue cannot produce a usable answer.
pub const REQUEST_FAILED: &str = "Не удалось выполнить запрос. Повторите позже";

/// Returned by the finalizer when the model's confirmation is unusable.
pub const FINALIZE_FAILED: &str = "Не удалось обработать ответ модели";

/// Appends the model version line.
pub fn with_model_footer(text: &str, model_version: &str) -> String {
    format!("{}\n\n📱 Модель: {}", text, model_version)
}

/// Appends the token usage line.
pub fn with_usage_footer(text: &str, input_tokens: u64, output_tokens: u64) -> String {
    format!(
        "{}\n\n🔤 Токены: {}/{} (вход/выход)",
        text, input_tokens, output_tokens
    )
}

/// Appends both the model version and token usage lines.
pub fn with_model_and_usage_footer(
    text: &str,
    model_version: &str,
    input_tokens: u64,
    output_tokens: u64,
) -> String {
    format!(
        "{}\n\n📱 Модель: {}\n🔤 Токены: {}/{} (вход/выход)",
        text, model_version, input_tokens, output_tokens
    )
}

/// Prefixes `text` with the model's reasoning when there is any.
pub fn with_reasoning(reasoning: Option<&str>, text: &str) -> String {
    match reasoning.map(str::trim).filter(|r| !r.is_empty()) {
        Some(reasoning) => format!("{}\n\n{}", reasoning, text),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn footers_follow_reply_format() {
        assert_eq!(with_model_footer("ok", "v1"), "ok\n\n📱 Модель: v1");
        assert_eq!(
            with_usage_footer("ok", 12, 7),
            "ok\n\n🔤 Токены: 12/7 (вход/выход)"
        );
        assert_eq!(
            with_model_and_usage_footer("ok", "v1", 3, 4),
            "ok\n\n📱 Модель: v1\n🔤 Токены: 3/4 (вход/выход)"
        );
    }

    #[test]
    fn reasoning_prefix_is_optional() {
        assert_eq!(with_reasoning(Some("потому что"), "Q?"), "потому что\n\nQ?");
        assert_eq!(with_reasoning(Some("  "), "Q?"), "Q?");
        assert_eq!(with_reasoning(None, "Q?"), "Q?");
    }
}
