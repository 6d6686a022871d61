use crate::domain::error::{AppError, Result};
use once_cell::sync::Lazy;
use regex::Regex;

static CODE_FENCE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```(?:[a-zA-Z]+)?\s*([\s\S]*?)\s*```").unwrap());

const DIAGNOSTIC_PREVIEW_CHARS: usize = 200;

/// Recovers a JSON object from free-form LLM output that nominally contains a
/// single JSON document, possibly wrapped in a markdown code fence.
///
/// Fence-stripping is the only repair performed. Anything that still fails to
/// parse is a hard failure carrying a truncated copy of the raw text, so
/// callers can present a uniform "generation failed" message instead of a raw
/// parser error.
pub fn extract_json_object(raw: &str) -> Result<serde_json::Value> {
    let trimmed = raw.trim();

    let candidate = match CODE_FENCE_PATTERN.captures(trimmed) {
        Some(captures) => captures.get(1).map(|m| m.as_str()).unwrap_or(trimmed),
        None => trimmed,
    };

    serde_json::from_str(candidate).map_err(|err| {
        AppError::MalformedSpec(format!(
            "not valid JSON ({}): {}",
            err,
            truncate_chars(trimmed, DIAGNOSTIC_PREVIEW_CHARS)
        ))
    })
}

/// Strips a wrapping code fence from a text reply (HTML, Markdown), returning
/// the trimmed inner content. Unfenced text passes through trimmed. Unlike
/// `extract_json_object` there is no parse step; empty output is the caller's
/// problem to reject.
pub fn extract_fenced_text(raw: &str) -> String {
    let trimmed = raw.trim();
    match CODE_FENCE_PATTERN.captures(trimmed) {
        Some(captures) => captures
            .get(1)
            .map(|m| m.as_str())
            .unwrap_or(trimmed)
            .trim()
            .to_string(),
        None => trimmed.to_string(),
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_fenced_json() {
        let raw = "```json\n{\"a\":1}\n```";
        assert_eq!(extract_json_object(raw).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn test_extract_bare_fence() {
        let raw = "```\n{\"a\":1}\n```";
        assert_eq!(extract_json_object(raw).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn test_extract_unfenced_json() {
        assert_eq!(extract_json_object("{\"a\":1}").unwrap(), json!({"a": 1}));
    }

    #[test]
    fn test_extract_with_surrounding_prose() {
        let raw = "Here is the workflow you asked for:\n```json\n{\"nodes\":[]}\n```\nLet me know!";
        assert_eq!(extract_json_object(raw).unwrap(), json!({"nodes": []}));
    }

    #[test]
    fn test_extract_whitespace_padding() {
        assert_eq!(
            extract_json_object("  \n {\"a\": [1, 2]} \n ").unwrap(),
            json!({"a": [1, 2]})
        );
    }

    #[test]
    fn test_not_json_fails_with_malformed_spec() {
        let err = extract_json_object("not json").unwrap_err();
        match err {
            AppError::MalformedSpec(msg) => assert!(msg.contains("not json")),
            other => panic!("expected MalformedSpec, got {:?}", other),
        }
    }

    #[test]
    fn test_partial_json_is_not_repaired() {
        let err = extract_json_object("{\"a\": 1").unwrap_err();
        assert!(matches!(err, AppError::MalformedSpec(_)));
    }

    #[test]
    fn test_diagnostic_is_truncated() {
        let raw = format!("x{}", "y".repeat(5000));
        let err = extract_json_object(&raw).unwrap_err();
        match err {
            AppError::MalformedSpec(msg) => assert!(msg.len() < 400),
            other => panic!("expected MalformedSpec, got {:?}", other),
        }
    }

    #[test]
    fn test_extract_fenced_text_strips_language_fence() {
        assert_eq!(
            extract_fenced_text("```html\n<html><body>hi</body></html>\n```"),
            "<html><body>hi</body></html>"
        );
        assert_eq!(extract_fenced_text("```markdown\n# Guide\n```"), "# Guide");
        assert_eq!(extract_fenced_text("  plain text  "), "plain text");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let raw = "\u{e9}".repeat(300);
        // Must not panic on multi-byte boundaries.
        let preview = truncate_chars(&raw, DIAGNOSTIC_PREVIEW_CHARS);
        assert!(preview.ends_with("..."));
    }
}
