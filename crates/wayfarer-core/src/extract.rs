//! # Structured-Payload Extraction
//!
//! Models wrap their tool calls in prose, repeat explanatory objects before
//! the real payload, or emit several JSON fragments. The extractor tries a
//! JSON decode at every `{` in the text, left to right, and keeps the first
//! object that carries all required keys.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

/// Markdown fence markers, with or without a language tag.
static CODE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```[A-Za-z0-9_+\-]*").expect("valid code fence pattern"));

/// Remove markdown code-fence markers and surrounding whitespace.
///
/// ```rust
/// use wayfarer_core::extract::strip_code_fences;
///
/// assert_eq!(strip_code_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
/// ```
pub fn strip_code_fences(text: &str) -> String {
    CODE_FENCE.replace_all(text, "").trim().to_string()
}

/// Find the first JSON object in `text` whose top-level keys include every
/// name in `required`.
///
/// Every `{` is a candidate start, including ones nested inside an earlier
/// object or inside a malformed fragment, so garbage before the payload
/// never hides it. Trailing text after a complete value is ignored.
///
/// Returns `None` when no candidate qualifies; this never fails.
///
/// ```rust
/// use wayfarer_core::extract::extract_json;
///
/// let text = r#"Sure! {"tool": "travel_info.get_info", "arguments": {"country_to": "Japan"}} Enjoy."#;
/// let payload = extract_json(text, &["tool", "arguments"]).unwrap();
/// assert_eq!(payload["tool"], "travel_info.get_info");
/// ```
pub fn extract_json(text: &str, required: &[&str]) -> Option<Map<String, Value>> {
    for (offset, _) in text.match_indices('{') {
        let Some(Value::Object(object)) = decode_prefix(&text[offset..]) else {
            continue;
        };

        if required.iter().all(|key| object.contains_key(*key)) {
            tracing::trace!(offset, keys = object.len(), "Structured payload found");
            return Some(object);
        }
    }

    tracing::debug!(bytes = text.len(), "No structured payload in text");
    None
}

/// Decode the first complete JSON value at the start of `slice`.
fn decode_prefix(slice: &str) -> Option<Value> {
    let mut stream = serde_json::Deserializer::from_str(slice).into_iter::<Value>();
    match stream.next() {
        Some(Ok(value)) => Some(value),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    const PROPS: &[&str] = &["tool", "arguments"];

    #[test]
    fn finds_object_surrounded_by_prose() {
        let text = r#"I will call the tool now: {"tool": "travel_info.get_info", "arguments": {"country_to": "Japan"}} hope that helps"#;
        let payload = extract_json(text, PROPS).unwrap();
        assert_eq!(
            Value::Object(payload),
            json!({"tool": "travel_info.get_info", "arguments": {"country_to": "Japan"}})
        );
    }

    #[test]
    fn skips_objects_missing_required_keys() {
        let text = r#"{"note": "thinking"} then {"tool": "a.b", "arguments": {}}"#;
        let payload = extract_json(text, PROPS).unwrap();
        assert_eq!(payload["tool"], "a.b");
    }

    #[test]
    fn malformed_earlier_object_does_not_hide_later_one() {
        let text = r#"{"tool": "broken", "arguments": {oops} and {"tool": "x.y", "arguments": {"k": 1}}"#;
        let payload = extract_json(text, PROPS).unwrap();
        assert_eq!(payload["tool"], "x.y");
    }

    #[test]
    fn nested_candidate_is_found_when_outer_lacks_keys() {
        let text = r#"{"wrapper": {"tool": "x.y", "arguments": {}}}"#;
        let payload = extract_json(text, PROPS).unwrap();
        assert_eq!(payload["tool"], "x.y");
    }

    #[test]
    fn nested_braces_are_matched_by_parser() {
        let text = r#"{"tool": "x.y", "arguments": {"filter": {"a": {"b": "}"}}}} trailing }"#;
        let payload = extract_json(text, PROPS).unwrap();
        assert_eq!(payload["arguments"]["filter"]["a"]["b"], "}");
    }

    #[test]
    fn not_found_cases() {
        assert!(extract_json("", PROPS).is_none());
        assert!(extract_json("plain prose, no payload", PROPS).is_none());
        assert!(extract_json(r#"[{"tool": "x"}]"#, &["missing"]).is_none());
        assert!(extract_json("{ not json at all", PROPS).is_none());
        assert!(extract_json(r#"{"tool": "x.y"}"#, PROPS).is_none());
    }

    #[test]
    fn handles_multibyte_text_around_payload() {
        let text = "日本へ行けますか？ {\"tool\": \"t.m\", \"arguments\": {\"country_to\": \"日本\"}} ✈️";
        let payload = extract_json(text, PROPS).unwrap();
        assert_eq!(payload["arguments"]["country_to"], "日本");
    }

    #[test]
    fn strips_fences_with_and_without_language_tag() {
        assert_eq!(strip_code_fences("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("  {}  "), "{}");
        assert_eq!(strip_code_fences("no fences"), "no fences");
    }

    proptest! {
        #[test]
        fn prop_text_without_brace_is_never_matched(text in "[^{]*") {
            prop_assert!(extract_json(&text, PROPS).is_none());
        }

        #[test]
        fn prop_embedded_payload_is_extracted(
            prefix in "[^{]{0,40}",
            suffix in "[ -~]{0,40}",
            tool in "[a-z_]{1,12}\\.[a-z_]{1,12}",
            country in "[A-Za-z ]{0,20}",
        ) {
            let payload = json!({"tool": tool, "arguments": {"country_to": country}});
            let text = format!("{}{}{}", prefix, payload, suffix);
            let found = extract_json(&text, PROPS);
            prop_assert_eq!(found.map(Value::Object), Some(payload));
        }

        #[test]
        fn prop_extraction_is_idempotent(text in ".{0,80}") {
            prop_assert_eq!(extract_json(&text, PROPS), extract_json(&text, PROPS));
        }
    }
}
