//! Multi-stage recovery of structured data from unreliable completion
//! output.
//!
//! Responses are *supposed* to be JSON but frequently are not: wrapped in
//! markdown fences, prefixed with commentary, or syntactically broken.
//! Decoding escalates through progressively more aggressive stages, with
//! a capability-assisted repair as the last resort before failing. Cheap
//! local fixes are always tried before spending another completion call.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::AnalysisError;
use crate::llm::client::Completion;
use crate::llm::prompts::{build_repair_system, build_repair_user};

/// Characters of the offending text carried in a decode error
const ERROR_EXCERPT_CHARS: usize = 500;

/// Local decode strategies in escalation order. Each is pure; the first
/// to produce a JSON object wins.
const LOCAL_STAGES: &[fn(&str) -> Option<Map<String, Value>>] =
    &[parse_direct, parse_extracted, parse_repaired];

/// Try all local stages (direct parse, textual extraction, syntax repair)
/// without involving the completion capability.
pub fn parse_lenient(raw: &str) -> Option<Map<String, Value>> {
    for (stage, parse) in LOCAL_STAGES.iter().enumerate() {
        if let Some(data) = parse(raw) {
            if stage > 0 {
                debug!("response parsed at recovery stage {}", stage + 1);
            }
            return Some(data);
        }
    }
    None
}

/// Decode a response into a JSON object, falling back to capability-
/// assisted repair when local stages fail.
///
/// `schema_hint` is a compact example of the expected shape, shown to the
/// repair call. An upstream failure during repair propagates as-is; repair
/// output that still fails to parse becomes a decode error carrying an
/// excerpt of the original text.
pub async fn decode(
    client: &dyn Completion,
    raw: &str,
    schema_hint: &str,
    repair_max_tokens: u32,
    repair_input_chars: usize,
) -> Result<Map<String, Value>, AnalysisError> {
    if let Some(data) = parse_lenient(raw) {
        return Ok(data);
    }

    warn!("local JSON recovery exhausted, attempting capability-assisted repair");
    let system = build_repair_system(schema_hint);
    let user = build_repair_user(truncate_chars(raw, repair_input_chars));
    let repaired = client.complete(&system, &user, repair_max_tokens).await?;

    parse_lenient(&repaired).ok_or_else(|| AnalysisError::Decode {
        excerpt: truncate_chars(raw, ERROR_EXCERPT_CHARS).to_string(),
    })
}

/// Stage 1: the raw text already is a JSON object
fn parse_direct(raw: &str) -> Option<Map<String, Value>> {
    as_object(serde_json::from_str(raw).ok()?)
}

/// Stage 2: strip fences and surrounding prose, then parse
fn parse_extracted(raw: &str) -> Option<Map<String, Value>> {
    as_object(serde_json::from_str(&extract_json(raw)).ok()?)
}

/// Stage 3: extract, then fix common syntax breakage, then parse
fn parse_repaired(raw: &str) -> Option<Map<String, Value>> {
    as_object(serde_json::from_str(&repair_syntax(&extract_json(raw))).ok()?)
}

fn as_object(value: Value) -> Option<Map<String, Value>> {
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

/// Trim markdown code fences and cut to the outermost brace pair.
pub fn extract_json(raw: &str) -> String {
    let mut s = raw.trim();

    for marker in ["```json", "```"] {
        if let Some(rest) = s.strip_prefix(marker) {
            s = rest.trim_start_matches(['\n', '\r']);
            break;
        }
    }

    if let Some(rest) = s.strip_suffix("```") {
        s = rest.trim_end_matches(['\n', '\r']);
    }

    s = s.trim();

    let mut owned = s.to_string();

    if !owned.starts_with('{') {
        if let Some(start) = owned.find('{') {
            owned = owned[start..].to_string();
        }
    }

    if !owned.ends_with('}') {
        if let Some(end) = owned.rfind('}') {
            owned = owned[..=end].to_string();
        }
    }

    owned.trim().to_string()
}

/// Fix syntax breakage the models commonly produce: trailing commas before
/// a closing brace/bracket, and raw control characters inside string
/// literals. String boundaries are tracked with a quote/escape state
/// machine; a backslash escapes the character after it.
pub fn repair_syntax(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len());
    let mut in_string = false;
    let mut escape_next = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if escape_next {
            out.push(c);
            escape_next = false;
            i += 1;
            continue;
        }

        if c == '\\' {
            out.push(c);
            escape_next = true;
            i += 1;
            continue;
        }

        if c == '"' {
            in_string = !in_string;
            out.push(c);
            i += 1;
            continue;
        }

        if in_string {
            match c {
                '\n' => out.push_str("\\n"),
                '\r' => {}
                '\t' => out.push_str("\\t"),
                _ => out.push(c),
            }
            i += 1;
            continue;
        }

        // Outside strings: drop a comma whose next non-whitespace
        // character closes a scope
        if c == ',' {
            let mut j = i + 1;
            while j < chars.len() && chars[j].is_whitespace() {
                j += 1;
            }
            if j < chars.len() && (chars[j] == '}' || chars[j] == ']') {
                i += 1;
                continue;
            }
        }

        out.push(c);
        i += 1;
    }

    out
}

/// First `max` characters of a string (character count, never splits a
/// multi-byte character)
pub(crate) fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((byte_idx, _)) => &s[..byte_idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;

    #[test]
    fn test_stage1_valid_json_unchanged() {
        let raw = r#"{"summary": "ok", "participants": ["Alice"]}"#;
        let data = parse_lenient(raw).unwrap();
        assert_eq!(data["summary"], "ok");
        assert_eq!(data["participants"][0], "Alice");
    }

    #[test]
    fn test_non_object_json_rejected() {
        assert!(parse_lenient("[1, 2, 3]").is_none());
        assert!(parse_lenient("\"just a string\"").is_none());
    }

    #[test]
    fn test_extract_strips_fences() {
        let raw = "```json\n{\"a\": 1}\n```";
        assert_eq!(extract_json(raw), "{\"a\": 1}");
    }

    #[test]
    fn test_extract_cuts_surrounding_prose() {
        let raw = "Here is the analysis:\n{\"a\": 1}\nHope this helps!";
        assert_eq!(extract_json(raw), "{\"a\": 1}");
    }

    #[test]
    fn test_fenced_trailing_comma_decodes_locally() {
        let raw = "```json\n{\"summary\": \"ok\", \"topics\": [\"a\", \"b\",],}\n```";
        let data = parse_lenient(raw).unwrap();
        assert_eq!(data["summary"], "ok");
        assert_eq!(data["topics"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_repair_newline_inside_string() {
        let broken = "{\"summary\": \"line one\nline two\"}";
        let data = parse_lenient(broken).unwrap();
        assert_eq!(data["summary"], "line one\nline two");
    }

    #[test]
    fn test_repair_preserves_escaped_quote() {
        let raw = r#"{"summary": "he said \"yes\"",}"#;
        let data = parse_lenient(raw).unwrap();
        assert_eq!(data["summary"], "he said \"yes\"");
    }

    #[test]
    fn test_repair_leaves_commas_inside_strings() {
        let raw = r#"{"summary": "a, }"}"#;
        let data = parse_lenient(raw).unwrap();
        assert_eq!(data["summary"], "a, }");
    }

    #[test]
    fn test_truncate_chars_multibyte() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("ab", 10), "ab");
    }

    struct FixedReply(&'static str);

    #[async_trait]
    impl Completion for FixedReply {
        async fn complete(
            &self,
            _system: &str,
            _user: &str,
            _max_tokens: u32,
        ) -> Result<String, AnalysisError> {
            Ok(self.0.to_string())
        }
    }

    struct FailingClient;

    #[async_trait]
    impl Completion for FailingClient {
        async fn complete(
            &self,
            _system: &str,
            _user: &str,
            _max_tokens: u32,
        ) -> Result<String, AnalysisError> {
            Err(AnalysisError::Upstream("service down".to_string()))
        }
    }

    #[tokio::test]
    async fn test_decode_falls_back_to_repair_call() {
        let client = FixedReply(r#"{"summary": "repaired"}"#);
        let data = decode(&client, "not json at all", "{}", 1024, 6000)
            .await
            .unwrap();
        assert_eq!(data["summary"], "repaired");
    }

    #[tokio::test]
    async fn test_decode_valid_input_never_calls_capability() {
        // A failing client proves the repair stage was not reached
        let client = FailingClient;
        let data = decode(&client, r#"{"summary": "ok"}"#, "{}", 1024, 6000)
            .await
            .unwrap();
        assert_eq!(data["summary"], "ok");
    }

    #[tokio::test]
    async fn test_decode_error_carries_excerpt() {
        let client = FixedReply("still not json");
        let err = decode(&client, "garbage response text", "{}", 1024, 6000)
            .await
            .unwrap_err();
        match err {
            AnalysisError::Decode { excerpt } => {
                assert!(excerpt.contains("garbage response text"));
            }
            other => panic!("expected decode error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_decode_upstream_failure_propagates() {
        let client = FailingClient;
        let err = decode(&client, "not json", "{}", 1024, 6000).await.unwrap_err();
        assert!(matches!(err, AnalysisError::Upstream(_)));
    }
}
