//! Phase 2: synthesis of the accumulated context into the final analysis.
//!
//! One call sees everything the accumulator collected, untruncated, and
//! reconciles it: later information wins contradictions, near-duplicate
//! decisions and tasks are merged, and the narrative follows meeting
//! chronology. There is no placeholder fallback here: with no coherent
//! partial substitute for the merged output, failure is fatal for the
//! whole analysis request.

use serde_json::{Map, Value};
use tracing::info;

use crate::error::AnalysisError;
use crate::llm::{build_synthesis_prompt, recovery, Completion, ANALYSIS_SCHEMA_HINT, SYNTHESIS_PROMPT};
use crate::models::{ActionItem, GlobalContext, Language};

use super::analyzer::AnalyzerConfig;

/// Decoded five-key analysis response, shared by synthesis and the
/// single-pass path (both use the same output schema).
#[derive(Debug, Clone, Default)]
pub struct SynthesisOutput {
    pub summary: String,
    pub participants: Vec<String>,
    pub decisions: Vec<String>,
    pub action_items: Vec<ActionItem>,
    pub translated_transcript: String,
}

impl SynthesisOutput {
    /// Coerce a decoded JSON object, treating missing fields as defaults.
    /// Action item entries accept "description" or "task" as the text key.
    pub fn from_map(data: &Map<String, Value>) -> Self {
        let action_items = data
            .get("action_items")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| {
                        let obj = entry.as_object()?;
                        let description = obj
                            .get("description")
                            .or_else(|| obj.get("task"))
                            .and_then(Value::as_str)
                            .unwrap_or_default();
                        Some(ActionItem {
                            description: description.to_string(),
                            owner: obj
                                .get("owner")
                                .and_then(Value::as_str)
                                .filter(|s| !s.is_empty())
                                .map(str::to_string),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            summary: string_field(data, "summary"),
            participants: string_list(data, "participants"),
            decisions: string_list(data, "decisions"),
            action_items,
            translated_transcript: string_field(data, "translated_transcript"),
        }
    }
}

/// Run the synthesis call and decode its response.
///
/// Post-synthesis repair: if the response dropped participants or
/// decisions the chunk phase had already established, the accumulator's
/// lists are substituted (decision confidence is dropped at that point).
pub async fn synthesize(
    client: &dyn Completion,
    context: &GlobalContext,
    language: Language,
    config: &AnalyzerConfig,
) -> Result<SynthesisOutput, AnalysisError> {
    info!(
        "synthesizing final analysis from {} timeline entries",
        context.timeline.len()
    );

    let user = build_synthesis_prompt(context, language);
    let text = client
        .complete(SYNTHESIS_PROMPT, &user, config.synthesis_max_tokens)
        .await?;

    let data = recovery::decode(
        client,
        &text,
        ANALYSIS_SCHEMA_HINT,
        config.chunk_max_tokens,
        config.repair_input_chars,
    )
    .await?;

    let mut output = SynthesisOutput::from_map(&data);

    if output.participants.is_empty() && !context.participants.is_empty() {
        output.participants = context.participants.clone();
    }
    if output.decisions.is_empty() && !context.decisions.is_empty() {
        output.decisions = context
            .decisions
            .iter()
            .map(|d| d.decision.clone())
            .collect();
    }

    Ok(output)
}

fn string_field(data: &Map<String, Value>, key: &str) -> String {
    data.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn string_list(data: &Map<String, Value>, key: &str) -> Vec<String> {
    data.get(key)
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::models::{Confidence, Decision};

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
            Err(AnalysisError::Upstream("service unavailable".to_string()))
        }
    }

    fn context_with_participants() -> GlobalContext {
        let mut context = GlobalContext::new();
        context.participants = vec!["Alice".to_string(), "Bob".to_string()];
        context.decisions = vec![Decision {
            decision: "Launch in March".to_string(),
            confidence: Confidence::High,
        }];
        context
    }

    #[test]
    fn test_from_map_accepts_task_key() {
        let raw = r#"{"summary": "s",
            "action_items": [
                {"description": "notify clients", "owner": "Bob"},
                {"task": "update timeline"}
            ]}"#;
        let data: Map<String, Value> = serde_json::from_str(raw).unwrap();
        let output = SynthesisOutput::from_map(&data);

        assert_eq!(output.action_items.len(), 2);
        assert_eq!(output.action_items[0].description, "notify clients");
        assert_eq!(output.action_items[1].description, "update timeline");
        assert_eq!(output.action_items[1].owner, None);
    }

    #[tokio::test]
    async fn test_missing_participants_substituted_from_context() {
        let client = FixedReply(
            r#"{"summary": "ok", "participants": [], "decisions": [],
                "action_items": [], "translated_transcript": "t"}"#,
        );
        let output = synthesize(
            &client,
            &context_with_participants(),
            Language::En,
            &AnalyzerConfig::default(),
        )
        .await
        .unwrap();

        assert_eq!(output.participants, vec!["Alice", "Bob"]);
        // decision text substituted, confidence dropped
        assert_eq!(output.decisions, vec!["Launch in March"]);
    }

    #[tokio::test]
    async fn test_synthesis_output_preferred_over_context() {
        let client = FixedReply(
            r#"{"summary": "ok", "participants": ["Alice", "Bob", "Carol"],
                "decisions": ["Launch in March after QA"],
                "action_items": [], "translated_transcript": "t"}"#,
        );
        let output = synthesize(
            &client,
            &context_with_participants(),
            Language::En,
            &AnalyzerConfig::default(),
        )
        .await
        .unwrap();

        assert_eq!(output.participants.len(), 3);
        assert_eq!(output.decisions, vec!["Launch in March after QA"]);
    }

    #[tokio::test]
    async fn test_synthesis_failure_is_fatal() {
        let client = FailingClient;
        let err = synthesize(
            &client,
            &context_with_participants(),
            Language::En,
            &AnalyzerConfig::default(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AnalysisError::Upstream(_)));
    }
}
