//! Phase 1: per-segment incremental extraction.
//!
//! Each segment is analyzed with the rolling context accumulated from all
//! prior segments, and its output is merged back into that context by the
//! caller. Segment analysis is inherently sequential: segment k+1's prompt
//! depends on segment k's merged output.

use serde_json::{Map, Value};
use tracing::warn;

use crate::error::AnalysisError;
use crate::llm::{build_chunk_prompt, recovery, Completion, CHUNK_ANALYSIS_PROMPT, CHUNK_SCHEMA_HINT};
use crate::models::{ActionItemDetail, ChunkOutput, Confidence, Decision, GlobalContext, Language, Segment};

use super::analyzer::AnalyzerConfig;

/// Analyze one segment against the current rolling context.
///
/// Any failure here, upstream or decode or anything else, is contained: the
/// segment degrades to a placeholder output and processing continues with
/// the next segment. A single bad segment costs completeness for that
/// slice of the meeting, never the whole pipeline.
pub async fn analyze_segment(
    client: &dyn Completion,
    segment: &Segment,
    context: &GlobalContext,
    language: Language,
    config: &AnalyzerConfig,
) -> ChunkOutput {
    match try_analyze_segment(client, segment, context, language, config).await {
        Ok(output) => output,
        Err(e) => {
            warn!("segment {} analysis failed: {}", segment.position(), e);
            ChunkOutput::incomplete(segment.index, segment.total)
        }
    }
}

async fn try_analyze_segment(
    client: &dyn Completion,
    segment: &Segment,
    context: &GlobalContext,
    language: Language,
    config: &AnalyzerConfig,
) -> Result<ChunkOutput, AnalysisError> {
    let user = build_chunk_prompt(segment, context, language);
    let text = client
        .complete(CHUNK_ANALYSIS_PROMPT, &user, config.chunk_max_tokens)
        .await?;

    let data = recovery::decode(
        client,
        &text,
        CHUNK_SCHEMA_HINT,
        config.chunk_max_tokens,
        config.repair_input_chars,
    )
    .await?;

    Ok(chunk_output_from_map(&data))
}

/// Coerce a decoded JSON object into a ChunkOutput. Missing keys become
/// defaults; decision/action entries without their primary field are
/// silently dropped rather than failing the segment.
fn chunk_output_from_map(data: &Map<String, Value>) -> ChunkOutput {
    let decisions = data
        .get("decisions")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| {
                    let obj = entry.as_object()?;
                    let decision = obj.get("decision")?.as_str()?;
                    if decision.is_empty() {
                        return None;
                    }
                    Some(Decision {
                        decision: decision.to_string(),
                        confidence: obj
                            .get("confidence")
                            .and_then(Value::as_str)
                            .map(Confidence::parse_loose)
                            .unwrap_or_default(),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    let action_items = data
        .get("action_items")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| {
                    let obj = entry.as_object()?;
                    let task = obj.get("task")?.as_str()?;
                    if task.is_empty() {
                        return None;
                    }
                    Some(ActionItemDetail {
                        task: task.to_string(),
                        owner: string_or_none(obj.get("owner")),
                        due: string_or_none(obj.get("due")),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    ChunkOutput {
        chunk_summary: data
            .get("chunk_summary")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        new_participants: string_list(data.get("new_participants")),
        decisions,
        action_items,
        topics: string_list(data.get("topics")),
        important_notes: string_list(data.get("important_notes")),
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
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

/// A string value, treating JSON null and empty string as absent
fn string_or_none(value: Option<&Value>) -> Option<String> {
    match value?.as_str() {
        Some(s) if !s.is_empty() => Some(s.to_string()),
        _ => None,
    }
}
