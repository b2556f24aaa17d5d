//! Strategy selection and result assembly.
//!
//! Short transcripts are analyzed in a single completion call; long ones
//! go through the two-phase chunked pipeline. Either way the caller gets
//! one `AnalysisResult` with the verbatim original transcript attached.

use tracing::info;
use uuid::Uuid;

use crate::error::AnalysisError;
use crate::llm::{build_single_pass_prompt, recovery, Completion, ANALYSIS_SCHEMA_HINT, SINGLE_PASS_PROMPT};
use crate::models::{AnalysisResult, GlobalContext, Language, SegmenterConfig};

use super::phase1_extract::analyze_segment;
use super::phase2_synthesis::{synthesize, SynthesisOutput};
use super::segmenter::split_transcript;

/// Tunable knobs of the analysis pipeline. Passed explicitly so tests can
/// pin thresholds and budgets.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Character length above which the chunked path is used
    pub long_transcript_threshold: usize,
    pub segmenter: SegmenterConfig,
    /// Output budget for per-segment analysis and JSON repair calls
    pub chunk_max_tokens: u32,
    /// Output budget for the synthesis call
    pub synthesis_max_tokens: u32,
    /// Output budget for the single-pass call
    pub single_pass_max_tokens: u32,
    /// How much of a broken response is shown to the repair call
    pub repair_input_chars: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            long_transcript_threshold: 15_000,
            segmenter: SegmenterConfig::default(),
            chunk_max_tokens: 4_096,
            synthesis_max_tokens: 8_192,
            single_pass_max_tokens: 8_192,
            repair_input_chars: 6_000,
        }
    }
}

/// Analyze a meeting transcript into a structured result.
///
/// Empty input short-circuits to a fixed result with no completion call.
/// Otherwise the trimmed character length picks the path: at or below the
/// threshold, one call over the whole transcript; above it, the chunked
/// pipeline. The assembled result is re-validated before being returned;
/// a failure there is a schema error, distinct from decode failure.
pub async fn analyze_transcript(
    client: &dyn Completion,
    transcript: &str,
    language: Language,
    config: &AnalyzerConfig,
) -> Result<AnalysisResult, AnalysisError> {
    let run_id = Uuid::new_v4();
    let trimmed_len = transcript.trim().chars().count();

    if trimmed_len == 0 {
        info!(%run_id, "empty transcript, returning fixed result");
        return Ok(AnalysisResult::no_content(language));
    }

    let result = if trimmed_len > config.long_transcript_threshold {
        info!(%run_id, chars = trimmed_len, "long transcript, using context-aware chunking");
        analyze_long(client, transcript, language, config).await?
    } else {
        info!(%run_id, chars = trimmed_len, "short transcript, using single-pass analysis");
        analyze_short(client, transcript, language, config).await?
    };

    validate_result(&result)?;
    info!(
        %run_id,
        participants = result.participants.len(),
        decisions = result.decisions.len(),
        action_items = result.action_items.len(),
        condensed = result.is_condensed,
        "analysis complete"
    );
    Ok(result)
}

/// Single-pass path: one completion call over the whole transcript.
async fn analyze_short(
    client: &dyn Completion,
    transcript: &str,
    language: Language,
    config: &AnalyzerConfig,
) -> Result<AnalysisResult, AnalysisError> {
    let user = build_single_pass_prompt(transcript, language);
    let text = client
        .complete(SINGLE_PASS_PROMPT, &user, config.single_pass_max_tokens)
        .await?;

    if text.is_empty() {
        return Err(AnalysisError::Decode {
            excerpt: "(empty response)".to_string(),
        });
    }

    let data = recovery::decode(
        client,
        &text,
        ANALYSIS_SCHEMA_HINT,
        config.chunk_max_tokens,
        config.repair_input_chars,
    )
    .await?;

    Ok(assemble(
        SynthesisOutput::from_map(&data),
        transcript,
        language,
        false,
    ))
}

/// Chunked path: Phase 1 over each segment with the rolling context,
/// then Phase 2 synthesis over everything accumulated.
async fn analyze_long(
    client: &dyn Completion,
    transcript: &str,
    language: Language,
    config: &AnalyzerConfig,
) -> Result<AnalysisResult, AnalysisError> {
    let segments = split_transcript(transcript, &config.segmenter);
    info!("split into {} segments", segments.len());

    let mut context = GlobalContext::new();

    for segment in &segments {
        info!("processing segment {}", segment.position());
        let output = analyze_segment(client, segment, &context, language, config).await;
        info!(
            "segment {}: +{} participants, +{} decisions, +{} action items",
            segment.position(),
            output.new_participants.len(),
            output.decisions.len(),
            output.action_items.len()
        );
        context.merge(output);
    }

    let final_output = synthesize(client, &context, language, config).await?;

    Ok(assemble(final_output, transcript, language, true))
}

fn assemble(
    output: SynthesisOutput,
    transcript: &str,
    language: Language,
    is_condensed: bool,
) -> AnalysisResult {
    AnalysisResult {
        summary: output.summary,
        participants: output.participants,
        decisions: output.decisions,
        action_items: output.action_items,
        translated_transcript: output.translated_transcript,
        raw_transcript: transcript.to_string(),
        language,
        is_condensed,
    }
}

/// Re-validate the assembled record against the result schema by round-
/// tripping it through serde. Catches inconsistencies introduced during
/// assembly rather than decoding.
fn validate_result(result: &AnalysisResult) -> Result<(), AnalysisError> {
    let value = serde_json::to_value(result).map_err(|e| AnalysisError::Schema(e.to_string()))?;
    serde_json::from_value::<AnalysisResult>(value)
        .map_err(|e| AnalysisError::Schema(e.to_string()))?;
    Ok(())
}
