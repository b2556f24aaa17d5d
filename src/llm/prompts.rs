use crate::models::{GlobalContext, Language, Segment};

/// System prompt for Phase 1 incremental segment extraction
pub const CHUNK_ANALYSIS_PROMPT: &str = r#"You are analyzing a PORTION of a longer meeting transcript.

You will receive:
1. GLOBAL CONTEXT: Information already extracted from previous segments
2. CURRENT SEGMENT: The transcript portion to analyze

Your task: Extract ONLY NEW information from this segment that is NOT already in the global context.

## Output Schema (JSON only, no markdown):

{
  "chunk_summary": "1-2 sentence summary of what happens in THIS segment",
  "new_participants": ["Names appearing for the FIRST TIME only"],
  "decisions": [
    {"decision": "What was decided", "confidence": "high|medium|low"}
  ],
  "action_items": [
    {"task": "What needs to be done", "owner": "Person or null", "due": "Date or null"}
  ],
  "topics": ["New or continuing topics in this segment"],
  "important_notes": ["Corrections, clarifications, reversals of earlier info"]
}

## Critical Rules:

1. **No Repetition**: Do NOT include participants, decisions, or action items already in GLOBAL CONTEXT
2. **No Hallucination**: Only extract what is EXPLICITLY stated
3. **Confidence Levels**:
   - "high": Clearly stated, explicit agreement
   - "medium": Implied or suggested
   - "low": Tentative, needs confirmation
4. **Empty is OK**: If nothing new, return empty arrays
5. **Valid JSON**: Output must be parseable JSON, no commentary

Output the JSON object only."#;

/// System prompt for Phase 2 synthesis
pub const SYNTHESIS_PROMPT: &str = r#"You are synthesizing a complete meeting analysis from segment-level extractions.

You will receive:
1. AGGREGATED CONTEXT: All participants, decisions, action items, and notes
2. MEETING TIMELINE: Summaries of each segment in order
3. TARGET LANGUAGE: Output language for all content

Your task: Produce a coherent, final meeting analysis.

## Output Schema (JSON only, no markdown):

{
  "summary": "Clear, comprehensive meeting summary (3-5 sentences)",
  "participants": ["List of all participants"],
  "decisions": ["Final list of decisions, duplicates merged"],
  "action_items": [
    {"description": "Task description", "owner": "Person or null"}
  ],
  "translated_transcript": "Clean, readable transcript summary in target language"
}

## Critical Rules:

1. **Resolve Contradictions**: Later information overrides earlier
2. **Merge Duplicates**: Combine similar decisions/tasks
3. **Chronological Logic**: Summary should follow meeting flow
4. **No Invention**: Only include what was extracted
5. **Completeness**: Capture all key information
6. **Target Language**: All output in the specified language

Output the JSON object only."#;

/// System prompt for single-pass analysis of short transcripts
pub const SINGLE_PASS_PROMPT: &str = r#"You are an expert meeting analyst. You will receive the full transcript of a spoken meeting and a target output language.

Your task: Produce a structured analysis of the meeting.

## Output Schema (JSON only, no markdown):

{
  "summary": "Clear, comprehensive meeting summary (3-5 sentences)",
  "participants": ["Names or identifiers of everyone who speaks or is mentioned as present"],
  "decisions": ["Decisions clearly stated or agreed in the meeting"],
  "action_items": [
    {"description": "Task description", "owner": "Person or null"}
  ],
  "translated_transcript": "The full transcript, cleaned of filler and disfluencies, in the target language"
}

## Critical Rules:

1. **No Hallucination**: Only include what is explicitly in the transcript
2. **Empty is OK**: Use empty arrays when nothing qualifies
3. **Target Language**: summary, decisions, action items, and transcript all in the target language
4. **Valid JSON**: Output must be parseable JSON, no commentary

Output the JSON object only."#;

/// Compact schema hint for repairing a Phase 1 response
pub const CHUNK_SCHEMA_HINT: &str = r#"{"chunk_summary":"","new_participants":[],"decisions":[],"action_items":[],"topics":[],"important_notes":[]}"#;

/// Compact schema hint for repairing a synthesis or single-pass response
pub const ANALYSIS_SCHEMA_HINT: &str = r#"{"summary":"","participants":[],"decisions":[],"action_items":[],"translated_transcript":""}"#;

/// Build the user prompt for a single segment analysis
pub fn build_chunk_prompt(segment: &Segment, context: &GlobalContext, language: Language) -> String {
    format!(
        "## GLOBAL CONTEXT (from previous segments):\n{}\n\n\
         ## CURRENT SEGMENT ({}):\n\n{}\n\n\
         ## Target output language: {}\n\n\
         Extract ONLY new information not already in the global context.\n\
         Output JSON only:",
        context.render_for_prompt(),
        segment.position(),
        segment.text,
        language.as_code()
    )
}

/// Build the user prompt for final synthesis.
///
/// Unlike per-segment rendering this is unbounded: synthesis is the one
/// call allowed to see everything the accumulator collected.
pub fn build_synthesis_prompt(context: &GlobalContext, language: Language) -> String {
    let participants = if context.participants.is_empty() {
        "Unknown".to_string()
    } else {
        context.participants.join(", ")
    };

    let decisions = if context.decisions.is_empty() {
        "None identified".to_string()
    } else {
        context
            .decisions
            .iter()
            .map(|d| format!("- {} (confidence: {})", d.decision, d.confidence.as_str()))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let action_items = if context.action_items.is_empty() {
        "None identified".to_string()
    } else {
        context
            .action_items
            .iter()
            .map(|a| {
                format!(
                    "- {} (owner: {}, due: {})",
                    a.task,
                    a.owner.as_deref().unwrap_or("unassigned"),
                    a.due.as_deref().unwrap_or("not specified")
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    let timeline = if context.timeline.is_empty() {
        "No timeline available".to_string()
    } else {
        context
            .timeline
            .iter()
            .enumerate()
            .map(|(i, summary)| format!("{}. {}", i + 1, summary))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let notes = if context.important_notes.is_empty() {
        "None".to_string()
    } else {
        context
            .important_notes
            .iter()
            .map(|n| format!("- {}", n))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "## AGGREGATED CONTEXT\n\n\
         ### Participants:\n{}\n\n\
         ### Decisions Made:\n{}\n\n\
         ### Action Items:\n{}\n\n\
         ### Important Notes/Corrections:\n{}\n\n\
         ## MEETING TIMELINE (segment summaries in order):\n{}\n\n\
         ## Target output language: {}\n\n\
         Synthesize into final meeting analysis. Output JSON only:",
        participants, decisions, action_items, notes, timeline,
        language.as_code()
    )
}

/// Build the user prompt for single-pass analysis
pub fn build_single_pass_prompt(transcript: &str, language: Language) -> String {
    let block = transcript.trim();
    let block = if block.is_empty() { "(empty)" } else { block };
    format!(
        "Target output language: {}\n\nTranscript:\n\n{}",
        language.as_code(),
        block
    )
}

/// System prompt for capability-assisted JSON repair
pub fn build_repair_system(target_schema: &str) -> String {
    format!(
        r#"You are a JSON repair specialist. Convert the input into valid JSON matching this schema:

{}

Rules:
1. Output ONLY valid JSON - no markdown, no explanation
2. Escape all newlines as \n, quotes as \"
3. Use null for missing values
4. Do NOT invent data - only extract what's present
5. If a field cannot be determined, use empty string or empty array"#,
        target_schema
    )
}

/// User prompt for capability-assisted JSON repair. Caller truncates
/// `broken_text` to the configured budget first.
pub fn build_repair_user(broken_text: &str) -> String {
    format!("Input to repair:\n{}\n\nOutput valid JSON only:", broken_text)
}
