use serde::{Deserialize, Serialize};

/// Maximum number of topics retained in the rolling context.
/// Oldest entries are dropped so only a recent sliding window is shown
/// to later segments.
pub const MAX_TOPICS: usize = 20;

/// Confidence level assigned to a decision at extraction time.
/// Never upgraded by later merging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        }
    }

    /// Parse a confidence string from model output, defaulting to medium
    /// for anything unrecognized.
    pub fn parse_loose(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "high" => Confidence::High,
            "low" => Confidence::Low,
            _ => Confidence::Medium,
        }
    }
}

impl Default for Confidence {
    fn default() -> Self {
        Confidence::Medium
    }
}

/// Something agreed upon in the meeting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    /// What was decided
    pub decision: String,
    /// How explicitly it was stated
    #[serde(default)]
    pub confidence: Confidence,
}

/// A task extracted from the meeting, with optional owner and due date.
/// Absence of owner/due is explicit, never inferred.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionItemDetail {
    pub task: String,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub due: Option<String>,
}

/// Incremental extraction record for a single segment.
///
/// By contract this carries only information not already present in the
/// context supplied to that segment. The model cannot be forced to comply,
/// so downstream merging deduplicates anyway.
#[derive(Debug, Clone, Default)]
pub struct ChunkOutput {
    /// 1-2 sentence summary of what happens in this segment
    pub chunk_summary: String,
    /// Names first seen in this segment
    pub new_participants: Vec<String>,
    pub decisions: Vec<Decision>,
    pub action_items: Vec<ActionItemDetail>,
    pub topics: Vec<String>,
    /// Corrections, clarifications, reversals of earlier claims
    pub important_notes: Vec<String>,
}

impl ChunkOutput {
    /// Placeholder output for a segment whose analysis failed.
    /// Leaves an explicit marker in the timeline so the final narrative
    /// can reflect the gap.
    pub fn incomplete(index: usize, total: usize) -> Self {
        Self {
            chunk_summary: format!("[Segment {} of {} analysis incomplete]", index + 1, total),
            ..Default::default()
        }
    }
}

/// Rolling context accumulated across segments.
///
/// Created empty at the start of chunked processing, mutated once per
/// segment, read-only once synthesis begins. Single logical owner, never
/// accessed concurrently.
#[derive(Debug, Clone, Default)]
pub struct GlobalContext {
    /// Insertion order is first-seen order; no duplicates
    pub participants: Vec<String>,
    /// Deduplicated, capped at MAX_TOPICS most recent
    pub topics: Vec<String>,
    /// Append-only; cross-segment dedup is deferred to synthesis
    pub decisions: Vec<Decision>,
    /// Append-only, same deferral as decisions
    pub action_items: Vec<ActionItemDetail>,
    /// One chunk_summary per processed segment, in order, never reordered
    pub timeline: Vec<String>,
    /// Deduplicated, unbounded
    pub important_notes: Vec<String>,
}

impl GlobalContext {
    pub fn new() -> Self {
        Self::default()
    }

    fn has_content(&self) -> bool {
        !self.participants.is_empty()
            || !self.topics.is_empty()
            || !self.decisions.is_empty()
            || !self.action_items.is_empty()
            || !self.timeline.is_empty()
    }

    /// Merge a segment's output into the context.
    ///
    /// Participants, topics, and notes are deduplicated by exact string
    /// match. Decisions and action items are appended unconditionally:
    /// detecting cross-segment duplicates takes semantic judgment, which
    /// is deferred to synthesis.
    pub fn merge(&mut self, output: ChunkOutput) {
        for p in output.new_participants {
            if !p.is_empty() && !self.participants.contains(&p) {
                self.participants.push(p);
            }
        }

        for t in output.topics {
            if !t.is_empty() && !self.topics.contains(&t) {
                self.topics.push(t);
            }
        }
        if self.topics.len() > MAX_TOPICS {
            self.topics.drain(..self.topics.len() - MAX_TOPICS);
        }

        self.decisions.extend(output.decisions);
        self.action_items.extend(output.action_items);

        if !output.chunk_summary.is_empty() {
            self.timeline.push(output.chunk_summary);
        }

        for note in output.important_notes {
            if !note.is_empty() && !self.important_notes.contains(&note) {
                self.important_notes.push(note);
            }
        }
    }

    /// Render a bounded digest of the context for inclusion in a segment
    /// prompt. Recency-biased truncation keeps the prompt within the
    /// completion capability's input limits; this is an explicit lossy
    /// policy.
    pub fn render_for_prompt(&self) -> String {
        if !self.has_content() {
            return "No prior context (this is the first segment).".to_string();
        }

        let mut parts = Vec::new();

        if !self.participants.is_empty() {
            parts.push(format!("Known participants: {}", self.participants.join(", ")));
        }

        if !self.topics.is_empty() {
            parts.push(format!(
                "Topics discussed so far: {}",
                tail(&self.topics, 10).join(", ")
            ));
        }

        if !self.decisions.is_empty() {
            let decisions: Vec<String> = tail(&self.decisions, 5)
                .iter()
                .map(|d| format!("{} (confidence: {})", d.decision, d.confidence.as_str()))
                .collect();
            parts.push(format!("Decisions made: {}", decisions.join("; ")));
        }

        if !self.action_items.is_empty() {
            let items: Vec<String> = tail(&self.action_items, 5)
                .iter()
                .map(|a| {
                    format!(
                        "{} (owner: {})",
                        a.task,
                        a.owner.as_deref().unwrap_or("unassigned")
                    )
                })
                .collect();
            parts.push(format!("Action items: {}", items.join("; ")));
        }

        if !self.timeline.is_empty() {
            parts.push(format!("Meeting flow: {}", tail(&self.timeline, 5).join(" → ")));
        }

        if !self.important_notes.is_empty() {
            parts.push(format!(
                "Important notes: {}",
                tail(&self.important_notes, 3).join("; ")
            ));
        }

        parts.join("\n")
    }
}

/// Last `n` elements of a slice
fn tail<T>(items: &[T], n: usize) -> &[T] {
    &items[items.len().saturating_sub(n)..]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output_with_participants(names: &[&str]) -> ChunkOutput {
        ChunkOutput {
            new_participants: names.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_participants_deduplicated_first_seen_order() {
        let mut context = GlobalContext::new();
        context.merge(output_with_participants(&["Alice", "Bob"]));
        context.merge(output_with_participants(&["Bob", "Carol", "Alice"]));

        assert_eq!(context.participants, vec!["Alice", "Bob", "Carol"]);
    }

    #[test]
    fn test_participant_dedup_is_case_sensitive() {
        let mut context = GlobalContext::new();
        context.merge(output_with_participants(&["alice", "Alice"]));

        assert_eq!(context.participants.len(), 2);
    }

    #[test]
    fn test_empty_participant_skipped() {
        let mut context = GlobalContext::new();
        context.merge(output_with_participants(&["", "Alice"]));

        assert_eq!(context.participants, vec!["Alice"]);
    }

    #[test]
    fn test_topics_capped_at_max() {
        let mut context = GlobalContext::new();
        for i in 0..30 {
            context.merge(ChunkOutput {
                topics: vec![format!("topic-{}", i)],
                ..Default::default()
            });
        }

        assert_eq!(context.topics.len(), MAX_TOPICS);
        assert_eq!(context.topics[0], "topic-10");
        assert_eq!(context.topics[MAX_TOPICS - 1], "topic-29");
    }

    #[test]
    fn test_decisions_appended_without_dedup() {
        let mut context = GlobalContext::new();
        let decision = Decision {
            decision: "Ship in March".to_string(),
            confidence: Confidence::High,
        };
        context.merge(ChunkOutput {
            decisions: vec![decision.clone()],
            ..Default::default()
        });
        context.merge(ChunkOutput {
            decisions: vec![decision],
            ..Default::default()
        });

        assert_eq!(context.decisions.len(), 2);
    }

    #[test]
    fn test_timeline_one_entry_per_nonempty_summary() {
        let mut context = GlobalContext::new();
        context.merge(ChunkOutput {
            chunk_summary: "Kickoff and intros".to_string(),
            ..Default::default()
        });
        context.merge(ChunkOutput::default());
        context.merge(ChunkOutput {
            chunk_summary: "Budget discussion".to_string(),
            ..Default::default()
        });

        assert_eq!(context.timeline, vec!["Kickoff and intros", "Budget discussion"]);
    }

    #[test]
    fn test_render_empty_context_sentinel() {
        let context = GlobalContext::new();
        assert_eq!(
            context.render_for_prompt(),
            "No prior context (this is the first segment)."
        );
    }

    #[test]
    fn test_render_bounds_and_format() {
        let mut context = GlobalContext::new();
        for i in 0..12 {
            context.merge(ChunkOutput {
                chunk_summary: format!("part {}", i),
                topics: vec![format!("t{}", i)],
                ..Default::default()
            });
        }
        context.merge(ChunkOutput {
            new_participants: vec!["Alice".to_string()],
            decisions: vec![Decision {
                decision: "Keep current budget".to_string(),
                confidence: Confidence::High,
            }],
            action_items: vec![ActionItemDetail {
                task: "Draft release notes".to_string(),
                owner: None,
                due: None,
            }],
            ..Default::default()
        });

        let rendered = context.render_for_prompt();
        assert!(rendered.contains("Known participants: Alice"));
        assert!(rendered.contains("Keep current budget (confidence: high)"));
        assert!(rendered.contains("Draft release notes (owner: unassigned)"));
        // last 10 topics only
        assert!(!rendered.contains("t0,"));
        assert!(rendered.contains("t11"));
        // last 5 timeline entries joined by arrows
        assert!(rendered.contains("part 8 → part 9"));
        assert!(!rendered.contains("part 6 →"));
    }

    #[test]
    fn test_confidence_parse_loose() {
        assert_eq!(Confidence::parse_loose("HIGH"), Confidence::High);
        assert_eq!(Confidence::parse_loose("low "), Confidence::Low);
        assert_eq!(Confidence::parse_loose("certain"), Confidence::Medium);
    }
}
