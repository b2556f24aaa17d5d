use thiserror::Error;

/// Failure modes of the analysis pipeline.
///
/// Segment-level extraction failures are not represented here: they are
/// contained inside Phase 1 and degrade to placeholder output. Everything
/// that reaches the caller is one of these variants.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// No credential available for the completion capability.
    #[error("ANTHROPIC_API_KEY environment variable not set")]
    MissingApiKey,

    /// The completion capability itself failed (network, service error).
    #[error("completion request failed: {0}")]
    Upstream(String),

    /// Response text never became valid JSON through any recovery stage.
    /// Carries a bounded excerpt of the offending text for diagnostics.
    #[error("response could not be decoded as JSON: {excerpt}")]
    Decode { excerpt: String },

    /// The assembled result does not conform to the expected shape.
    /// Distinct from decode failure: the inputs parsed, but the record
    /// built from them is inconsistent.
    #[error("analysis result does not match schema: {0}")]
    Schema(String),
}
