pub mod error;
pub mod io;
pub mod llm;
pub mod models;
pub mod pipeline;

pub use error::AnalysisError;
pub use llm::{AnthropicClient, AnthropicConfig, Completion};
pub use models::{
    ActionItem, ActionItemDetail, AnalysisResult, ChunkOutput, Confidence, Decision,
    GlobalContext, Language, Segment, SegmenterConfig,
};
pub use pipeline::{analyze_transcript, split_transcript, AnalyzerConfig};
