use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Supported output languages (ISO 639-1 codes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    He,
    Fr,
    Es,
    Ar,
}

impl Language {
    pub fn as_code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::He => "he",
            Language::Fr => "fr",
            Language::Es => "es",
            Language::Ar => "ar",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" => Ok(Language::En),
            "he" => Ok(Language::He),
            "fr" => Ok(Language::Fr),
            "es" => Ok(Language::Es),
            "ar" => Ok(Language::Ar),
            other => Err(format!(
                "unsupported language code '{}' (expected en, he, fr, es, ar)",
                other
            )),
        }
    }
}

/// A single action item in the final analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionItem {
    pub description: String,
    #[serde(default)]
    pub owner: Option<String>,
}

/// Terminal record of a transcript analysis. Owned by the caller once
/// returned; immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Concise meeting summary in the output language
    pub summary: String,
    /// Names or identifiers of participants; empty if none identified
    pub participants: Vec<String>,
    /// Decisions clearly stated or agreed
    pub decisions: Vec<String>,
    pub action_items: Vec<ActionItem>,
    /// Clean transcript in the output language. On the chunked path this
    /// is a narrative reconstruction rather than a literal translation.
    pub translated_transcript: String,
    /// Verbatim original, always complete, never condensed
    pub raw_transcript: String,
    pub language: Language,
    /// True exactly when the chunked path was used
    pub is_condensed: bool,
}

impl AnalysisResult {
    /// Fixed result for empty input; produced without any completion call.
    pub fn no_content(language: Language) -> Self {
        Self {
            summary: "No transcript content to analyze.".to_string(),
            participants: Vec::new(),
            decisions: Vec::new(),
            action_items: Vec::new(),
            translated_transcript: String::new(),
            raw_transcript: String::new(),
            language,
            is_condensed: false,
        }
    }
}
