use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;

use crate::models::AnalysisResult;

/// Write the analysis as pretty-printed JSON
pub fn write_analysis_json(result: &AnalysisResult, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create file: {:?}", path))?;
    serde_json::to_writer_pretty(file, result).context("Failed to write JSON")?;
    Ok(())
}

/// Human-readable rendering of an analysis result
pub struct AnalysisReport<'a> {
    result: &'a AnalysisResult,
}

impl<'a> AnalysisReport<'a> {
    pub fn new(result: &'a AnalysisResult) -> Self {
        Self { result }
    }

    /// Format the analysis as a plain-text report
    pub fn format(&self) -> String {
        let mut output = String::new();

        output.push_str("Meeting Analysis\n");
        output.push_str("================\n");
        output.push_str(&format!(
            "Generated: {}\n",
            Local::now().format("%Y-%m-%d %H:%M")
        ));
        output.push_str(&format!("Language: {}\n", self.result.language));
        if self.result.is_condensed {
            output.push_str("Note: long recording; transcript below is a condensed reconstruction.\n");
        }
        output.push('\n');

        output.push_str("Summary\n-------\n");
        output.push_str(&self.result.summary);
        output.push_str("\n\n");

        output.push_str("Participants\n------------\n");
        if self.result.participants.is_empty() {
            output.push_str("(none identified)\n");
        } else {
            for participant in &self.result.participants {
                output.push_str(&format!("- {}\n", participant));
            }
        }
        output.push('\n');

        output.push_str("Decisions\n---------\n");
        if self.result.decisions.is_empty() {
            output.push_str("(none identified)\n");
        } else {
            for decision in &self.result.decisions {
                output.push_str(&format!("- {}\n", decision));
            }
        }
        output.push('\n');

        output.push_str("Action Items\n------------\n");
        if self.result.action_items.is_empty() {
            output.push_str("(none identified)\n");
        } else {
            for item in &self.result.action_items {
                match &item.owner {
                    Some(owner) => {
                        output.push_str(&format!("- {} (owner: {})\n", item.description, owner))
                    }
                    None => output.push_str(&format!("- {}\n", item.description)),
                }
            }
        }
        output.push('\n');

        if !self.result.translated_transcript.is_empty() {
            output.push_str("Transcript\n----------\n");
            output.push_str(&self.result.translated_transcript);
            output.push('\n');
        }

        output
    }

    /// Write the report to a text file
    pub fn write_file(&self, path: &Path) -> Result<()> {
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create file: {:?}", path))?;
        write!(file, "{}", self.format())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActionItem, Language};

    fn sample_result() -> AnalysisResult {
        AnalysisResult {
            summary: "The launch moved to March.".to_string(),
            participants: vec!["Alice".to_string(), "Bob".to_string()],
            decisions: vec!["Launch in March".to_string()],
            action_items: vec![
                ActionItem {
                    description: "Update the timeline".to_string(),
                    owner: Some("Bob".to_string()),
                },
                ActionItem {
                    description: "Draft release notes".to_string(),
                    owner: None,
                },
            ],
            translated_transcript: "Alice suggested moving the launch...".to_string(),
            raw_transcript: "Alice: let's move the launch.".to_string(),
            language: Language::En,
            is_condensed: false,
        }
    }

    #[test]
    fn test_report_sections() {
        let result = sample_result();
        let report = AnalysisReport::new(&result).format();

        assert!(report.contains("Summary\n-------\nThe launch moved to March."));
        assert!(report.contains("- Alice\n- Bob"));
        assert!(report.contains("- Launch in March"));
        assert!(report.contains("- Update the timeline (owner: Bob)"));
        assert!(report.contains("- Draft release notes\n"));
        assert!(!report.contains("condensed reconstruction"));
    }

    #[test]
    fn test_report_condensed_note() {
        let mut result = sample_result();
        result.is_condensed = true;
        let report = AnalysisReport::new(&result).format();
        assert!(report.contains("condensed reconstruction"));
    }

    #[test]
    fn test_write_json_round_trip() {
        let result = sample_result();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analysis.json");

        write_analysis_json(&result, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let back: AnalysisResult = serde_json::from_str(&text).unwrap();
        assert_eq!(back.summary, result.summary);
        assert_eq!(back.participants, result.participants);
    }
}
