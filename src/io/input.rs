use std::path::Path;

use anyhow::{Context, Result};

/// Read a plain-text transcript from disk.
///
/// Strips a UTF-8 BOM if present; transcription tools on Windows tend to
/// emit one.
pub fn read_transcript(path: &Path) -> Result<String> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read transcript: {:?}", path))?;
    Ok(text.strip_prefix('\u{feff}').unwrap_or(&text).to_string())
}
