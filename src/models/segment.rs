/// Configuration for transcript segmentation
#[derive(Debug, Clone)]
pub struct SegmenterConfig {
    /// Target segment size in characters (~5-7 minutes of speech)
    pub max_chars: usize,
    /// Overlap carried into the next segment for boundary context
    pub overlap_chars: usize,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            max_chars: 7_000,
            overlap_chars: 500,
        }
    }
}

/// A bounded contiguous slice of the transcript, the unit of Phase 1 processing.
///
/// Consecutive segments share an overlapping span of text so local context
/// survives the boundary.
#[derive(Debug, Clone)]
pub struct Segment {
    /// Zero-based position in the segment sequence
    pub index: usize,
    /// Total number of segments produced by the split
    pub total: usize,
    /// Segment text, trimmed of surrounding whitespace
    pub text: String,
}

impl Segment {
    /// Human-readable position, e.g. "2 of 5"
    pub fn position(&self) -> String {
        format!("{} of {}", self.index + 1, self.total)
    }

    /// Length in characters (not bytes)
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position() {
        let segment = Segment {
            index: 1,
            total: 5,
            text: "hello".to_string(),
        };
        assert_eq!(segment.position(), "2 of 5");
    }

    #[test]
    fn test_char_len_multibyte() {
        let segment = Segment {
            index: 0,
            total: 1,
            text: "שלום עולם".to_string(),
        };
        assert_eq!(segment.char_len(), 9);
    }
}
