//! Transcript segmentation.
//!
//! Splits a long transcript into ordered, overlapping segments bounded by
//! a target character size, preferring natural boundaries. All arithmetic
//! is in characters, so a split can never land inside a multi-byte
//! character.

use tracing::debug;

use crate::models::{Segment, SegmenterConfig};

/// Sentence-terminal boundaries, Latin and CJK full-width
const SENTENCE_TERMINATORS: &[&str] = &[". ", "! ", "? ", "。", "！", "？"];

/// Split a transcript into segments for Phase 1 processing.
///
/// At or below `max_chars` the whole transcript is a single segment with
/// no overlap applied. Otherwise each segment ends at the strongest
/// natural boundary found in the back half of its window (paragraph break,
/// then line break, then sentence terminator, then space), degrading to a
/// hard cut at `max_chars` when even a space cannot be found past the
/// window's quarter point. The next window starts `overlap_chars` before
/// the split so consecutive segments share a span of text.
pub fn split_transcript(transcript: &str, config: &SegmenterConfig) -> Vec<Segment> {
    let chars: Vec<char> = transcript.chars().collect();

    if chars.len() <= config.max_chars {
        return vec![Segment {
            index: 0,
            total: 1,
            text: transcript.to_string(),
        }];
    }

    let mut pieces: Vec<String> = Vec::new();
    let mut remaining: Vec<char> = chars;

    loop {
        if remaining.len() <= config.max_chars {
            pieces.push(remaining.iter().collect());
            break;
        }

        let split_pos = choose_split(&remaining[..config.max_chars], config.max_chars);
        debug!("segment boundary at {} of {} chars", split_pos, config.max_chars);

        let piece: String = remaining[..split_pos].iter().collect();
        pieces.push(piece.trim().to_string());

        // Never rewind past the midpoint of the emitted piece: an overlap
        // that reaches the window start would keep re-emitting the same
        // piece forever.
        let overlap_start = split_pos
            .saturating_sub(config.overlap_chars)
            .max((split_pos / 2).max(1));
        remaining = trim_chars(&remaining[overlap_start..]).to_vec();
        if remaining.is_empty() {
            break;
        }
    }

    let total = pieces.len();
    pieces
        .into_iter()
        .enumerate()
        .map(|(index, text)| Segment { index, total, text })
        .collect()
}

/// Pick the split position within a window using the boundary preference
/// order. A candidate is accepted only at or past the window midpoint;
/// below the quarter point even a space is rejected in favor of a hard
/// cut at `max_chars`.
fn choose_split(window: &[char], max_chars: usize) -> usize {
    let midpoint = (max_chars / 2) as isize;
    let quarter = (max_chars / 4) as isize;

    let mut split_pos = rfind_seq(window, &['\n', '\n']);

    if split_pos < midpoint {
        split_pos = rfind_char(window, '\n');
    }

    if split_pos < midpoint {
        for terminator in SENTENCE_TERMINATORS {
            let needle: Vec<char> = terminator.chars().collect();
            let pos = rfind_seq(window, &needle);
            if pos > split_pos {
                // land just past the terminal punctuation
                split_pos = pos + 1;
            }
        }
    }

    if split_pos < midpoint {
        split_pos = rfind_char(window, ' ');
    }

    if split_pos < quarter {
        // no acceptable boundary; a word may be split
        split_pos = max_chars as isize;
    }

    split_pos as usize
}

/// Last occurrence of `needle` in `hay`, or -1
fn rfind_seq(hay: &[char], needle: &[char]) -> isize {
    if needle.is_empty() || hay.len() < needle.len() {
        return -1;
    }
    for start in (0..=hay.len() - needle.len()).rev() {
        if &hay[start..start + needle.len()] == needle {
            return start as isize;
        }
    }
    -1
}

fn rfind_char(hay: &[char], needle: char) -> isize {
    hay.iter()
        .rposition(|&c| c == needle)
        .map(|p| p as isize)
        .unwrap_or(-1)
}

/// Strip leading and trailing whitespace from a char slice
fn trim_chars(chars: &[char]) -> &[char] {
    let start = chars
        .iter()
        .position(|c| !c.is_whitespace())
        .unwrap_or(chars.len());
    let end = chars
        .iter()
        .rposition(|c| !c.is_whitespace())
        .map(|p| p + 1)
        .unwrap_or(start);
    &chars[start..end]
}
