//! Code-point indexed text.
//!
//! Every offset in this crate is expressed in Unicode scalar values (`char`), never bytes or
//! UTF-16 code units. [`CodepointText`] keeps a char-to-byte table so that slicing by code point
//! is O(1) after an O(n) build, and out-of-range offsets clamp instead of panicking.

use unicode_segmentation::UnicodeSegmentation;

/// A borrowed string addressed by code point.
#[derive(Debug, Clone)]
pub struct CodepointText<'a> {
    text: &'a str,
    /// `char_to_byte[i]` is the byte offset of the `i`-th char; the last entry is `text.len()`.
    char_to_byte: Vec<usize>,
}

impl<'a> CodepointText<'a> {
    /// Index `text` by code point.
    pub fn new(text: &'a str) -> Self {
        let mut char_to_byte: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
        char_to_byte.push(text.len());
        Self { text, char_to_byte }
    }

    /// The underlying string.
    pub fn as_str(&self) -> &'a str {
        self.text
    }

    /// Length in code points.
    pub fn len(&self) -> usize {
        self.char_to_byte.len().saturating_sub(1)
    }

    /// Returns `true` if the text has no code points.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Byte offset of a code-point offset (clamped to the end of the text).
    pub fn byte_offset(&self, char_offset: usize) -> usize {
        let clamped = char_offset.min(self.len());
        self.char_to_byte
            .get(clamped)
            .copied()
            .unwrap_or(self.text.len())
    }

    /// Clamp a possibly negative or too-large upstream offset into `[0, len]`.
    pub fn clamp_offset(&self, offset: i64) -> usize {
        if offset <= 0 {
            0
        } else {
            (offset as u64).min(self.len() as u64) as usize
        }
    }

    /// Slice `[start, end)` by code point. Offsets are clamped; an inverted range yields `""`.
    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        let start_byte = self.byte_offset(start);
        let end_byte = self.byte_offset(end);
        if start_byte >= end_byte {
            return "";
        }
        &self.text[start_byte..end_byte]
    }
}

/// Length of `text` in code points.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Longest prefix of `text` holding at most `max_chars` code points that does not split a
/// grapheme cluster.
///
/// When the first cluster alone exceeds the budget, the cut falls back to a plain code-point
/// boundary so the result is never longer than `max_chars`.
pub fn grapheme_prefix(text: &str, max_chars: usize) -> &str {
    let mut taken_chars = 0usize;
    let mut end_byte = 0usize;
    for (byte, grapheme) in text.grapheme_indices(true) {
        let cluster_chars = char_len(grapheme);
        if taken_chars + cluster_chars > max_chars {
            break;
        }
        taken_chars += cluster_chars;
        end_byte = byte + grapheme.len();
    }

    if end_byte == 0 && max_chars > 0 && !text.is_empty() {
        let cut = CodepointText::new(text).byte_offset(max_chars);
        return &text[..cut];
    }
    &text[..end_byte]
}

/// Longest suffix of `text` holding at most `max_chars` code points that does not split a
/// grapheme cluster. Mirrors [`grapheme_prefix`].
pub fn grapheme_suffix(text: &str, max_chars: usize) -> &str {
    let mut taken_chars = 0usize;
    let mut start_byte = text.len();
    for (byte, grapheme) in text.grapheme_indices(true).rev() {
        let cluster_chars = char_len(grapheme);
        if taken_chars + cluster_chars > max_chars {
            break;
        }
        taken_chars += cluster_chars;
        start_byte = byte;
    }

    if start_byte == text.len() && max_chars > 0 && !text.is_empty() {
        let indexed = CodepointText::new(text);
        let cut = indexed.byte_offset(indexed.len().saturating_sub(max_chars));
        return &text[cut..];
    }
    &text[start_byte..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_len_counts_code_points() {
        let text = CodepointText::new("a👋b");
        assert_eq!(text.len(), 3);
        assert_eq!(text.as_str().len(), 6);
        assert!(!text.is_empty());
        assert!(CodepointText::new("").is_empty());
    }

    #[test]
    fn test_slice_by_code_point() {
        let text = CodepointText::new("héllo 世界");
        assert_eq!(text.slice(0, 2), "hé");
        assert_eq!(text.slice(6, 8), "世界");
        assert_eq!(text.slice(6, 100), "世界");
        assert_eq!(text.slice(5, 2), "");
    }

    #[test]
    fn test_clamp_offset() {
        let text = CodepointText::new("abc");
        assert_eq!(text.clamp_offset(-4), 0);
        assert_eq!(text.clamp_offset(2), 2);
        assert_eq!(text.clamp_offset(99), 3);
    }

    #[test]
    fn test_grapheme_prefix_does_not_split_cluster() {
        // "e\u{301}" is one extended grapheme cluster made of two code points.
        let text = "abe\u{301}cd";
        assert_eq!(grapheme_prefix(text, 3), "ab");
        assert_eq!(grapheme_prefix(text, 4), "abe\u{301}");
        assert_eq!(grapheme_prefix(text, 100), text);
        assert_eq!(grapheme_prefix(text, 0), "");
    }

    #[test]
    fn test_grapheme_suffix_does_not_split_cluster() {
        // "👍🏽" is one cluster made of two code points.
        let text = "xy👍🏽";
        assert_eq!(grapheme_suffix(text, 1), "\u{1F3FD}");
        assert_eq!(grapheme_suffix(text, 2), "👍🏽");
        assert_eq!(grapheme_suffix(text, 3), "y👍🏽");
    }

    #[test]
    fn test_grapheme_prefix_falls_back_for_oversized_cluster() {
        let text = "e\u{301}\u{302}\u{303}z";
        assert_eq!(char_len(grapheme_prefix(text, 2)), 2);
    }
}
