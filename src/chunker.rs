//! Word-bounded text segmentation.

use serde::Serialize;

/// Default maximum number of words per segment.
pub const DEFAULT_MAX_WORDS: usize = 50;

/// A contiguous run of words from the input, synthesized as one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextSegment {
    /// Position of this segment in the chunker's output.
    pub index: usize,
    /// Words joined by single spaces (or the raw input for degenerate text).
    pub text: String,
}

impl TextSegment {
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// Split `text` on whitespace into segments of at most `max_words` words.
///
/// Input with no words yields a single segment holding the input unchanged,
/// never an empty list. A `max_words` of zero is treated as one.
pub fn chunk(text: &str, max_words: usize) -> Vec<TextSegment> {
    let max_words = max_words.max(1);
    let words: Vec<&str> = text.split_whitespace().collect();

    if words.is_empty() {
        return vec![TextSegment {
            index: 0,
            text: text.to_string(),
        }];
    }

    words
        .chunks(max_words)
        .enumerate()
        .map(|(index, words)| TextSegment {
            index,
            text: words.join(" "),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words_of(segments: &[TextSegment]) -> Vec<String> {
        segments
            .iter()
            .flat_map(|s| s.text.split_whitespace().map(str::to_string))
            .collect()
    }

    #[test]
    fn preserves_word_order_across_segments() {
        let text = "one  two\tthree\nfour five six seven";
        let segments = chunk(text, 3);

        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].text, "one two three");
        assert_eq!(segments[1].text, "four five six");
        assert_eq!(segments[2].text, "seven");
        let expected: Vec<String> = text.split_whitespace().map(str::to_string).collect();
        assert_eq!(words_of(&segments), expected);
    }

    #[test]
    fn indexes_are_sequential() {
        let segments = chunk(&"word ".repeat(23), 5);
        let indexes: Vec<usize> = segments.iter().map(|s| s.index).collect();
        assert_eq!(indexes, vec![0, 1, 2, 3, 4]);
        assert!(segments.iter().all(|s| s.word_count() <= 5));
        assert_eq!(segments[4].word_count(), 3);
    }

    #[test]
    fn exact_multiple_has_no_trailing_empty_segment() {
        let segments = chunk("a b c d", 2);
        assert_eq!(segments.len(), 2);
        assert!(segments.iter().all(|s| !s.text.is_empty()));
    }

    #[test]
    fn empty_and_whitespace_input_yield_single_raw_segment() {
        assert_eq!(
            chunk("", 50),
            vec![TextSegment {
                index: 0,
                text: String::new()
            }]
        );
        let segments = chunk("  \n\t ", 50);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].text, "  \n\t ");
    }

    #[test]
    fn short_text_is_a_single_segment() {
        let segments = chunk("Hello world.", DEFAULT_MAX_WORDS);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].text, "Hello world.");
    }

    #[test]
    fn repeated_sentence_splits_fifty_fifty_twenty() {
        let text = "Hello world. ".repeat(60);
        let segments = chunk(&text, 50);
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].word_count(), 50);
        assert_eq!(segments[1].word_count(), 50);
        assert_eq!(segments[2].word_count(), 20);
    }
}
