//! Sentence and clause segmentation over byte offsets
//!
//! Offsets are byte positions into the original text and always fall on
//! character boundaries, so `&text[start..end]` is the trimmed sentence.

use regex::Regex;

/// Sentences shorter than this (in characters) carry no opinion.
pub(crate) const MIN_SENTENCE_CHARS: usize = 3;

/// A trimmed sentence and its byte range in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Sentence<'a> {
    pub text: &'a str,
    pub start: usize,
    pub end: usize,
}

impl Sentence<'_> {
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

fn is_terminator(ch: char) -> bool {
    matches!(ch, '。' | '！' | '？' | '；' | '!' | '?' | ';' | '\n' | '\r')
}

fn push_trimmed<'a>(text: &'a str, start: usize, end: usize, out: &mut Vec<Sentence<'a>>) {
    let segment = &text[start..end];
    let trimmed = segment.trim();
    if trimmed.is_empty() {
        return;
    }
    let leading = segment.len() - segment.trim_start().len();
    let start = start + leading;
    out.push(Sentence {
        text: trimmed,
        start,
        end: start + trimmed.len(),
    });
}

/// Split on sentence-ending punctuation. A `.` only ends a sentence when
/// followed by whitespace or the end of text, so "2.5" and "v1.2" survive.
pub(crate) fn split_sentences(text: &str) -> Vec<Sentence<'_>> {
    let mut sentences = Vec::new();
    let mut segment_start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        let ends = if ch == '.' {
            chars.peek().map_or(true, |&(_, next)| next.is_whitespace())
        } else {
            is_terminator(ch)
        };
        if ends {
            push_trimmed(text, segment_start, idx, &mut sentences);
            segment_start = idx + ch.len_utf8();
        }
    }
    push_trimmed(text, segment_start, text.len(), &mut sentences);

    sentences
}

/// Pattern separating clauses inside a sentence: commas, enumeration marks,
/// colons and contrastive conjunctions.
pub(crate) fn clause_separator() -> Result<Regex, regex::Error> {
    Regex::new(r"(?i)[，,、：:]|\s+(?:but|however|although|though|whereas)\s+")
}

/// Non-empty, trimmed clauses of a sentence.
pub(crate) fn split_clauses<'a>(sentence: &'a str, separator: &Regex) -> Vec<&'a str> {
    separator
        .split(sentence)
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .collect()
}

/// The span plus up to `radius` characters either side, with `...` where
/// the window was cut.
pub(crate) fn context_window(text: &str, start: usize, end: usize, radius: usize) -> String {
    let window_start = text[..start]
        .char_indices()
        .rev()
        .take(radius)
        .last()
        .map_or(start, |(i, _)| i);
    let window_end = text[end..]
        .char_indices()
        .nth(radius)
        .map_or(text.len(), |(i, _)| end + i);

    let mut context = String::new();
    if window_start > 0 {
        context.push_str("...");
    }
    context.push_str(&text[window_start..window_end]);
    if window_end < text.len() {
        context.push_str("...");
    }
    context
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts<'a>(sentences: &[Sentence<'a>]) -> Vec<&'a str> {
        sentences.iter().map(|s| s.text).collect()
    }

    #[test]
    fn splits_on_chinese_and_western_terminators() {
        let text = "屏幕很好。电池不行！价格呢？ OK; fine";
        let sentences = split_sentences(text);
        assert_eq!(texts(&sentences), vec!["屏幕很好", "电池不行", "价格呢", "OK", "fine"]);
    }

    #[test]
    fn offsets_slice_back_to_sentence() {
        let text = "  开头有空格。 second one. third";
        for sentence in split_sentences(text) {
            assert_eq!(&text[sentence.start..sentence.end], sentence.text);
        }
    }

    #[test]
    fn decimal_point_does_not_split() {
        let sentences = split_sentences("Version 2.5 is faster. Love it");
        assert_eq!(texts(&sentences), vec!["Version 2.5 is faster", "Love it"]);
    }

    #[test]
    fn trailing_period_ends_sentence() {
        let sentences = split_sentences("Battery is bad.");
        assert_eq!(texts(&sentences), vec!["Battery is bad"]);
    }

    #[test]
    fn empty_segments_are_skipped() {
        let sentences = split_sentences("。。！  ？");
        assert!(sentences.is_empty());
    }

    #[test]
    fn char_len_counts_characters() {
        let sentences = split_sentences("好用");
        assert_eq!(sentences[0].char_len(), 2);
    }

    #[test]
    fn clauses_split_on_commas_and_conjunctions() {
        let separator = clause_separator().unwrap();
        assert_eq!(
            split_clauses("这个东西又贵又卡，但是设计很漂亮", &separator),
            vec!["这个东西又贵又卡", "但是设计很漂亮"]
        );
        assert_eq!(
            split_clauses("The screen is great but the battery is terrible", &separator),
            vec!["The screen is great", "the battery is terrible"]
        );
    }

    #[test]
    fn context_window_marks_truncation() {
        let text = "abcdefghij";
        assert_eq!(context_window(text, 4, 6, 2), "...cdefgh...");
        assert_eq!(context_window(text, 0, 2, 2), "abcd...");
        assert_eq!(context_window(text, 8, 10, 2), "...ghij");
        assert_eq!(context_window(text, 0, 10, 20), "abcdefghij");
    }

    #[test]
    fn context_window_respects_multibyte_characters() {
        let text = "一二三四五六七";
        // span = 四 (bytes 9..12)
        assert_eq!(context_window(text, 9, 12, 1), "...三四五...");
    }
}
