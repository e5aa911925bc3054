//! Text splitting
//!
//! Turns an element's text into inline spans so words or characters can be
//! animated independently. Splitting is a pure function of the input text:
//! the same text always yields the same fragments, so repeated calls on an
//! element re-render identically.

use unveil_platform::Fragment;

/// Class on every word wrapper span
pub const WORD_CLASS: &str = "word";
/// Class on every character span
pub const CHAR_CLASS: &str = "char";

/// Split granularity
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SplitMode {
    /// One clipping wrapper per word around an inner span
    Words,
    /// One span per character, grouped in word spans
    Chars,
}

impl SplitMode {
    /// Split `text` into fragments
    ///
    /// Words are separated on single spaces; the spaces are kept as text
    /// nodes between the word spans.
    pub fn fragments(&self, text: &str) -> Vec<Fragment> {
        let mut out = Vec::new();
        for (i, word) in text.split(' ').enumerate() {
            if i > 0 {
                out.push(Fragment::text(" "));
            }
            out.push(match self {
                SplitMode::Words => Fragment::span(
                    Some(WORD_CLASS),
                    true,
                    vec![Fragment::span(None, false, vec![Fragment::text(word)])],
                ),
                SplitMode::Chars => Fragment::span(
                    Some(WORD_CLASS),
                    false,
                    word.chars()
                        .map(|c| {
                            Fragment::span(Some(CHAR_CLASS), false, vec![Fragment::text(c)])
                        })
                        .collect(),
                ),
            });
        }
        out
    }

    /// Selector for the spans that get animated, relative to the element
    pub fn target_selector(&self) -> &'static str {
        match self {
            SplitMode::Words => ".word span",
            SplitMode::Chars => ".char",
        }
    }
}

/// Markup for a list of fragments
pub fn markup(fragments: &[Fragment]) -> String {
    fragments.iter().map(|f| f.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_split_structure() {
        let fragments = SplitMode::Words.fragments("Power your growth");
        // 3 words + 2 separators
        assert_eq!(fragments.len(), 5);
        assert_eq!(fragments[1], Fragment::text(" "));
        let text: String = fragments.iter().map(|f| f.text_content()).collect();
        assert_eq!(text, "Power your growth");
    }

    #[test]
    fn test_split_is_deterministic() {
        let a = markup(&SplitMode::Words.fragments("Hello world"));
        let b = markup(&SplitMode::Words.fragments("Hello world"));
        assert_eq!(a, b);
        assert!(a.contains("overflow: hidden"));
    }

    #[test]
    fn test_char_split() {
        let fragments = SplitMode::Chars.fragments("ab c");
        let html = markup(&fragments);
        assert_eq!(html.matches("class=\"char\"").count(), 3);
        assert_eq!(html.matches("class=\"word\"").count(), 2);
    }
}
