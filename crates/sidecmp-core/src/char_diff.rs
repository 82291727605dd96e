//! Character-level highlighting inside a modified line or value.
//!
//! Both sides are split into runs of unchanged and changed text. Changed
//! runs are wrapped in [`HIGHLIGHT_OPEN`]/[`HIGHLIGHT_CLOSE`]; all text is
//! escaped first so the result can be rendered as raw markup.

use std::time::{Duration, Instant};

use similar::{Algorithm, DiffTag, TextDiff};

/// Opening marker placed before a changed span.
pub const HIGHLIGHT_OPEN: &str = "<span class=\"highlight\">";
/// Closing marker placed after a changed span.
pub const HIGHLIGHT_CLOSE: &str = "</span>";

/// A run of text on one side of a character diff.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub changed: bool,
}

/// The segmented result of diffing two strings character by character.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CharDiff {
    pub original: Vec<Segment>,
    pub altered: Vec<Segment>,
}

impl CharDiff {
    /// Diff two strings with Myers and no deadline.
    pub fn new(old: &str, new: &str) -> Self {
        Self::with_options(old, new, Algorithm::Myers, None)
    }

    pub fn with_options(
        old: &str,
        new: &str,
        algorithm: Algorithm,
        timeout: Option<Duration>,
    ) -> Self {
        let mut out = CharDiff::default();
        if old == new {
            push_segment(&mut out.original, old, false);
            push_segment(&mut out.altered, new, false);
            return out;
        }

        let mut config = TextDiff::configure();
        config.algorithm(algorithm);
        if let Some(t) = timeout {
            config.deadline(Instant::now() + t);
        }
        let diff = config.diff_chars(old, new);
        let old_chars = diff.old_slices();
        let new_chars = diff.new_slices();

        for op in diff.ops() {
            let (tag, o, n) = op.as_tag_tuple();
            let old_text = old_chars[o].concat();
            let new_text = new_chars[n].concat();
            match tag {
                DiffTag::Equal => {
                    push_segment(&mut out.original, &old_text, false);
                    push_segment(&mut out.altered, &new_text, false);
                }
                DiffTag::Delete => push_segment(&mut out.original, &old_text, true),
                DiffTag::Insert => push_segment(&mut out.altered, &new_text, true),
                DiffTag::Replace => {
                    push_segment(&mut out.original, &old_text, true);
                    push_segment(&mut out.altered, &new_text, true);
                }
            }
        }
        out
    }

    /// Returns `true` if any span differs.
    pub fn has_changes(&self) -> bool {
        self.original.iter().chain(&self.altered).any(|s| s.changed)
    }

    pub fn original_markup(&self) -> String {
        render(&self.original)
    }

    pub fn altered_markup(&self) -> String {
        render(&self.altered)
    }
}

/// Append text to a side, merging with the previous run if it has the same flag.
fn push_segment(side: &mut Vec<Segment>, text: &str, changed: bool) {
    if text.is_empty() {
        return;
    }
    match side.last_mut() {
        Some(last) if last.changed == changed => last.text.push_str(text),
        _ => side.push(Segment {
            text: text.to_string(),
            changed,
        }),
    }
}

fn render(segments: &[Segment]) -> String {
    let mut out = String::new();
    for segment in segments {
        if segment.changed {
            out.push_str(HIGHLIGHT_OPEN);
            out.push_str(&escape_html(&segment.text));
            out.push_str(HIGHLIGHT_CLOSE);
        } else {
            out.push_str(&escape_html(&segment.text));
        }
    }
    out
}

/// Escape the characters that are significant in markup.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Produces highlighted markup for modified pairs with fixed diff settings.
#[derive(Clone, Copy, Debug, Default)]
pub struct Highlighter {
    algorithm: Algorithm,
    timeout: Option<Duration>,
}

impl Highlighter {
    pub fn new(algorithm: Algorithm, timeout: Option<Duration>) -> Self {
        Self { algorithm, timeout }
    }

    /// Markup for both sides, original first.
    pub fn pair(&self, old: &str, new: &str) -> (String, String) {
        let diff = CharDiff::with_options(old, new, self.algorithm, self.timeout);
        (diff.original_markup(), diff.altered_markup())
    }
}

/// Diff two strings and return their highlighted markup, original first.
pub fn highlight_pair(old: &str, new: &str) -> (String, String) {
    Highlighter::default().pair(old, new)
}

#[cfg(test)]
pub(crate) fn strip_markup(markup: &str) -> String {
    markup
        .replace(HIGHLIGHT_OPEN, "")
        .replace(HIGHLIGHT_CLOSE, "")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_strings_not_highlighted() {
        let (a, b) = highlight_pair("same text", "same text");
        assert_eq!(a, "same text");
        assert_eq!(b, "same text");
        assert!(!CharDiff::new("x", "x").has_changes());
    }

    #[test]
    fn case_change_highlights_whole_word() {
        let (a, b) = highlight_pair("bar", "BAR");
        assert_eq!(a, "<span class=\"highlight\">bar</span>");
        assert_eq!(b, "<span class=\"highlight\">BAR</span>");
    }

    #[test]
    fn only_differing_chars_highlighted() {
        let (a, b) = highlight_pair("b=2", "b=3");
        assert_eq!(a, "b=<span class=\"highlight\">2</span>");
        assert_eq!(b, "b=<span class=\"highlight\">3</span>");
    }

    #[test]
    fn pure_insertion_leaves_original_plain() {
        let (a, b) = highlight_pair("hello", "hello world");
        assert_eq!(a, "hello");
        assert_eq!(b, "hello<span class=\"highlight\"> world</span>");
    }

    #[test]
    fn markup_characters_escaped() {
        let (a, b) = highlight_pair("<a> & b", "<b> & b");
        assert_eq!(a, "&lt;<span class=\"highlight\">a</span>&gt; &amp; b");
        assert_eq!(b, "&lt;<span class=\"highlight\">b</span>&gt; &amp; b");
    }

    #[test]
    fn adjacent_changes_merge_into_one_span() {
        let diff = CharDiff::new("abcd", "axyd");
        let changed: Vec<_> = diff.altered.iter().filter(|s| s.changed).collect();
        assert_eq!(changed.len(), 1);
        assert_eq!(changed[0].text, "xy");
    }

    #[test]
    fn stripping_markup_restores_input() {
        let pairs = [
            ("fn main() { x < 3 }", "fn main() { x <= 4 }"),
            ("ümlaut ß", "umlaut ss"),
            ("", "new"),
            ("old", ""),
        ];
        for (old, new) in pairs {
            let (a, b) = highlight_pair(old, new);
            assert_eq!(strip_markup(&a), old);
            assert_eq!(strip_markup(&b), new);
        }
    }

    #[test]
    fn deadline_still_covers_both_inputs() {
        let old = "the quick brown fox jumps over the lazy dog";
        let new = "the quick red fox leaps over the sleepy dog";
        let diff = CharDiff::with_options(old, new, Algorithm::Patience, Some(Duration::from_millis(50)));
        assert!(diff.has_changes());
        assert_eq!(strip_markup(&diff.original_markup()), old);
        assert_eq!(strip_markup(&diff.altered_markup()), new);

        let (a, b) = Highlighter::new(Algorithm::Myers, Some(Duration::from_millis(50))).pair("b=2", "b=3");
        assert_eq!(a, "b=<span class=\"highlight\">2</span>");
        assert_eq!(b, "b=<span class=\"highlight\">3</span>");
    }

    #[test]
    fn escape_ampersand_first() {
        assert_eq!(escape_html("&lt;"), "&amp;lt;");
    }
}
