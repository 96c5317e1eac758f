use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::{error::TransformError, policy::Policy, transform::transform};

/// Default maximum summary length, in characters.
pub const DEFAULT_SUMMARY_LENGTH: usize = 140;

const ELLIPSIS: &str = "...";

static TRAILING_PARTIAL_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s\S*$").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub text: String,
}

/// Short plain-text blurb of a Markdown document using the summary preset.
pub fn summary(source: &str, max: usize) -> Result<Summary, TransformError> {
    summarize(source, &Policy::summary(), max)
}

/// Like [`summary`] with a caller-supplied policy. Extracted parameters are discarded.
pub fn summarize(source: &str, policy: &Policy, max: usize) -> Result<Summary, TransformError> {
    let transformed = transform(source, policy)?;
    Ok(Summary {
        text: truncate(&transformed.text, max),
    })
}

/// Cuts `text` to at most `max` characters on a word boundary.
///
/// A cut landing inside a word drops that partial word. The result gets an
/// ellipsis unless it already ends a sentence with `.`.
pub fn truncate(text: &str, max: usize) -> String {
    let text = text.trim();
    let mut kept: String = text.chars().take(max).collect();

    let next = text.chars().nth(max);
    let mid_word = next.is_some_and(|c| !c.is_whitespace())
        && kept.chars().last().is_some_and(|c| !c.is_whitespace());
    if mid_word {
        kept = TRAILING_PARTIAL_WORD.replace(&kept, "").into_owned();
    }

    let mut out = kept.trim_end().to_string();
    if !out.ends_with('.') {
        out.push_str(ELLIPSIS);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn mid_word_cut_drops_partial_word() {
        let body = "lorem ipsum ".repeat(20);
        let out = summary(&body, DEFAULT_SUMMARY_LENGTH).unwrap();

        let expected = format!("{}lorem...", "lorem ipsum ".repeat(11));
        assert_eq!(out.text, expected);
    }

    #[test]
    fn cut_at_sentence_end_adds_no_ellipsis() {
        let first = format!("{}ends.", "word ".repeat(27));
        assert_eq!(first.chars().count(), 140);

        let out = summary(&format!("{first} Another sentence follows here."), 140).unwrap();
        assert_eq!(out.text, first);
    }

    #[rstest]
    #[case("Short text", 140, "Short text...")]
    #[case("Short sentence.", 140, "Short sentence.")]
    #[case("  padded.  ", 140, "padded.")]
    #[case("one two three", 7, "one two...")]
    #[case("one two three", 6, "one...")]
    #[case("unbreakable", 4, "unbr...")]
    #[case("", 10, "...")]
    fn truncation(#[case] text: &str, #[case] max: usize, #[case] expected: &str) {
        assert_eq!(truncate(text, max), expected);
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        assert_eq!(truncate("héllo wörld", 8), "héllo...");
    }

    #[test]
    fn headings_are_dropped_and_links_flattened() {
        let md = "# Title\n\n## Sub\n\nRead [the docs](http://x).\n\n```\ncode\n```\n";
        let out = summary(md, DEFAULT_SUMMARY_LENGTH).unwrap();
        assert_eq!(out.text, "Read the docs . [...]...");
    }

    #[test]
    fn paragraphs_are_joined_on_one_line() {
        let out = summary("First.\n\nSecond.\n", DEFAULT_SUMMARY_LENGTH).unwrap();
        assert_eq!(out.text, "First. Second.");
    }

    #[test]
    fn lower_headings_stay_in_summary() {
        let out = summary("### Notes\n\nBody.\n", DEFAULT_SUMMARY_LENGTH).unwrap();
        assert_eq!(out.text, "### Notes \nBody.");
    }
}
