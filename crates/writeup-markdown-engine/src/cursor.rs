use std::collections::BTreeMap;

use crate::{
    chip::{Chip, needs_space},
    error::TransformError,
    token::Token,
};

/// Parameters extracted alongside the transformed text.
pub type Params = BTreeMap<String, String>;

/// Traversal state over a token sub-sequence plus the output it has produced.
///
/// Remaining tokens are stored in reverse so taking the next one is a pop
/// from the end. Each recursive sub-transformation runs on its own cursor and
/// is [merged](Cursor::merge) back into its caller.
#[derive(Debug)]
pub struct Cursor {
    remaining: Vec<Token>,
    top: Option<Token>,
    chips: Vec<Chip>,
    params: Params,
    separator: String,
}

impl Cursor {
    /// Creates a cursor over `tokens`.
    ///
    /// Fails with [`TransformError::InvalidInput`] for an empty stream.
    pub fn new(mut tokens: Vec<Token>, separator: impl Into<String>) -> Result<Self, TransformError> {
        if tokens.is_empty() {
            return Err(TransformError::InvalidInput(
                "cannot traverse an empty token stream".to_string(),
            ));
        }
        tokens.reverse();
        Ok(Self {
            remaining: tokens,
            top: None,
            chips: Vec::new(),
            params: Params::new(),
            separator: separator.into(),
        })
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Advances to the next token and returns it.
    pub fn pop(&mut self) -> Result<&Token, TransformError> {
        let token = self
            .remaining
            .pop()
            .ok_or(TransformError::InternalInvariant("pop past the end of the token stream"))?;
        Ok(self.top.insert(token))
    }

    /// The most recently popped token.
    pub fn top(&self) -> Result<&Token, TransformError> {
        self.top
            .as_ref()
            .ok_or(TransformError::InternalInvariant("top read before any pop"))
    }

    /// Appends each non-empty text, trimmed, spacing it from the previous chip as needed.
    pub fn push<I, S>(&mut self, texts: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for text in texts {
            let text = text.as_ref().trim();
            if !text.is_empty() {
                self.push_text(text.to_string());
            }
        }
    }

    /// Pushes `texts` on a line of their own, followed by a separator and a break.
    pub fn push_block<I, S>(&mut self, texts: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if !matches!(self.chips.last(), Some(Chip::Break)) {
            self.line_break();
        }
        self.push(texts);
        self.separate();
        self.line_break();
    }

    pub fn separate(&mut self) {
        self.chips.push(Chip::Separator(self.separator.clone()));
    }

    pub fn line_break(&mut self) {
        self.chips.push(Chip::Break);
    }

    /// Takes over another cursor's chips and parameters.
    pub fn merge(&mut self, other: Cursor) {
        for chip in other.chips {
            match chip {
                Chip::Text(text) => self.push_text(text),
                chip => self.chips.push(chip),
            }
        }
        self.merge_params(other.params);
    }

    fn push_text(&mut self, text: String) {
        if needs_space(self.chips.last(), &text) {
            self.chips.push(Chip::Space);
        }
        self.chips.push(Chip::Text(text));
    }

    pub fn put_param(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.params.insert(name.into(), value.into());
    }

    pub fn has_param(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Plain overwrite; first-wins rules belong to the caller.
    pub fn merge_params(&mut self, params: Params) {
        self.params.extend(params);
    }

    pub fn chips(&self) -> &[Chip] {
        &self.chips
    }

    /// Concatenated chip values.
    pub fn text(&self) -> String {
        self.chips.iter().map(Chip::value).collect()
    }

    /// Chip-by-chip bracketed rendering.
    pub fn annotated(&self) -> String {
        self.chips.iter().map(Chip::annotated).collect()
    }

    pub fn into_params(self) -> Params {
        self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{inline, text};
    use pretty_assertions::assert_eq;

    fn cursor() -> Cursor {
        Cursor::new(vec![text("x")], "\n").unwrap()
    }

    #[test]
    fn empty_stream_is_invalid_input() {
        let err = Cursor::new(Vec::new(), "\n").unwrap_err();
        assert!(matches!(err, TransformError::InvalidInput(_)));
    }

    #[test]
    fn pops_in_order_and_tracks_top() {
        let mut cur = Cursor::new(vec![text("a"), text("b")], "\n").unwrap();

        assert!(matches!(cur.top(), Err(TransformError::InternalInvariant(_))));
        assert_eq!(cur.pop().unwrap().content, "a");
        assert_eq!(cur.top().unwrap().content, "a");
        assert_eq!(cur.pop().unwrap().content, "b");
        assert!(cur.is_exhausted());
        assert!(matches!(cur.pop(), Err(TransformError::InternalInvariant(_))));
        assert_eq!(cur.top().unwrap().content, "b");
    }

    #[test]
    fn words_from_separate_pushes_are_spaced() {
        let mut cur = cursor();
        cur.push(["Hello"]);
        cur.push(["world"]);
        assert_eq!(cur.text(), "Hello world");
    }

    #[test]
    fn punctuation_attaches_to_previous_word() {
        let mut cur = cursor();
        cur.push(["Hello"]);
        cur.push([", world"]);
        assert_eq!(cur.text(), "Hello, world");
    }

    #[test]
    fn push_trims_and_skips_empty_text() {
        let mut cur = cursor();
        cur.push(["  (see  ", "", "   ", "below) "]);
        assert_eq!(cur.text(), "(see below)");
        assert_eq!(cur.chips().len(), 3);
    }

    #[test]
    fn push_block_starts_on_a_new_line() {
        let mut cur = cursor();
        cur.push(["intro"]);
        cur.push_block(["## Heading"]);
        cur.push(["after"]);

        assert_eq!(cur.text(), "intro\n## Heading\n\nafter");
    }

    #[test]
    fn push_block_on_empty_buffer_starts_with_break() {
        let mut cur = cursor();
        cur.push_block(["```\ncode\n```"]);
        assert_eq!(cur.text(), "\n```\ncode\n```\n\n");
    }

    #[test]
    fn push_block_after_break_adds_no_second_break() {
        let mut cur = cursor();
        cur.line_break();
        cur.push_block(["## Heading"]);
        assert_eq!(cur.text(), "\n## Heading\n\n");
    }

    #[test]
    fn merge_applies_spacing_to_text_chips_only() {
        let mut outer = cursor();
        outer.push(["See"]);

        let mut inner = Cursor::new(vec![inline(Vec::new())], " ").unwrap();
        inner.push(["docs"]);
        inner.separate();
        inner.push(["next"]);

        outer.merge(inner);
        assert_eq!(outer.text(), "See docs next");
        assert_eq!(
            outer.chips(),
            &[
                Chip::Text("See".to_string()),
                Chip::Space,
                Chip::Text("docs".to_string()),
                Chip::Separator(" ".to_string()),
                Chip::Text("next".to_string()),
            ]
        );
    }

    #[test]
    fn merge_overwrites_params() {
        let mut outer = cursor();
        outer.put_param("title", "first");

        let mut inner = cursor();
        inner.put_param("title", "second");
        inner.put_param("lang", "en");

        outer.merge(inner);
        assert_eq!(outer.param("title"), Some("second"));
        assert!(outer.has_param("lang"));
    }

    #[test]
    fn annotated_shows_chip_boundaries() {
        let mut cur = cursor();
        cur.push(["a", "b"]);
        cur.separate();
        cur.line_break();
        assert_eq!(cur.annotated(), "[a][ ][b][sep][br]\n");
    }
}
