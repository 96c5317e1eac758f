use log::warn;

use crate::{
    cursor::Cursor,
    error::TransformError,
    token::{Token, TokenKind},
};

/// A balanced `[open, ...content..., close]` run of tokens.
#[derive(Debug, Clone)]
pub struct Block {
    tokens: Vec<Token>,
    terminated: bool,
}

impl Block {
    pub fn open(&self) -> &Token {
        &self.tokens[0]
    }

    /// The matching close token, or `None` if the stream ended first.
    pub fn close(&self) -> Option<&Token> {
        if self.terminated {
            self.tokens.last()
        } else {
            None
        }
    }

    /// Tokens strictly between open and close.
    pub fn content(&self) -> &[Token] {
        &self.tokens[1..self.content_end()]
    }

    pub fn into_content(mut self) -> Vec<Token> {
        let end = self.content_end();
        self.tokens.truncate(end);
        self.tokens.remove(0);
        self.tokens
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    fn content_end(&self) -> usize {
        if self.terminated {
            self.tokens.len() - 1
        } else {
            self.tokens.len()
        }
    }
}

/// Collects the block opened by the cursor's current token.
///
/// Tokens of the open kind deepen the nesting, tokens of the `close` kind at
/// depth zero end the block. A stream that runs out before the matching close
/// yields an unterminated block rather than an error.
pub fn accumulate(cursor: &mut Cursor, close: &TokenKind) -> Result<Block, TransformError> {
    let open = cursor.top()?.clone();
    let open_kind = open.kind.clone();
    let mut tokens = vec![open];
    let mut depth = 0usize;
    let mut terminated = false;

    while !cursor.is_exhausted() {
        let token = cursor.pop()?.clone();
        let kind = token.kind.clone();
        tokens.push(token);

        if kind == open_kind {
            depth += 1;
        } else if kind == *close {
            if depth == 0 {
                terminated = true;
                break;
            }
            depth -= 1;
        }
    }

    if !terminated {
        warn!("{open_kind} block ran to the end of the token stream without a {close}");
    }

    Ok(Block { tokens, terminated })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{close, inline, open, paragraph, text};
    use pretty_assertions::assert_eq;

    fn names(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.kind.name()).collect()
    }

    #[test]
    fn nested_same_kind_blocks_close_outermost_last() {
        let mut tokens = vec![open("blockquote_open", "blockquote"), open("blockquote_open", "blockquote")];
        tokens.extend(paragraph(vec![text("deep")]));
        tokens.push(close("blockquote_close", "blockquote"));
        tokens.push(close("blockquote_close", "blockquote"));
        tokens.extend(paragraph(vec![text("after")]));

        let mut cur = Cursor::new(tokens, "\n").unwrap();
        cur.pop().unwrap();
        let block = accumulate(&mut cur, &TokenKind::from("blockquote_close")).unwrap();

        assert!(block.is_terminated());
        assert_eq!(
            names(block.content()),
            vec![
                "blockquote_open",
                "paragraph_open",
                "inline",
                "paragraph_close",
                "blockquote_close",
            ]
        );
        assert_eq!(block.close().unwrap().kind.name(), "blockquote_close");
        assert_eq!(cur.remaining(), 3);
    }

    #[test]
    fn block_from_tokenized_source() {
        let tokens = crate::lexer::tokenize("> > > three\n\nafter\n");
        let mut cur = Cursor::new(tokens, "\n").unwrap();
        cur.pop().unwrap();

        let block = accumulate(&mut cur, &TokenKind::from("blockquote_close")).unwrap();

        let closes = block
            .content()
            .iter()
            .filter(|t| t.kind.name() == "blockquote_close")
            .count();
        assert_eq!(closes, 2);
        assert_eq!(names(&block.into_content()).len(), 7);
        assert_eq!(cur.remaining(), 3);
    }

    #[test]
    fn boundary_tokens_are_exposed() {
        let mut tokens = vec![open("heading_open", "h2").with_markup("##")];
        tokens.push(inline(vec![text("Setup")]));
        tokens.push(close("heading_close", "h2"));

        let mut cur = Cursor::new(tokens, "\n").unwrap();
        cur.pop().unwrap();
        let block = accumulate(&mut cur, &TokenKind::HeadingClose).unwrap();

        assert_eq!(block.open().markup, "##");
        assert_eq!(block.open().tag, "h2");
        assert_eq!(names(block.content()), vec!["inline"]);
        assert!(cur.is_exhausted());
    }

    /// Unterminated blocks are an accepted edge case: accumulation stops at
    /// the end of the stream and the content is whatever was left.
    #[test]
    fn unterminated_block_stops_at_end_of_stream() {
        let tokens = vec![open("heading_open", "h1"), inline(vec![text("dangling")])];

        let mut cur = Cursor::new(tokens, "\n").unwrap();
        cur.pop().unwrap();
        let block = accumulate(&mut cur, &TokenKind::HeadingClose).unwrap();

        assert!(!block.is_terminated());
        assert!(block.close().is_none());
        assert_eq!(names(block.content()), vec!["inline"]);
        assert!(cur.is_exhausted());
    }

    #[test]
    fn accumulate_before_pop_is_an_invariant_error() {
        let mut cur = Cursor::new(vec![text("x")], "\n").unwrap();
        let err = accumulate(&mut cur, &TokenKind::HeadingClose).unwrap_err();
        assert!(matches!(err, TransformError::InternalInvariant(_)));
    }
}
