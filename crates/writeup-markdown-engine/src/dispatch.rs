//! # Dispatcher
//!
//! Single-pass interpretation of a token sequence into a [`Cursor`].
//!
//! Every popped token first goes through the policy's clip/collapse check;
//! tokens that survive are handled by kind:
//!
//! | kind            | output                                            |
//! |-----------------|---------------------------------------------------|
//! | heading         | `<markup> <text>` on its own line, or the title   |
//! | paragraph       | inner text, separator, break unless compressed    |
//! | inline          | children, merged in place                         |
//! | fence           | `<markup><info>\n<content>\n<markup>` on its own line |
//! | code span       | `<markup><content><markup>`                       |
//! | link            | `[text](href)`, or `text` when stripping links    |
//! | image           | `![alt](src)`, or `alt` when stripping links      |
//! | anything else   | the token's literal content                       |
//!
//! Headings, paragraphs and links recurse: their inner tokens are
//! transformed on a fresh cursor whose result is merged or flattened into
//! the caller's.

use log::trace;

use crate::{
    block::accumulate,
    cursor::Cursor,
    error::TransformError,
    links::LinkResolver,
    policy::{COLLAPSED, Policy, Special},
    token::{Nesting, Token, TokenKind},
};

/// Name of the extracted title parameter.
pub const TITLE: &str = "title";

/// Tag of top-level headings eligible as title.
const TITLE_TAG: &str = "h1";

pub struct Dispatcher<'p> {
    policy: &'p Policy,
    links: LinkResolver,
}

impl<'p> Dispatcher<'p> {
    pub fn new(policy: &'p Policy) -> Result<Self, TransformError> {
        Ok(Self {
            policy,
            links: LinkResolver::for_policy(policy)?,
        })
    }

    /// Dispatches every token of `tokens` on a fresh cursor.
    pub fn run(&self, tokens: Vec<Token>) -> Result<Cursor, TransformError> {
        let mut cursor = Cursor::new(tokens, self.policy.separator())?;
        while !cursor.is_exhausted() {
            let token = cursor.pop()?.clone();
            self.dispatch(&mut cursor, &token)?;
        }
        Ok(cursor)
    }

    /// Transforms the inside of a block; empty blocks produce no cursor.
    fn run_inner(&self, tokens: Vec<Token>) -> Result<Option<Cursor>, TransformError> {
        if tokens.is_empty() {
            return Ok(None);
        }
        self.run(tokens).map(Some)
    }

    fn inner_text(&self, tokens: Vec<Token>) -> Result<String, TransformError> {
        Ok(self
            .run_inner(tokens)?
            .map(|inner| inner.text())
            .unwrap_or_default())
    }

    fn dispatch(&self, cursor: &mut Cursor, token: &Token) -> Result<(), TransformError> {
        trace!("dispatch {token}");

        // Title extraction claims the first h1 before clipping can drop it.
        if self.claims_title(cursor, token) {
            return self.heading(cursor);
        }

        match self.policy.special(token) {
            Some(Special::Clip) => {
                trace!("clip {}", token.kind);
                self.consume(cursor, token)
            }
            Some(Special::Collapse) => {
                trace!("collapse {}", token.kind);
                self.consume(cursor, token)?;
                cursor.push([COLLAPSED]);
                cursor.separate();
                Ok(())
            }
            None => self.handle(cursor, token),
        }
    }

    fn claims_title(&self, cursor: &Cursor, token: &Token) -> bool {
        self.policy.extract_title
            && token.kind == TokenKind::HeadingOpen
            && token.tag == TITLE_TAG
            && !cursor.has_param(TITLE)
    }

    /// Skips past the construct `token` starts.
    fn consume(&self, cursor: &mut Cursor, token: &Token) -> Result<(), TransformError> {
        if token.nesting == Nesting::Open
            && let Some(close) = token.kind.closing()
        {
            accumulate(cursor, &close)?;
        }
        Ok(())
    }

    fn handle(&self, cursor: &mut Cursor, token: &Token) -> Result<(), TransformError> {
        match token.kind {
            TokenKind::HeadingOpen => self.heading(cursor),
            TokenKind::ParagraphOpen => self.paragraph(cursor),
            TokenKind::Inline => self.inline(cursor, token),
            TokenKind::Fence => {
                cursor.push_block([format!(
                    "{markup}{info}\n{content}\n{markup}",
                    markup = token.markup,
                    info = token.info,
                    content = token.content.trim(),
                )]);
                Ok(())
            }
            TokenKind::CodeInline => {
                cursor.push([format!("{m}{}{m}", token.content.trim(), m = token.markup)]);
                Ok(())
            }
            TokenKind::LinkOpen => self.link(cursor),
            TokenKind::Image => self.image(cursor, token),
            _ => {
                cursor.push([&token.content]);
                Ok(())
            }
        }
    }

    fn heading(&self, cursor: &mut Cursor) -> Result<(), TransformError> {
        let block = accumulate(cursor, &TokenKind::HeadingClose)?;
        let open = block.open().clone();
        let text = self.inner_text(block.into_content())?;

        if self.policy.extract_title && !cursor.has_param(TITLE) && open.tag == TITLE_TAG {
            trace!("title {text:?}");
            cursor.put_param(TITLE, text);
            return Ok(());
        }

        cursor.push_block([format!("{} {}", open.markup, text)]);
        Ok(())
    }

    fn paragraph(&self, cursor: &mut Cursor) -> Result<(), TransformError> {
        let block = accumulate(cursor, &TokenKind::ParagraphClose)?;
        if let Some(inner) = self.run_inner(block.into_content())? {
            cursor.merge(inner);
        }
        cursor.separate();
        if !self.policy.compress {
            cursor.line_break();
        }
        Ok(())
    }

    fn inline(&self, cursor: &mut Cursor, token: &Token) -> Result<(), TransformError> {
        if let Some(children) = &token.children
            && let Some(inner) = self.run_inner(children.clone())?
        {
            cursor.merge(inner);
        }
        Ok(())
    }

    fn link(&self, cursor: &mut Cursor) -> Result<(), TransformError> {
        let block = accumulate(cursor, &TokenKind::LinkClose)?;
        let href = self.links.link(block.open().attr("href").unwrap_or_default());
        let text = self.inner_text(block.into_content())?;

        if self.policy.strip_links {
            cursor.push([text]);
        } else {
            cursor.push([format!("[{text}]({href})")]);
        }
        Ok(())
    }

    fn image(&self, cursor: &mut Cursor, token: &Token) -> Result<(), TransformError> {
        let alt = match &token.children {
            Some(children) => self.inner_text(children.clone())?,
            None => token.content.clone(),
        };

        if self.policy.strip_links {
            cursor.push([alt]);
        } else {
            let src = self.links.image(token.attr("src").unwrap_or_default());
            cursor.push([format!("![{alt}]({src})")]);
        }
        Ok(())
    }
}
