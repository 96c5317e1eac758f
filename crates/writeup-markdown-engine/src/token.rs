//! # Token Model
//!
//! A flat, ordered token stream in the shape produced by [`crate::lexer`].
//!
//! Nesting is never represented as a tree. Block and span constructs appear as
//! an `*_open` token, their content, and a matching `*_close` token of the
//! same family; [`crate::block::accumulate`] recovers the extent of a construct
//! by counting those pairs.
//!
//! Inline content of a paragraph or heading lives in a single `inline` token
//! whose `children` hold the span-level tokens (text, code spans, links, ...).
//!
//! The kind vocabulary is open: the kinds the transformer handles specially
//! are named variants of [`TokenKind`], everything else travels as
//! [`TokenKind::Other`] under its canonical name. Policies match against
//! [`TokenKind::name`] and [`Token::tag`].

use std::fmt;

/// The kind of a token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TokenKind {
    HeadingOpen,
    HeadingClose,
    ParagraphOpen,
    ParagraphClose,
    /// Container for span-level children.
    Inline,
    /// Fenced code block.
    Fence,
    /// Indented code block.
    CodeBlock,
    /// Code span (backticks).
    CodeInline,
    LinkOpen,
    LinkClose,
    Image,
    Text,
    Softbreak,
    Hardbreak,
    /// Any other kind, carried by its canonical name (`blockquote_open`, `em_close`, ...).
    Other(String),
}

impl TokenKind {
    /// Canonical name of the kind, as matched by policies.
    pub fn name(&self) -> &str {
        match self {
            TokenKind::HeadingOpen => "heading_open",
            TokenKind::HeadingClose => "heading_close",
            TokenKind::ParagraphOpen => "paragraph_open",
            TokenKind::ParagraphClose => "paragraph_close",
            TokenKind::Inline => "inline",
            TokenKind::Fence => "fence",
            TokenKind::CodeBlock => "code_block",
            TokenKind::CodeInline => "code_inline",
            TokenKind::LinkOpen => "link_open",
            TokenKind::LinkClose => "link_close",
            TokenKind::Image => "image",
            TokenKind::Text => "text",
            TokenKind::Softbreak => "softbreak",
            TokenKind::Hardbreak => "hardbreak",
            TokenKind::Other(name) => name,
        }
    }

    /// The kind that closes a construct opened by `self`.
    ///
    /// Named open kinds map to their close variants; other kinds follow the
    /// `x_open` / `x_close` naming convention. Returns `None` for kinds that
    /// do not open anything.
    pub fn closing(&self) -> Option<TokenKind> {
        match self {
            TokenKind::HeadingOpen => Some(TokenKind::HeadingClose),
            TokenKind::ParagraphOpen => Some(TokenKind::ParagraphClose),
            TokenKind::LinkOpen => Some(TokenKind::LinkClose),
            TokenKind::Other(name) => name
                .strip_suffix("_open")
                .map(|family| TokenKind::from(format!("{family}_close"))),
            _ => None,
        }
    }
}

impl From<&str> for TokenKind {
    fn from(name: &str) -> Self {
        match name {
            "heading_open" => TokenKind::HeadingOpen,
            "heading_close" => TokenKind::HeadingClose,
            "paragraph_open" => TokenKind::ParagraphOpen,
            "paragraph_close" => TokenKind::ParagraphClose,
            "inline" => TokenKind::Inline,
            "fence" => TokenKind::Fence,
            "code_block" => TokenKind::CodeBlock,
            "code_inline" => TokenKind::CodeInline,
            "link_open" => TokenKind::LinkOpen,
            "link_close" => TokenKind::LinkClose,
            "image" => TokenKind::Image,
            "text" => TokenKind::Text,
            "softbreak" => TokenKind::Softbreak,
            "hardbreak" => TokenKind::Hardbreak,
            other => TokenKind::Other(other.to_string()),
        }
    }
}

impl From<String> for TokenKind {
    fn from(name: String) -> Self {
        TokenKind::from(name.as_str())
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether a token opens, closes, or stands alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nesting {
    Open,
    Close,
    SelfClosing,
}

/// A single token of the flat stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// HTML-ish tag name (`h1`, `p`, `a`, `code`, ...), empty when not applicable.
    pub tag: String,
    pub nesting: Nesting,
    /// Source markup (`##`, ```` ``` ````, `*`, ...).
    pub markup: String,
    /// Fence info string.
    pub info: String,
    pub content: String,
    pub attrs: Vec<(String, String)>,
    /// Span-level children of `inline` and `image` tokens.
    pub children: Option<Vec<Token>>,
    /// Set on paragraphs synthesized for tight list items. Only shown by
    /// [`dump`]; the dispatcher treats hidden paragraphs like any other.
    pub hidden: bool,
}

impl Token {
    pub fn new(kind: impl Into<TokenKind>, tag: impl Into<String>, nesting: Nesting) -> Self {
        Self {
            kind: kind.into(),
            tag: tag.into(),
            nesting,
            markup: String::new(),
            info: String::new(),
            content: String::new(),
            attrs: Vec::new(),
            children: None,
            hidden: false,
        }
    }

    pub fn with_markup(mut self, markup: impl Into<String>) -> Self {
        self.markup = markup.into();
        self
    }

    pub fn with_info(mut self, info: impl Into<String>) -> Self {
        self.info = info.into();
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_children(mut self, children: Vec<Token>) -> Self {
        self.children = Some(children);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Looks up an attribute value by name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name, value)),
        }
    }

    /// Builds the close token matching this open token.
    ///
    /// Returns `None` when the token's kind does not open a construct.
    pub fn closer(&self) -> Option<Token> {
        let kind = self.kind.closing()?;
        Some(Token {
            kind,
            tag: self.tag.clone(),
            nesting: Nesting::Close,
            markup: self.markup.clone(),
            info: String::new(),
            content: String::new(),
            attrs: Vec::new(),
            children: None,
            hidden: self.hidden,
        })
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if !self.tag.is_empty() {
            write!(f, " <{}>", self.tag)?;
        }
        if !self.markup.is_empty() {
            write!(f, " markup={:?}", self.markup)?;
        }
        if !self.info.is_empty() {
            write!(f, " info={:?}", self.info)?;
        }
        for (name, value) in &self.attrs {
            write!(f, " {name}={value:?}")?;
        }
        if !self.content.is_empty() {
            write!(f, " {:?}", self.content)?;
        }
        if self.hidden {
            f.write_str(" (hidden)")?;
        }
        Ok(())
    }
}

/// Renders a token stream one token per line, children indented below their parent.
pub fn dump(tokens: &[Token]) -> String {
    fn walk(out: &mut String, tokens: &[Token], depth: usize) {
        for token in tokens {
            out.push_str(&"  ".repeat(depth));
            out.push_str(&token.to_string());
            out.push('\n');
            if let Some(children) = &token.children {
                walk(out, children, depth + 1);
            }
        }
    }

    let mut out = String::new();
    walk(&mut out, tokens, 0);
    out
}
