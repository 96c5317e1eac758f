//! # Token Adapter
//!
//! Turns `pulldown-cmark` events into the flat [`Token`] stream the
//! transformer walks.
//!
//! - Block constructs become `*_open` / `*_close` pairs (`paragraph_open`,
//!   `heading_open`, `blockquote_open`, `bullet_list_open`, ...)
//! - Consecutive span-level events are gathered into one `inline` token whose
//!   children carry text, code spans, emphasis and link pairs, images, breaks
//! - Adjacent text events are merged into a single `text` child
//! - Inline content directly inside a tight list item gets a hidden paragraph
//! - Fenced/indented code and HTML blocks are single tokens holding their raw content

use std::ops::Range;

use log::trace;
use pulldown_cmark::{CodeBlockKind, Event, LinkType, Options, Parser, Tag, TagEnd};

use crate::token::{Nesting, Token, TokenKind};

/// Parser extensions used for both tokenizing and the optional HTML render pass.
pub fn options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
}

/// Tokenizes Markdown source into the flat token stream.
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(source);
    for (event, range) in Parser::new_ext(source, options()).into_offset_iter() {
        lexer.event(event, range);
    }
    lexer.finish()
}

/// Span-level children being gathered into one `inline` token.
struct InlineRun {
    children: Vec<Token>,
    span: Range<usize>,
    hidden_paragraph: bool,
}

struct Lexer<'a> {
    source: &'a str,
    out: Vec<Token>,
    /// Open block tokens awaiting their close.
    blocks: Vec<Token>,
    /// Open span tokens (emphasis, links) awaiting their close.
    spans: Vec<Token>,
    inline: Option<InlineRun>,
    /// Code or HTML block whose content is still arriving.
    raw: Option<Token>,
    /// Images whose alt text is still arriving (innermost last).
    images: Vec<Token>,
    in_table_head: bool,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            out: Vec::new(),
            blocks: Vec::new(),
            spans: Vec::new(),
            inline: None,
            raw: None,
            images: Vec::new(),
            in_table_head: false,
        }
    }

    fn finish(mut self) -> Vec<Token> {
        self.flush_inline();
        if let Some(raw) = self.raw.take() {
            self.out.push(raw);
        }
        while !self.blocks.is_empty() {
            self.close_block();
        }
        self.out
    }

    fn slice(&self, range: &Range<usize>) -> &'a str {
        self.source.get(range.clone()).unwrap_or("")
    }

    fn event(&mut self, event: Event<'_>, range: Range<usize>) {
        match event {
            Event::Start(tag) => self.start(tag, range),
            Event::End(tag) => self.end(tag, range),
            Event::Text(text) => match self.raw.as_mut() {
                Some(raw) => raw.content.push_str(&text),
                None => self.child(
                    Token::new(TokenKind::Text, "", Nesting::SelfClosing).with_content(text.as_ref()),
                    range,
                ),
            },
            Event::Code(code) => {
                let markup = leading_run(self.slice(&range), '`').unwrap_or_else(|| "`".to_string());
                self.child(
                    Token::new(TokenKind::CodeInline, "code", Nesting::SelfClosing)
                        .with_markup(markup)
                        .with_content(code.as_ref()),
                    range,
                );
            }
            Event::Html(html) => match self.raw.as_mut() {
                Some(raw) => raw.content.push_str(&html),
                None => {
                    self.flush_inline();
                    self.out.push(
                        Token::new("html_block", "", Nesting::SelfClosing).with_content(html.as_ref()),
                    );
                }
            },
            Event::InlineHtml(html) => self.child(
                Token::new("html_inline", "", Nesting::SelfClosing).with_content(html.as_ref()),
                range,
            ),
            Event::SoftBreak => self.child(
                Token::new(TokenKind::Softbreak, "br", Nesting::SelfClosing),
                range,
            ),
            Event::HardBreak => self.child(
                Token::new(TokenKind::Hardbreak, "br", Nesting::SelfClosing),
                range,
            ),
            Event::Rule => {
                self.flush_inline();
                let markup = self.slice(&range).trim().to_string();
                self.out
                    .push(Token::new("hr", "hr", Nesting::SelfClosing).with_markup(markup));
            }
            Event::TaskListMarker(checked) => self.child(
                Token::new("task_marker", "input", Nesting::SelfClosing)
                    .with_content(if checked { "[x]" } else { "[ ]" }),
                range,
            ),
            Event::FootnoteReference(label) => self.child(
                Token::new("footnote_ref", "sup", Nesting::SelfClosing).with_content(label.as_ref()),
                range,
            ),
            Event::InlineMath(math) | Event::DisplayMath(math) => self.child(
                Token::new("math_inline", "math", Nesting::SelfClosing).with_content(math.as_ref()),
                range,
            ),
            #[allow(unreachable_patterns)]
            other => trace!("ignoring event {other:?}"),
        }
    }

    fn start(&mut self, tag: Tag<'_>, range: Range<usize>) {
        let source = self.slice(&range);
        match tag {
            Tag::Paragraph => {
                self.open_block(Token::new(TokenKind::ParagraphOpen, "p", Nesting::Open))
            }
            Tag::Heading { level, .. } => {
                let level = level as usize;
                self.open_block(
                    Token::new(TokenKind::HeadingOpen, format!("h{level}"), Nesting::Open)
                        .with_markup("#".repeat(level)),
                );
            }
            Tag::BlockQuote(_) => self.open_block(
                Token::new("blockquote_open", "blockquote", Nesting::Open).with_markup(">"),
            ),
            Tag::CodeBlock(kind) => {
                self.flush_inline();
                self.raw = Some(match kind {
                    CodeBlockKind::Fenced(info) => {
                        Token::new(TokenKind::Fence, "code", Nesting::SelfClosing)
                            .with_markup(fence_markup(source))
                            .with_info(info.as_ref())
                    }
                    CodeBlockKind::Indented => {
                        Token::new(TokenKind::CodeBlock, "code", Nesting::SelfClosing)
                    }
                });
            }
            Tag::HtmlBlock => {
                self.flush_inline();
                self.raw = Some(Token::new("html_block", "", Nesting::SelfClosing));
            }
            Tag::MetadataBlock(_) => {
                self.flush_inline();
                self.raw = Some(Token::new("front_matter", "", Nesting::SelfClosing));
            }
            Tag::List(None) => self.open_block(
                Token::new("bullet_list_open", "ul", Nesting::Open).with_markup(list_marker(source)),
            ),
            Tag::List(Some(start)) => {
                let mut token = Token::new("ordered_list_open", "ol", Nesting::Open)
                    .with_markup(list_marker(source));
                if start != 1 {
                    token.set_attr("start", start.to_string());
                }
                self.open_block(token);
            }
            Tag::Item => self.open_block(
                Token::new("list_item_open", "li", Nesting::Open).with_markup(list_marker(source)),
            ),
            Tag::Table(_) => self.open_block(Token::new("table_open", "table", Nesting::Open)),
            Tag::TableHead => {
                self.in_table_head = true;
                self.open_block(Token::new("thead_open", "thead", Nesting::Open));
            }
            Tag::TableRow => self.open_block(Token::new("tr_open", "tr", Nesting::Open)),
            Tag::TableCell => {
                let token = if self.in_table_head {
                    Token::new("th_open", "th", Nesting::Open)
                } else {
                    Token::new("td_open", "td", Nesting::Open)
                };
                self.open_block(token);
            }
            Tag::FootnoteDefinition(label) => self.open_block(
                Token::new("footnote_open", "", Nesting::Open).with_info(label.as_ref()),
            ),
            Tag::Emphasis => self.open_span(
                Token::new("em_open", "em", Nesting::Open).with_markup(prefix(source, 1)),
                range,
            ),
            Tag::Strong => self.open_span(
                Token::new("strong_open", "strong", Nesting::Open).with_markup(prefix(source, 2)),
                range,
            ),
            Tag::Strikethrough => self.open_span(
                Token::new("s_open", "s", Nesting::Open).with_markup("~~"),
                range,
            ),
            Tag::Link {
                link_type,
                dest_url,
                title,
                ..
            } => {
                let mut token = Token::new(TokenKind::LinkOpen, "a", Nesting::Open)
                    .with_attr("href", dest_url.as_ref());
                if !title.is_empty() {
                    token.set_attr("title", title.as_ref());
                }
                if matches!(link_type, LinkType::Autolink | LinkType::Email) {
                    token.markup = "autolink".to_string();
                }
                self.open_span(token, range);
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                self.ensure_inline(&range);
                let mut token = Token::new(TokenKind::Image, "img", Nesting::SelfClosing)
                    .with_attr("src", dest_url.as_ref())
                    .with_attr("alt", "")
                    .with_children(Vec::new());
                if !title.is_empty() {
                    token.set_attr("title", title.as_ref());
                }
                self.images.push(token);
            }
            #[allow(unreachable_patterns)]
            other => {
                trace!("treating {other:?} as a generic container");
                self.open_block(Token::new("container_open", "", Nesting::Open));
            }
        }
    }

    fn end(&mut self, tag: TagEnd, range: Range<usize>) {
        match tag {
            TagEnd::CodeBlock | TagEnd::HtmlBlock | TagEnd::MetadataBlock(_) => {
                if let Some(raw) = self.raw.take() {
                    self.out.push(raw);
                }
            }
            TagEnd::Image => {
                if let Some(mut image) = self.images.pop() {
                    let alt = image.content.clone();
                    image.set_attr("alt", alt);
                    self.child(image, range);
                }
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough | TagEnd::Link => {
                if let Some(close) = self.spans.pop().and_then(|open| open.closer()) {
                    self.child(close, range);
                }
            }
            TagEnd::TableHead => {
                self.in_table_head = false;
                self.close_block();
            }
            _ => self.close_block(),
        }
    }

    fn open_block(&mut self, token: Token) {
        self.flush_inline();
        self.blocks.push(token.clone());
        self.out.push(token);
    }

    fn close_block(&mut self) {
        self.flush_inline();
        if let Some(close) = self.blocks.pop().and_then(|open| open.closer()) {
            self.out.push(close);
        }
    }

    fn open_span(&mut self, token: Token, range: Range<usize>) {
        self.spans.push(token.clone());
        self.child(token, range);
    }

    /// Starts an inline run if none is open, synthesizing a hidden paragraph
    /// when the content sits directly inside a list item.
    fn ensure_inline(&mut self, range: &Range<usize>) {
        match self.inline.as_mut() {
            Some(run) => run.span.end = run.span.end.max(range.end),
            None => {
                let hidden_paragraph = self
                    .blocks
                    .last()
                    .is_some_and(|open| open.kind.name() == "list_item_open");
                if hidden_paragraph {
                    self.out.push(
                        Token::new(TokenKind::ParagraphOpen, "p", Nesting::Open).hidden(),
                    );
                }
                self.inline = Some(InlineRun {
                    children: Vec::new(),
                    span: range.clone(),
                    hidden_paragraph,
                });
            }
        }
    }

    fn child(&mut self, token: Token, range: Range<usize>) {
        self.ensure_inline(&range);
        if let Some(image) = self.images.last_mut() {
            if matches!(token.kind, TokenKind::Text | TokenKind::CodeInline) {
                image.content.push_str(&token.content);
            }
            push_child(image.children.get_or_insert_with(Vec::new), token);
        } else if let Some(run) = self.inline.as_mut() {
            push_child(&mut run.children, token);
        }
    }

    fn flush_inline(&mut self) {
        let Some(run) = self.inline.take() else {
            return;
        };
        // Unclosed spans cannot outlive their inline run.
        self.spans.clear();
        self.images.clear();

        let content = self.slice(&run.span).trim().to_string();
        self.out.push(
            Token::new(TokenKind::Inline, "", Nesting::SelfClosing)
                .with_content(content)
                .with_children(run.children),
        );
        if run.hidden_paragraph {
            self.out
                .push(Token::new(TokenKind::ParagraphClose, "p", Nesting::Close).hidden());
        }
    }
}

/// Appends a child, merging it into the previous one when both are text.
fn push_child(children: &mut Vec<Token>, token: Token) {
    if token.kind == TokenKind::Text
        && let Some(last) = children.last_mut()
        && last.kind == TokenKind::Text
    {
        last.content.push_str(&token.content);
        return;
    }
    children.push(token);
}

fn leading_run(source: &str, marker: char) -> Option<String> {
    let run: String = source.chars().take_while(|&c| c == marker).collect();
    (!run.is_empty()).then_some(run)
}

fn prefix(source: &str, len: usize) -> String {
    source.chars().take(len).collect()
}

fn fence_markup(source: &str) -> String {
    let source = source.trim_start();
    ['`', '~']
        .into_iter()
        .find_map(|marker| leading_run(source, marker))
        .unwrap_or_else(|| "```".to_string())
}

/// Bullet character, or the delimiter after an ordered list number.
fn list_marker(source: &str) -> String {
    let source = source.trim_start();
    let after_digits = source.trim_start_matches(|c: char| c.is_ascii_digit());
    after_digits
        .chars()
        .next()
        .map(String::from)
        .unwrap_or_default()
}
