//! Token builders shared by unit tests.

use crate::token::{Nesting, Token, TokenKind};

pub fn text(content: &str) -> Token {
    Token::new(TokenKind::Text, "", Nesting::SelfClosing).with_content(content)
}

pub fn inline(children: Vec<Token>) -> Token {
    Token::new(TokenKind::Inline, "", Nesting::SelfClosing).with_children(children)
}

pub fn open(kind: &str, tag: &str) -> Token {
    Token::new(kind, tag, Nesting::Open)
}

pub fn close(kind: &str, tag: &str) -> Token {
    Token::new(kind, tag, Nesting::Close)
}

pub fn paragraph(children: Vec<Token>) -> Vec<Token> {
    vec![
        open("paragraph_open", "p"),
        inline(children),
        close("paragraph_close", "p"),
    ]
}
