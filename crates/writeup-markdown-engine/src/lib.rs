//! # writeup-markdown-engine
//!
//! Policy-driven rewriting of Markdown writeups.
//!
//! Source text is tokenized into a flat open/close token stream
//! ([`lexer`]), walked once by the [`dispatch`] loop, and reassembled from
//! whitespace-aware output [`chip`]s. A [`Policy`] decides which constructs
//! are clipped, collapsed to a placeholder or kept, and whether the first
//! top-level heading is lifted out as the `title` parameter.
//!
//! Two presets cover the site pipeline: [`Policy::full`] for writeup bodies
//! (rendered to HTML) and [`Policy::summary`] for one-line listing blurbs
//! (see [`summary()`]).

pub mod block;
pub mod chip;
pub mod cursor;
pub mod dispatch;
pub mod error;
pub mod lexer;
pub mod links;
pub mod policy;
pub mod summary;
pub mod token;
pub mod transform;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use cursor::Params;
pub use dispatch::TITLE;
pub use error::TransformError;
pub use lexer::tokenize;
pub use policy::{COLLAPSED, Policy, Preset, Special, UnknownPreset};
pub use summary::{DEFAULT_SUMMARY_LENGTH, Summary, summarize, summary, truncate};
pub use token::{Nesting, Token, TokenKind};
pub use transform::{Transformed, render_html, transform};
