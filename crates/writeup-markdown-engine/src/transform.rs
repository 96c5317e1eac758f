use log::debug;
use pulldown_cmark::{Parser, html};
use serde::Serialize;

use crate::{
    cursor::Params,
    dispatch::{Dispatcher, TITLE},
    error::TransformError,
    lexer,
    policy::Policy,
};

/// Result of [`transform`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transformed {
    /// Transformed Markdown, or HTML when the policy renders.
    pub text: String,
    pub params: Params,
}

impl Transformed {
    /// The extracted title, if a non-empty one was found.
    pub fn title(&self) -> Option<&str> {
        self.params
            .get(TITLE)
            .map(String::as_str)
            .filter(|title| !title.is_empty())
    }

    pub fn title_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.title().unwrap_or(fallback)
    }
}

/// Transforms Markdown `source` under `policy`.
///
/// Fails with [`TransformError::InvalidInput`] when the source holds no
/// Markdown at all, and with [`TransformError::InvalidBaseUrl`] when a base
/// URL in the policy does not parse.
pub fn transform(source: &str, policy: &Policy) -> Result<Transformed, TransformError> {
    let dispatcher = Dispatcher::new(policy)?;
    let tokens = lexer::tokenize(source);
    debug!(
        "transforming {} tokens (extract_title={}, compress={}, strip_links={}, render={})",
        tokens.len(),
        policy.extract_title,
        policy.compress,
        policy.strip_links,
        policy.render
    );

    let cursor = dispatcher.run(tokens)?;
    let text = if policy.debug {
        cursor.annotated()
    } else if policy.render {
        render_html(&cursor.text())
    } else {
        cursor.text()
    };
    let params = cursor.into_params();

    debug!("transformed into {} bytes, {} params", text.len(), params.len());
    Ok(Transformed { text, params })
}

/// Renders Markdown to HTML.
pub fn render_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, lexer::options());
    let mut output = String::new();
    html::push_html(&mut output, parser);
    output
}
