#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransformError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Internal invariant violated: {0}")]
    InternalInvariant(&'static str),
    #[error("Invalid base URL {base:?}: {source}")]
    InvalidBaseUrl {
        base: String,
        source: url::ParseError,
    },
}
