//! Atomic output units and the spacing rule that joins them.

/// Prefixes that attach a text chip to the chip before it.
const ATTACHES_LEFT: &[&str] = &[" ", ". ", ",", ";", "! ", "? ", ")", "]", "}"];

/// Characters after which the next text chip attaches directly.
const ATTACHES_RIGHT: &[char] = &['(', '[', '{', '"', '\''];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chip {
    /// Trimmed literal text.
    Text(String),
    /// Block separator; its value comes from the policy.
    Separator(String),
    Break,
    Space,
}

impl Chip {
    pub fn value(&self) -> &str {
        match self {
            Chip::Text(text) | Chip::Separator(text) => text,
            Chip::Break => "\n",
            Chip::Space => " ",
        }
    }

    /// Bracketed form used by debug output.
    pub fn annotated(&self) -> String {
        match self {
            Chip::Text(text) => format!("[{text}]"),
            Chip::Separator(_) => "[sep]".to_string(),
            Chip::Break => "[br]\n".to_string(),
            Chip::Space => "[ ]".to_string(),
        }
    }
}

pub fn attaches_left(text: &str) -> bool {
    ATTACHES_LEFT.iter().any(|prefix| text.starts_with(prefix))
}

pub fn attaches_right(text: &str) -> bool {
    text.ends_with(ATTACHES_RIGHT)
}

/// Whether a `Space` chip must precede `next` when appended after `previous`.
pub fn needs_space(previous: Option<&Chip>, next: &str) -> bool {
    match previous {
        Some(Chip::Text(prev)) => !attaches_left(next) && !attaches_right(prev),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn text(s: &str) -> Chip {
        Chip::Text(s.to_string())
    }

    #[rstest]
    #[case("world", true)]
    #[case(", world", false)]
    #[case("; then", false)]
    #[case(". Next", false)]
    #[case(".", true)]
    #[case("?", true)]
    #[case("! Next", false)]
    #[case(")", false)]
    #[case("]", false)]
    #[case("}", false)]
    #[case(".5 percent", true)]
    #[case("!important", true)]
    fn left_attachment(#[case] next: &str, #[case] spaced: bool) {
        assert_eq!(needs_space(Some(&text("Hello")), next), spaced);
    }

    #[rstest]
    #[case("(")]
    #[case("see [")]
    #[case("{")]
    #[case("say \"")]
    #[case("'")]
    fn right_attachment(#[case] prev: &str) {
        assert!(!needs_space(Some(&text(prev)), "word"));
    }

    #[rstest]
    #[case(None)]
    #[case(Some(Chip::Break))]
    #[case(Some(Chip::Space))]
    #[case(Some(Chip::Separator("\n".to_string())))]
    fn no_space_after_non_text(#[case] previous: Option<Chip>) {
        assert!(!needs_space(previous.as_ref(), "word"));
    }

    #[test]
    fn values_and_annotations() {
        assert_eq!(Chip::Break.value(), "\n");
        assert_eq!(Chip::Space.value(), " ");
        assert_eq!(Chip::Separator(" ".to_string()).value(), " ");
        assert_eq!(text("x").annotated(), "[x]");
        assert_eq!(Chip::Separator("\n".to_string()).annotated(), "[sep]");
    }
}
