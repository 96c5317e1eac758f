use std::{collections::BTreeSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::token::Token;

/// Placeholder emitted in place of a collapsed construct.
pub const COLLAPSED: &str = "[...]";

/// Configuration of one transformation.
///
/// `clip` and `collapse` hold identifiers matched against both a token's kind
/// name (`fence`, `blockquote_open`, ...) and its tag (`h1`, `a`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Policy {
    /// Constructs dropped entirely.
    pub clip: BTreeSet<String>,
    /// Constructs replaced by [`COLLAPSED`].
    pub collapse: BTreeSet<String>,
    /// Store the first `h1` as the `title` parameter instead of emitting it.
    pub extract_title: bool,
    /// Reduce links and images to their text.
    pub strip_links: bool,
    /// Separate blocks with single spaces instead of blank lines.
    pub compress: bool,
    /// Run the result through the HTML renderer.
    pub render: bool,
    /// Emit chip-annotated output.
    pub debug: bool,
    /// Base URL for relative link targets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_base: Option<String>,
    /// Base URL for relative image sources.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_base: Option<String>,
}

/// Override applied to a token before its default handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Special {
    Clip,
    Collapse,
}

impl Policy {
    /// Writeup body: first `h1` becomes the title, remaining `h1`s are dropped, output rendered to HTML.
    pub fn full() -> Self {
        Self {
            clip: identifiers(["h1"]),
            extract_title: true,
            render: true,
            ..Self::default()
        }
    }

    /// Listing blurb: top headings dropped, code collapsed, links flattened, one line.
    pub fn summary() -> Self {
        Self {
            clip: identifiers(["h1", "h2"]),
            collapse: identifiers(["fence"]),
            strip_links: true,
            compress: true,
            ..Self::default()
        }
    }

    pub fn with_clip<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.clip.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn with_collapse<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.collapse.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn with_link_base(mut self, base: impl Into<String>) -> Self {
        self.link_base = Some(base.into());
        self
    }

    pub fn with_image_base(mut self, base: impl Into<String>) -> Self {
        self.image_base = Some(base.into());
        self
    }

    /// Value of the separator chip.
    pub fn separator(&self) -> &'static str {
        if self.compress { " " } else { "\n" }
    }

    /// Clip wins over collapse when a token matches both.
    pub fn special(&self, token: &Token) -> Option<Special> {
        let hit = |set: &BTreeSet<String>| {
            set.contains(token.kind.name()) || (!token.tag.is_empty() && set.contains(&token.tag))
        };
        if hit(&self.clip) {
            Some(Special::Clip)
        } else if hit(&self.collapse) {
            Some(Special::Collapse)
        } else {
            None
        }
    }
}

fn identifiers<const N: usize>(ids: [&str; N]) -> BTreeSet<String> {
    ids.into_iter().map(String::from).collect()
}

/// Named policy presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Full,
    Summary,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown policy preset: {0}")]
pub struct UnknownPreset(pub String);

impl FromStr for Preset {
    type Err = UnknownPreset;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "full" => Ok(Preset::Full),
            "summary" => Ok(Preset::Summary),
            other => Err(UnknownPreset(other.to_string())),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Preset::Full => "full",
            Preset::Summary => "summary",
        })
    }
}

impl From<Preset> for Policy {
    fn from(preset: Preset) -> Self {
        match preset {
            Preset::Full => Policy::full(),
            Preset::Summary => Policy::summary(),
        }
    }
}
