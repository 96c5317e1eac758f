//! Resolution of relative link targets and image sources against base URLs.
//!
//! Writeups live in repository subfolders and reference neighbouring files
//! (`solve.py`, `img/flag.png`). Once published those relative references
//! must point back at the hosting repository.

use url::Url;

use crate::{error::TransformError, policy::Policy};

#[derive(Debug, Clone, Default)]
pub struct LinkResolver {
    link_base: Option<Url>,
    image_base: Option<Url>,
}

impl LinkResolver {
    pub fn new(link_base: Option<&str>, image_base: Option<&str>) -> Result<Self, TransformError> {
        Ok(Self {
            link_base: link_base.map(parse_base).transpose()?,
            image_base: image_base.map(parse_base).transpose()?,
        })
    }

    pub fn for_policy(policy: &Policy) -> Result<Self, TransformError> {
        Self::new(policy.link_base.as_deref(), policy.image_base.as_deref())
    }

    pub fn link(&self, href: &str) -> String {
        resolve(self.link_base.as_ref(), href)
    }

    pub fn image(&self, src: &str) -> String {
        resolve(self.image_base.as_ref(), src)
    }
}

fn parse_base(base: &str) -> Result<Url, TransformError> {
    Url::parse(base).map_err(|source| TransformError::InvalidBaseUrl {
        base: base.to_string(),
        source,
    })
}

/// Absolute URLs (any scheme), fragments and empty targets are left alone.
fn resolve(base: Option<&Url>, target: &str) -> String {
    let Some(base) = base else {
        return target.to_string();
    };
    if target.is_empty() || target.starts_with('#') || Url::parse(target).is_ok() {
        return target.to_string();
    }
    base.join(target)
        .map(String::from)
        .unwrap_or_else(|_| target.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const BLOB: &str = "https://github.com/org/ctf-2024/blob/main/web/baby/";

    #[rstest]
    #[case("solve.py", "https://github.com/org/ctf-2024/blob/main/web/baby/solve.py")]
    #[case("../other/README.md", "https://github.com/org/ctf-2024/blob/main/web/other/README.md")]
    #[case("/org/elsewhere", "https://github.com/org/elsewhere")]
    #[case("https://ctftime.org/event/1", "https://ctftime.org/event/1")]
    #[case("mailto:team@example.com", "mailto:team@example.com")]
    #[case("#solution", "#solution")]
    #[case("", "")]
    fn links_resolve_against_base(#[case] href: &str, #[case] expected: &str) {
        let resolver = LinkResolver::new(Some(BLOB), None).unwrap();
        assert_eq!(resolver.link(href), expected);
    }

    #[test]
    fn without_base_targets_are_unchanged() {
        let resolver = LinkResolver::default();
        assert_eq!(resolver.link("solve.py"), "solve.py");
        assert_eq!(resolver.image("img/a.png"), "img/a.png");
    }

    #[test]
    fn images_use_their_own_base() {
        let resolver = LinkResolver::new(
            Some(BLOB),
            Some("https://github.com/org/ctf-2024/raw/main/web/baby/"),
        )
        .unwrap();
        assert_eq!(
            resolver.image("img/a.png"),
            "https://github.com/org/ctf-2024/raw/main/web/baby/img/a.png"
        );
    }

    #[test]
    fn invalid_base_is_reported() {
        let err = LinkResolver::new(Some("not a url"), None).unwrap_err();
        assert!(matches!(err, TransformError::InvalidBaseUrl { ref base, .. } if base == "not a url"));
    }
}
