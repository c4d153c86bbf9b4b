//! Manifest URL patterns, in priority order.

use regex::Regex;
use std::fmt;

// helper.
macro_rules! regex {
    ($re:literal $(,)?) => {{
        static RE: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
        RE.get_or_init(|| regex::Regex::new($re).unwrap())
    }};
}

/// One way a page can reference its `.m3u8` manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestPattern {
    /// Player configuration: `file: "https://.../x.m3u8?..."`
    PlayerConfig,
    /// Markup media source: `<source src='.../x.m3u8'>`
    SourceTag,
    /// Any quoted absolute `https://` URL ending in `.m3u8`
    QuotedHttps,
}

/// Order in which patterns are tried. The first one that matches wins.
pub const PATTERN_ORDER: [ManifestPattern; 3] = [
    ManifestPattern::PlayerConfig,
    ManifestPattern::SourceTag,
    ManifestPattern::QuotedHttps,
];

impl ManifestPattern {
    fn regex(self) -> &'static Regex {
        match self {
            ManifestPattern::PlayerConfig => regex!(r#"file\s*:\s*"([^"]+\.m3u8[^"]*)""#),
            ManifestPattern::SourceTag => {
                regex!(r#"source\s+src\s*=\s*["']([^"']+\.m3u8[^"']*)["']"#)
            }
            ManifestPattern::QuotedHttps => {
                regex!(r#"["'](https://[^"'\s]+\.m3u8(?:[?#][^"'\s]*)?)["']"#)
            }
        }
    }

    /// Return the first URL this pattern captures in `body`.
    pub fn find(self, body: &str) -> Option<&str> {
        self.regex()
            .captures(body)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    pub fn name(self) -> &'static str {
        match self {
            ManifestPattern::PlayerConfig => "player-config",
            ManifestPattern::SourceTag => "source-tag",
            ManifestPattern::QuotedHttps => "quoted-https",
        }
    }
}

impl fmt::Display for ManifestPattern {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Try every pattern in [`PATTERN_ORDER`] and return the first hit.
pub fn first_match(body: &str) -> Option<(ManifestPattern, &str)> {
    PATTERN_ORDER
        .iter()
        .find_map(|pattern| pattern.find(body).map(|url| (*pattern, url)))
}
