//! Language profiles for slug transliteration.

use serde::{Deserialize, Serialize};

/// Transliteration profile applied before ASCII folding.
///
/// The default profile performs naive diacritic stripping via
/// `deunicode` (`ü` -> `u`). Named profiles layer a language-specific
/// substitution table on top (`ü` -> `ue` for German).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageProfile {
    /// Naive diacritic stripping.
    #[default]
    Default,
    /// German transliteration: ä/ö/ü/ß -> ae/oe/ue/ss.
    #[serde(rename = "de")]
    German,
}

impl LanguageProfile {
    /// Language-specific replacement for a lowercase character, if any.
    ///
    /// Characters without an entry fall through to `deunicode` folding.
    pub const fn map_char(self, c: char) -> Option<&'static str> {
        match self {
            Self::Default => None,
            Self::German => match c {
                'ä' => Some("ae"),
                'ö' => Some("oe"),
                'ü' => Some("ue"),
                'ß' => Some("ss"),
                _ => None,
            },
        }
    }
}
