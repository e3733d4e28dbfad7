//! Text normalization - arbitrary text to URL-safe tokens.
//!
//! Pure functions, no side effects. The pipeline:
//! lowercase -> language-profile substitution -> ASCII folding
//! (`deunicode`) -> collapse non-alphanumeric runs to one separator ->
//! trim separators.
//!
//! A value consisting solely of `/` is a sentinel and passes through
//! unchanged, letting callers force a literal path segment without
//! normalization.

mod profile;

pub use profile::LanguageProfile;

use deunicode::deunicode_char;

/// Sentinel meaning "use this value verbatim" (or, for path segments,
/// "no segment at all").
pub const SENTINEL: &str = "/";

/// Normalize text into a URL-safe token.
///
/// # Examples
///
/// ```
/// use urlable::normalize::{normalize, LanguageProfile};
///
/// assert_eq!(normalize("Test name", '-', LanguageProfile::Default), "test-name");
/// assert_eq!(normalize("Güte nacht", '-', LanguageProfile::Default), "gute-nacht");
/// assert_eq!(normalize("Güte nacht", '-', LanguageProfile::German), "guete-nacht");
/// ```
pub fn normalize(text: &str, separator: char, profile: LanguageProfile) -> String {
    if text == SENTINEL {
        return text.to_owned();
    }

    let lowered = text.to_lowercase();

    // Transliterate: profile table first, deunicode for the rest.
    let mut folded = String::with_capacity(lowered.len());
    for c in lowered.chars() {
        match profile.map_char(c) {
            Some(replacement) => folded.push_str(replacement),
            None => folded.push_str(deunicode_char(c).unwrap_or("")),
        }
    }

    // Collapse every non-alphanumeric run into a single separator.
    let mut result = String::with_capacity(folded.len());
    let mut pending_separator = false;
    for c in folded.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_separator && !result.is_empty() {
                result.push(separator);
            }
            pending_separator = false;
            result.push(c);
        } else {
            pending_separator = true;
        }
    }

    result
}
