//! Emoji metadata lookup.
//!
//! Sequences are keyed by their unified codepoint string: uppercase hex
//! codepoints, at least four digits, joined with `-` (`1F44D-1F3FE`).
//! Skin-tone modifiers are stripped before lookup and reported separately,
//! so the table only holds base sequences.

use std::collections::HashMap;
use std::rc::Rc;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::diagnostics::{DiagnosticsSink, Metadata, TracingDiagnostics};
use crate::error::EmojiError;

/// Variation selector 16, the "render as emoji" suffix.
const VARIATION_SELECTOR: &str = "-FE0F";

/// Fitzpatrick modifiers for skin types 2 through 6.
const SKIN_TONES: [&str; 5] = ["1F3FB", "1F3FC", "1F3FD", "1F3FE", "1F3FF"];

/// Payload of an `emoji-embed` node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmojiEmbedValue {
    pub short_name: String,
    pub name: String,
    /// 1 when no modifier is present, 2-6 for the Fitzpatrick types.
    pub skin: u8,
    /// Unified string with the skin-tone modifier removed.
    pub base_unified: String,
    pub unified: String,
    pub skin_unified: Option<String>,
    /// Base string without variation selectors, when it differs.
    pub non_qualified: Option<String>,
    pub native: String,
}

impl EmojiEmbedValue {
    /// The embed payload as stored in the document.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }

    /// Stand-in for sequences missing from the table.
    pub fn fallback() -> Self {
        Self {
            short_name: "question".to_string(),
            name: "red question mark".to_string(),
            skin: 1,
            base_unified: "2753".to_string(),
            unified: "2753".to_string(),
            skin_unified: None,
            non_qualified: None,
            native: "\u{2753}".to_string(),
        }
    }
}

static TABLE: LazyLock<HashMap<String, &'static emojis::Emoji>> = LazyLock::new(|| {
    let mut table = HashMap::new();
    for emoji in emojis::iter() {
        let unified = unified_of(emoji.as_str());
        let non_qualified = unified.replace(VARIATION_SELECTOR, "");
        table.insert(unified, emoji);
        table.entry(non_qualified).or_insert(emoji);
    }
    table
});

/// Unified codepoint string of a native sequence.
pub fn unified_of(native: &str) -> String {
    native
        .chars()
        .map(|c| format!("{:04X}", c as u32))
        .collect::<Vec<_>>()
        .join("-")
}

/// Pad a two-digit keycap base: `23-FE0F-20E3` becomes `0023-FE0F-20E3`.
pub fn normalize_unified(unified: &str) -> String {
    let unified = unified.to_ascii_uppercase();
    let bytes = unified.as_bytes();
    let short_base = bytes.len() >= 7
        && bytes[..2].iter().all(u8::is_ascii_hexdigit)
        && unified[2..].starts_with(VARIATION_SELECTOR);
    if short_base {
        format!("00{unified}")
    } else {
        unified
    }
}

/// Split a unified string into its base, skin type and modifier codepoint.
pub fn split_skin_tone(unified: &str) -> (String, u8, Option<String>) {
    let mut base = unified.to_string();
    let mut skin = 1;
    let mut modifier = None;
    for (i, tone) in SKIN_TONES.iter().enumerate() {
        let suffix = format!("-{tone}");
        if base.contains(&suffix) {
            base = base.replace(&suffix, "");
            skin = i as u8 + 2;
            modifier = Some(tone.to_string());
        }
    }
    (base, skin, modifier)
}

fn native_of(unified: &str) -> String {
    unified
        .split('-')
        .filter_map(|hex| u32::from_str_radix(hex, 16).ok())
        .filter_map(char::from_u32)
        .collect()
}

fn short_name_of(emoji: &emojis::Emoji) -> String {
    match emoji.shortcode() {
        Some(code) => code.to_string(),
        None => emoji
            .name()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
            .collect(),
    }
}

/// Resolves emoji metadata, reporting misses to a diagnostics sink.
#[derive(Clone)]
pub struct EmojiResolver {
    diagnostics: Rc<dyn DiagnosticsSink>,
}

impl std::fmt::Debug for EmojiResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmojiResolver").finish_non_exhaustive()
    }
}

impl Default for EmojiResolver {
    fn default() -> Self {
        Self::new(Rc::new(TracingDiagnostics))
    }
}

impl EmojiResolver {
    pub fn new(diagnostics: Rc<dyn DiagnosticsSink>) -> Self {
        Self { diagnostics }
    }

    /// Look up a unified string without any fallback.
    pub fn lookup(&self, unified: &str) -> Result<EmojiEmbedValue, EmojiError> {
        let unified = normalize_unified(unified);
        let (base, skin, skin_unified) = split_skin_tone(&unified);
        let non_qualified = base.replace(VARIATION_SELECTOR, "");
        let emoji = TABLE
            .get(&base)
            .or_else(|| TABLE.get(&non_qualified))
            .ok_or_else(|| EmojiError::UnknownSequence {
                unified: unified.clone(),
            })?;
        Ok(EmojiEmbedValue {
            short_name: short_name_of(emoji),
            name: emoji.name().to_string(),
            skin,
            native: native_of(&unified),
            non_qualified: (non_qualified != base).then_some(non_qualified),
            base_unified: base,
            unified,
            skin_unified,
        })
    }

    /// Resolve a unified string. Never fails: unknown sequences are reported
    /// and resolve to [`EmojiEmbedValue::fallback`].
    pub fn resolve_by_unified(&self, unified: &str) -> EmojiEmbedValue {
        match self.lookup(unified) {
            Ok(value) => value,
            Err(error) => {
                warn!(%error, "unresolved emoji, using fallback");
                let mut metadata = Metadata::new();
                metadata.insert("unified", unified.to_string());
                metadata.insert("source", "emoji-resolver".to_string());
                self.diagnostics.notify(&error, &metadata);
                EmojiEmbedValue::fallback()
            }
        }
    }

    pub fn resolve_by_native(&self, native: &str) -> EmojiEmbedValue {
        self.resolve_by_unified(&unified_of(native))
    }

    /// Resolve a `:shortname:` body. Misses are not reported; an unknown
    /// shortname is just text.
    pub fn resolve_shortcode(&self, name: &str) -> Option<EmojiEmbedValue> {
        let emoji = emojis::get_by_shortcode(name)?;
        self.lookup(&unified_of(emoji.as_str())).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::RecordingDiagnostics;

    #[test]
    fn test_normalize_unified() {
        assert_eq!(normalize_unified("23-FE0F-20E3"), "0023-FE0F-20E3");
        assert_eq!(normalize_unified("23-FE0F-20E3").len(), 14);
        assert_eq!(normalize_unified("0023-FE0F-20E3"), "0023-FE0F-20E3");
        assert_eq!(normalize_unified("2764-FE0F"), "2764-FE0F");
        assert_eq!(normalize_unified("1f600"), "1F600");
    }

    #[test]
    fn test_family_has_no_skin() {
        let resolver = EmojiResolver::default();
        let family = "1F468-200D-1F469-200D-1F467-200D-1F466";
        let value = resolver.resolve_by_unified(family);
        assert_eq!(value.skin, 1);
        assert_eq!(value.base_unified, family);
        assert_eq!(value.skin_unified, None);
        assert_eq!(value.native, "👨‍👩‍👧‍👦");
    }

    #[test]
    fn test_skin_tone_suffix() {
        let resolver = EmojiResolver::default();
        let value = resolver.resolve_by_unified("1F44D-1F3FE");
        assert_eq!(value.skin, 5);
        assert_eq!(value.base_unified, "1F44D");
        assert_eq!(value.unified, "1F44D-1F3FE");
        assert_eq!(value.skin_unified.as_deref(), Some("1F3FE"));
        assert_eq!(value.name, "thumbs up");
        assert_eq!(value.native, "👍🏾");
    }

    #[test]
    fn test_resolve_by_native() {
        let resolver = EmojiResolver::default();
        let value = resolver.resolve_by_native("😉");
        assert_eq!(value.unified, "1F609");
        assert_eq!(value.short_name, "wink");

        let heart = resolver.resolve_by_native("❤️");
        assert_eq!(heart.unified, "2764-FE0F");
        assert_eq!(heart.non_qualified.as_deref(), Some("2764"));
    }

    #[test]
    fn test_non_qualified_lookup() {
        let resolver = EmojiResolver::default();
        let value = resolver.resolve_by_unified("2764");
        assert_eq!(value.name, "red heart");
    }

    #[test]
    fn test_unknown_sequence_falls_back_and_reports() {
        let diagnostics = RecordingDiagnostics::default();
        let resolver = EmojiResolver::new(Rc::new(diagnostics.clone()));
        let value = resolver.resolve_by_unified("ABCDE");
        assert_eq!(value, EmojiEmbedValue::fallback());

        let reports = diagnostics.reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(
            reports[0].0,
            EmojiError::UnknownSequence {
                unified: "ABCDE".into()
            }
        );
        assert_eq!(reports[0].1.get("unified").map(String::as_str), Some("ABCDE"));
    }

    #[test]
    fn test_shortcode() {
        let resolver = EmojiResolver::default();
        let wink = resolver.resolve_shortcode("wink").unwrap();
        assert_eq!(wink.native, "😉");
        assert!(resolver.resolve_shortcode("not_an_emoji_name").is_none());
    }

    #[test]
    fn test_value_wire_format() {
        let value = EmojiEmbedValue::fallback();
        let json = value.to_json();
        assert_eq!(json["shortName"], "question");
        assert_eq!(json["baseUnified"], "2753");
        let back: EmojiEmbedValue = serde_json::from_value(json).unwrap();
        assert_eq!(back, value);
    }
}
