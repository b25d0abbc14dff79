//! Editor feature configuration.
//!
//! Decides which bindings the keyboard registers. Every field defaults, so
//! `{}` is a full-featured document editor.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::error::ConfigError;

/// Markdown shortcuts, one flag per feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct MarkdownConfig {
    pub header: bool,
    pub bold: bool,
    pub code: bool,
    pub divider: bool,
    pub strike: bool,
    pub italic: bool,
    pub link: bool,
    pub code_block: bool,
    pub list: bool,
    pub underline: bool,
    pub blockquote: bool,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self::all(true)
    }
}

impl MarkdownConfig {
    /// Every feature set to `enabled`.
    pub fn all(enabled: bool) -> Self {
        Self {
            header: enabled,
            bold: enabled,
            code: enabled,
            divider: enabled,
            strike: enabled,
            italic: enabled,
            link: enabled,
            code_block: enabled,
            list: enabled,
            underline: enabled,
            blockquote: enabled,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct EmojiConfig {
    /// Open the emoji search on `:`.
    pub picker: bool,
    /// Convert `:shortname:` into an emoji embed.
    pub shortcode: bool,
}

impl Default for EmojiConfig {
    fn default() -> Self {
        Self {
            picker: true,
            shortcode: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct EditorConfig {
    pub markdown: MarkdownConfig,
    pub emoji: EmojiConfig,
    pub mentions: bool,
    /// Lightweight comment box: only caller bindings and mentions.
    pub comment_mode: bool,
    /// Rows the mention list shows; arrow navigation stays inside it.
    pub mentions_window: usize,
    pub editor_id: SmolStr,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            markdown: MarkdownConfig::default(),
            emoji: EmojiConfig::default(),
            mentions: true,
            comment_mode: false,
            mentions_window: 3,
            editor_id: SmolStr::new_static("editor"),
        }
    }
}

impl EditorConfig {
    pub fn from_json(src: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(src).map_err(|err| ConfigError::from_json(src, err))
    }

    pub fn comment(mentions: bool) -> Self {
        Self {
            comment_mode: true,
            mentions,
            ..Self::default()
        }
    }
}
