//! Core editor types: selection, source tags, line/leaf views and change
//! notifications.

use std::fmt;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::attributes::Attributes;
use crate::delta::Delta;

/// Text selection as an index plus a length. Length 0 is a caret.
#[derive(Clone, Debug, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Selection {
    pub index: usize,
    pub length: usize,
}

impl Selection {
    pub fn new(index: usize, length: usize) -> Self {
        Self { index, length }
    }

    /// A collapsed selection at `index`.
    pub fn caret(index: usize) -> Self {
        Self { index, length: 0 }
    }

    pub fn is_collapsed(&self) -> bool {
        self.length == 0
    }

    pub fn end(&self) -> usize {
        self.index + self.length
    }
}

/// Pixel bounds of a range, relative to the editor root.
#[derive(Clone, Debug, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

impl Bounds {
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

/// Who caused a mutation.
///
/// `User` changes are recorded as undo steps and reach change subscribers.
/// `Silent` changes fold into the newest undo step and are how automatic
/// corrections avoid creating their own entry.
#[derive(Clone, Debug, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    User,
    Api,
    Silent,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::User => write!(f, "user"),
            Source::Api => write!(f, "api"),
            Source::Silent => write!(f, "silent"),
        }
    }
}

/// What a leaf holds.
#[derive(Clone, Debug, PartialEq)]
pub enum LeafKind {
    Text(String),
    Embed {
        kind: SmolStr,
        /// Block embeds render as their own visual row.
        block: bool,
        /// Selectable embeds can be focused with the arrow keys.
        selectable: bool,
    },
}

/// The smallest addressable inline node: a text run or an embed.
#[derive(Clone, Debug, PartialEq)]
pub struct LeafInfo {
    /// Absolute document offset of the leaf's first unit.
    pub start: usize,
    pub length: usize,
    pub kind: LeafKind,
    pub attributes: Attributes,
}

impl LeafInfo {
    pub fn end(&self) -> usize {
        self.start + self.length
    }

    pub fn is_embed(&self) -> bool {
        matches!(self.kind, LeafKind::Embed { .. })
    }

    pub fn is_selectable_embed(&self) -> bool {
        matches!(self.kind, LeafKind::Embed { selectable: true, .. })
    }

    pub fn is_block_embed(&self) -> bool {
        matches!(self.kind, LeafKind::Embed { block: true, .. })
    }

    pub fn text(&self) -> &str {
        match &self.kind {
            LeafKind::Text(s) => s,
            LeafKind::Embed { .. } => "",
        }
    }
}

/// A line of the document.
#[derive(Clone, Debug, PartialEq)]
pub struct LineInfo {
    /// Zero-based line number.
    pub index: usize,
    /// Absolute offset of the line's first unit.
    pub start: usize,
    /// Length including the trailing newline.
    pub length: usize,
    /// Line formats (the attributes of the line's newline).
    pub formats: Attributes,
    /// Inline leaves in order. The newline is not a leaf.
    pub leaves: Vec<LeafInfo>,
}

impl LineInfo {
    /// Offset of the line's newline.
    pub fn end(&self) -> usize {
        self.start + self.length - 1
    }

    /// Length without the trailing newline.
    pub fn content_length(&self) -> usize {
        self.length - 1
    }

    /// Visible text. Embeds contribute nothing.
    pub fn text(&self) -> String {
        self.leaves.iter().map(LeafInfo::text).collect()
    }

    /// Empty when the line holds nothing but its newline.
    pub fn is_empty(&self) -> bool {
        self.length <= 1
    }

    /// Document offsets of every embed on the line.
    pub fn embed_offsets(&self) -> Vec<usize> {
        self.leaves
            .iter()
            .filter(|leaf| leaf.is_embed())
            .map(|leaf| leaf.start)
            .collect()
    }
}

/// Change notification raised after every mutation.
#[derive(Clone, Debug, PartialEq)]
pub struct TextChange {
    pub delta: Delta,
    pub old_contents: Delta,
    pub source: Source,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection() {
        let sel = Selection::new(3, 4);
        assert_eq!(sel.end(), 7);
        assert!(!sel.is_collapsed());
        assert!(Selection::caret(5).is_collapsed());
    }

    #[test]
    fn test_source_serde() {
        assert_eq!(serde_json::to_string(&Source::Silent).unwrap(), r#""silent""#);
        assert_eq!(Source::User.to_string(), "user");
    }

    #[test]
    fn test_line_text_skips_embeds() {
        let line = LineInfo {
            index: 0,
            start: 0,
            length: 4,
            formats: Attributes::new(),
            leaves: vec![
                LeafInfo {
                    start: 0,
                    length: 1,
                    kind: LeafKind::Text("a".into()),
                    attributes: Attributes::new(),
                },
                LeafInfo {
                    start: 1,
                    length: 1,
                    kind: LeafKind::Embed {
                        kind: "emoji-embed".into(),
                        block: false,
                        selectable: false,
                    },
                    attributes: Attributes::new(),
                },
                LeafInfo {
                    start: 2,
                    length: 1,
                    kind: LeafKind::Text("b".into()),
                    attributes: Attributes::new(),
                },
            ],
        };
        assert_eq!(line.text(), "ab");
        assert_eq!(line.content_length(), 3);
        assert_eq!(line.embed_offsets(), vec![1]);
        assert_eq!(line.end(), 3);
    }
}
