//! Match engine: decides whether a pattern ends exactly at the caret.
//!
//! Patterns run over the visible text of the caret's line, where embeds
//! contribute nothing. Forward patterns see the text from line start to the
//! caret. Backward patterns see that text reversed, so they are anchored at
//! the caret and stop at the nearest closing sigil rather than the first one
//! on the line. Visible positions are mapped back to document offsets by
//! counting the embeds that precede them.

use std::collections::BTreeMap;

use loom_editor_core::text::{byte_to_utf16, reversed, utf16_len, utf16_slice};
use loom_editor_core::{LeafKind, LineInfo};
use regex::Regex;
use tracing::trace;

/// Which way a pattern reads the text before the caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

#[derive(Debug, Clone, Copy)]
pub struct Pattern {
    pub regex: &'static Regex,
    pub direction: Direction,
}

impl Pattern {
    pub fn forward(regex: &'static Regex) -> Self {
        Self {
            regex,
            direction: Direction::Forward,
        }
    }

    pub fn backward(regex: &'static Regex) -> Self {
        Self {
            regex,
            direction: Direction::Backward,
        }
    }
}

/// A successful match, in document order and document offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    /// Absolute offset of the first matched unit.
    pub start: usize,
    /// Units covered, embeds included.
    pub length: usize,
    /// Capture groups by index; 0 is the whole match.
    pub captured: Vec<Option<String>>,
    named: BTreeMap<String, String>,
}

impl MatchResult {
    pub fn end(&self) -> usize {
        self.start + self.length
    }

    pub fn group(&self, index: usize) -> Option<&str> {
        self.captured.get(index)?.as_deref()
    }

    pub fn name(&self, name: &str) -> Option<&str> {
        self.named.get(name).map(String::as_str)
    }
}

/// Visible text of a line up to `caret`, with the visible position of each
/// embed before it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VisiblePrefix {
    pub text: String,
    pub embeds: Vec<usize>,
}

impl VisiblePrefix {
    pub fn of(line: &LineInfo, caret: usize) -> Self {
        let mut prefix = Self::default();
        let mut visible = 0;
        for leaf in line.leaves.iter().filter(|leaf| leaf.start < caret) {
            match &leaf.kind {
                LeafKind::Embed { .. } => prefix.embeds.push(visible),
                LeafKind::Text(text) => {
                    let end = caret.min(leaf.end()) - leaf.start;
                    let part = utf16_slice(text, 0, end);
                    visible += utf16_len(part);
                    prefix.text.push_str(part);
                }
            }
        }
        prefix
    }

    pub fn len(&self) -> usize {
        utf16_len(&self.text)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Visible text of a line from `from` to the line end.
pub fn visible_suffix(line: &LineInfo, from: usize) -> String {
    line.leaves
        .iter()
        .filter(|leaf| leaf.end() > from)
        .map(|leaf| match &leaf.kind {
            LeafKind::Text(text) => {
                utf16_slice(text, from.saturating_sub(leaf.start), leaf.length)
            }
            LeafKind::Embed { .. } => "",
        })
        .collect()
}

/// Try `pattern` against the line text ending at `caret`.
pub fn try_match(line: &LineInfo, caret: usize, pattern: Pattern) -> Option<MatchResult> {
    let prefix = VisiblePrefix::of(line, caret);
    let visible_len = prefix.len();

    let (haystack, restore): (String, fn(&str) -> String) = match pattern.direction {
        Direction::Forward => (prefix.text.clone(), str::to_string),
        Direction::Backward => (reversed(&prefix.text), reversed),
    };
    let caps = pattern.regex.captures(&haystack)?;
    let span = caps.name("span").or_else(|| caps.get(0))?;

    let lo = byte_to_utf16(&haystack, span.start());
    let hi = byte_to_utf16(&haystack, span.end());
    let (start, end) = match pattern.direction {
        Direction::Forward => (lo, hi),
        Direction::Backward => (visible_len - hi, visible_len - lo),
    };

    // An embed inside the span, or between the span and the caret, means
    // the sigils are not contiguous in the document.
    if let Some(p) = prefix
        .embeds
        .iter()
        .find(|&&p| (p > start && p < end) || (p == end && end == visible_len))
    {
        trace!(embed = *p, start, end, "match crosses an embed");
        return None;
    }

    let skew = prefix.embeds.iter().filter(|&&p| p <= start).count();
    let captured = caps
        .iter()
        .map(|group| group.map(|m| restore(m.as_str())))
        .collect();
    let named = pattern
        .regex
        .capture_names()
        .flatten()
        .filter_map(|name| Some((name.to_string(), restore(caps.name(name)?.as_str()))))
        .collect();

    Some(MatchResult {
        start: line.start + start + skew,
        length: end - start,
        captured,
        named,
    })
}
