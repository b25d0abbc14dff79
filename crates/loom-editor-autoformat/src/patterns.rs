//! The pattern catalog: every markdown sigil sequence the keyboard
//! recognizes.
//!
//! Block triggers are matched forward against the line text before the
//! caret. Inline styles, links and emoji shortnames are matched backward:
//! their patterns are written against the *reversed* text before the caret,
//! closing sigil first, and are anchored at the caret. Sigils read the same
//! in both directions, so a reversed closing sigil is spelled like the
//! opening one.

use std::sync::LazyLock;

use regex::Regex;
use smol_str::SmolStr;

use crate::config::MarkdownConfig;

/// An inline format reachable by typing sigils.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InlineFormat {
    Bold,
    Italic,
    Underline,
    Strike,
    Code,
}

impl InlineFormat {
    pub const ALL: [InlineFormat; 5] = [
        InlineFormat::Bold,
        InlineFormat::Italic,
        InlineFormat::Underline,
        InlineFormat::Strike,
        InlineFormat::Code,
    ];

    pub fn sigil(self) -> &'static str {
        match self {
            InlineFormat::Bold => "**",
            InlineFormat::Italic => "_",
            InlineFormat::Underline => "__",
            InlineFormat::Strike => "~~",
            InlineFormat::Code => "`",
        }
    }

    /// The attribute name applied to the text.
    pub fn attribute(self) -> &'static str {
        match self {
            InlineFormat::Bold => "bold",
            InlineFormat::Italic => "italic",
            InlineFormat::Underline => "underline",
            InlineFormat::Strike => "strike",
            InlineFormat::Code => "code",
        }
    }

    pub fn enabled(self, markdown: &MarkdownConfig) -> bool {
        match self {
            InlineFormat::Bold => markdown.bold,
            InlineFormat::Italic => markdown.italic,
            InlineFormat::Underline => markdown.underline,
            InlineFormat::Strike => markdown.strike,
            InlineFormat::Code => markdown.code,
        }
    }

    /// Underscore sigils only close at a word boundary, so `snake_case_`
    /// stays prose.
    fn needs_word_boundary(self) -> bool {
        matches!(self, InlineFormat::Italic | InlineFormat::Underline)
    }
}

/// One combinable inline style: a single format or a nested pair.
#[derive(Debug)]
pub struct InlineStyle {
    pub name: SmolStr,
    pub formats: Vec<InlineFormat>,
    /// Backward patterns, one per nesting order.
    pub patterns: Vec<Regex>,
}

impl InlineStyle {
    fn single(format: InlineFormat) -> Self {
        Self {
            name: SmolStr::new_static(format.attribute()),
            formats: vec![format],
            patterns: vec![inline_pattern(format, None)],
        }
    }

    fn pair(a: InlineFormat, b: InlineFormat) -> Self {
        Self {
            name: SmolStr::new(format!("{}+{}", a.attribute(), b.attribute())),
            formats: vec![a, b],
            patterns: vec![inline_pattern(a, Some(b)), inline_pattern(b, Some(a))],
        }
    }

    pub fn enabled(&self, markdown: &MarkdownConfig) -> bool {
        self.formats.iter().all(|f| f.enabled(markdown))
    }
}

/// Build the backward pattern for `outer` wrapping `inner`.
///
/// Groups: `span` is the whole sigil-wrapped run, `inner` the text inside.
fn inline_pattern(outer: InlineFormat, inner: Option<InlineFormat>) -> Regex {
    let inner_sigil = inner.map(InlineFormat::sigil).unwrap_or("");
    let closing = regex::escape(&format!("{}{}", outer.sigil(), inner_sigil));
    let opening = regex::escape(&format!("{}{}", inner_sigil, outer.sigil()));

    let mut excluded: Vec<char> = outer.sigil().chars().chain(inner_sigil.chars()).collect();
    excluded.sort_unstable();
    excluded.dedup();
    let class: String = excluded
        .iter()
        .map(|c| regex::escape(&c.to_string()))
        .collect();

    let body = format!(r"[^\s{class}](?:[^{class}]*[^\s{class}])?");
    let boundary = if outer.needs_word_boundary() {
        r"\W|$".to_string()
    } else {
        let first = outer.sigil().chars().next().map(|c| c.to_string()).unwrap_or_default();
        format!(r"[^{}]|$", regex::escape(&first))
    };
    Regex::new(&format!(
        r"^(?P<span>{closing}(?P<inner>{body}){opening})(?:{boundary})"
    ))
    .unwrap()
}

/// Every named pattern plus the inline styles.
#[derive(Debug)]
pub struct PatternCatalog {
    /// `#`, `##`, `###` at line start.
    pub header: Regex,
    pub list_marker: Regex,
    /// `[text](url)`, backward.
    pub link: Regex,
    pub code_block: Regex,
    pub blockquote: Regex,
    pub divider_dash: Regex,
    pub divider_underscore: Regex,
    pub divider_star: Regex,
    /// A lone `-` followed by Enter.
    pub divider_enter: Regex,
    /// `:name` before a closing `:`, backward.
    pub shortname: Regex,
    /// Whitespace right before the caret.
    pub emoji_open: Regex,
    /// Line start or whitespace right before the caret.
    pub mention_open: Regex,
    pub empty: Regex,
    /// Native emoji sequences, including ZWJ, skin-tone and tag forms.
    pub native_emoji: Regex,
    /// Pairs first, then singles.
    pub inline: Vec<InlineStyle>,
}

/// Minimum shortname length that triggers a lookup.
pub const SHORTNAME_MIN_LEN: usize = 2;

impl PatternCatalog {
    fn build() -> Self {
        let mut inline = Vec::new();
        for (i, a) in InlineFormat::ALL.iter().enumerate() {
            for b in &InlineFormat::ALL[i + 1..] {
                inline.push(InlineStyle::pair(*a, *b));
            }
        }
        inline.extend(InlineFormat::ALL.iter().map(|f| InlineStyle::single(*f)));

        Self {
            header: Regex::new(r"^(#{1,3})$").unwrap(),
            list_marker: Regex::new(r"^(\*|\[\]|\[ \]|\[x\]|-|1\.)$").unwrap(),
            link: Regex::new(r"^(?P<span>\)(?P<url>[^()\s]+)\(\](?P<text>[^\[\]]+)\[)").unwrap(),
            code_block: Regex::new(r"^```$").unwrap(),
            blockquote: Regex::new(r"^>$").unwrap(),
            divider_dash: Regex::new(r"^--$").unwrap(),
            divider_underscore: Regex::new(r"^__$").unwrap(),
            divider_star: Regex::new(r"^\*\*$").unwrap(),
            divider_enter: Regex::new(r"^-$").unwrap(),
            shortname: Regex::new(&format!(
                r"^(?P<span>(?P<name>[a-z0-9_+\-]{{{SHORTNAME_MIN_LEN},}}):)(?:\s|$)"
            ))
            .unwrap(),
            emoji_open: Regex::new(r"\s$").unwrap(),
            mention_open: Regex::new(r"(?:^|\s)$").unwrap(),
            empty: Regex::new(r"^$").unwrap(),
            native_emoji: Regex::new(concat!(
                r"\x{1F3F4}[\x{E0020}-\x{E007E}]+\x{E007F}",
                r"|\p{Regional_Indicator}{2}",
                r"|[0-9#*]\x{FE0F}?\x{20E3}",
                r"|\p{Extended_Pictographic}(?:\x{FE0F}|\p{Emoji_Modifier})?",
                r"(?:\x{200D}\p{Extended_Pictographic}(?:\x{FE0F}|\p{Emoji_Modifier})?)*",
            ))
            .unwrap(),
            inline,
        }
    }

    /// Look a pattern up by name.
    pub fn get(&self, name: &str) -> Option<&Regex> {
        let pattern = match name {
            "header" => &self.header,
            "list" => &self.list_marker,
            "link" => &self.link,
            "code-block" => &self.code_block,
            "blockquote" => &self.blockquote,
            "divider-dash" => &self.divider_dash,
            "divider-underscore" => &self.divider_underscore,
            "divider-star" => &self.divider_star,
            "divider-enter" => &self.divider_enter,
            "shortname" => &self.shortname,
            "emoji-open" => &self.emoji_open,
            "mention-open" => &self.mention_open,
            "empty" => &self.empty,
            "native-emoji" => &self.native_emoji,
            _ => return None,
        };
        Some(pattern)
    }

    pub fn inline_style(&self, name: &str) -> Option<&InlineStyle> {
        self.inline.iter().find(|style| style.name == name)
    }

    /// Divider pattern for the marker character being typed.
    pub fn divider_for(&self, marker: char) -> Option<&Regex> {
        match marker {
            '-' => Some(&self.divider_dash),
            '_' => Some(&self.divider_underscore),
            '*' => Some(&self.divider_star),
            _ => None,
        }
    }
}

static CATALOG: LazyLock<PatternCatalog> = LazyLock::new(PatternCatalog::build);

pub fn catalog() -> &'static PatternCatalog {
    &CATALOG
}

/// List kind for a list marker.
pub fn list_kind(marker: &str) -> Option<&'static str> {
    match marker {
        "*" => Some("unordered"),
        "[]" | "[ ]" => Some("unchecked"),
        "[x]" => Some("checked"),
        "-" => Some("bullet"),
        "1." => Some("ordered"),
        _ => None,
    }
}

/// Emoji sequences in `text`, as `(byte_start, matched)`, skipping single
/// UTF-16 unit symbols like `©` that are text by default.
pub fn native_emoji_matches(text: &str) -> impl Iterator<Item = (usize, &str)> {
    catalog()
        .native_emoji
        .find_iter(text)
        .filter(|m| m.as_str().encode_utf16().count() >= 2)
        .map(|m| (m.start(), m.as_str()))
}
