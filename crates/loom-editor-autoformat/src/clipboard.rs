//! Paste interception: native emoji in pasted text become embeds before
//! the text reaches the document.

use loom_editor_core::{Attributes, Delta, Embed, Insert, Op};
use tracing::debug;

use crate::emoji::{EMOJI_EMBED, EmojiResolver};
use crate::patterns::native_emoji_matches;

#[derive(Debug, Clone, Copy, Default)]
pub struct PasteMatcher;

impl PasteMatcher {
    /// Matcher for plain-text paste nodes. Every emoji in every text insert
    /// is replaced; a delta without emoji comes back unchanged.
    pub fn matches(&self, node_text: &str, delta: Delta, resolver: &EmojiResolver) -> Delta {
        if !has_emoji(&delta) {
            return delta;
        }
        let mut out = Delta::new();
        let mut replaced = 0;
        for op in delta.ops() {
            let Op::Insert {
                insert: Insert::Text(text),
                attributes,
            } = op
            else {
                out.push(op.clone());
                continue;
            };
            let mut last = 0;
            for (byte, native) in native_emoji_matches(text) {
                if byte > last {
                    out = out.insert_attrs(&text[last..byte], attributes.clone());
                }
                let value = resolver.resolve_by_native(native);
                out = out.insert_embed(Embed::new(EMOJI_EMBED, value.to_json()), Attributes::new());
                last = byte + native.len();
                replaced += 1;
            }
            if last < text.len() {
                out = out.insert_attrs(&text[last..], attributes.clone());
            }
        }
        debug!(replaced, node_len = node_text.len(), "embedded pasted emoji");
        out
    }
}

fn has_emoji(delta: &Delta) -> bool {
    delta.ops().iter().any(|op| match op {
        Op::Insert {
            insert: Insert::Text(text),
            ..
        } => native_emoji_matches(text).next().is_some(),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use loom_editor_core::attrs;

    #[test]
    fn test_every_match_is_replaced() {
        let pasted = Delta::new().insert_attrs("a😀b🎉", attrs([("bold", true)]));
        let out = PasteMatcher.matches("a😀b🎉", pasted, &EmojiResolver::default());
        let ops = out.ops();
        assert_eq!(ops.len(), 4);
        assert_eq!(
            ops[0],
            Op::Insert {
                insert: Insert::Text("a".into()),
                attributes: attrs([("bold", true)]),
            }
        );
        assert!(matches!(&ops[1], Op::Insert { insert: Insert::Embed(e), .. } if e.kind == EMOJI_EMBED));
        assert!(matches!(&ops[3], Op::Insert { insert: Insert::Embed(_), .. }));
        assert_eq!(out.length(), 4);
    }

    #[test]
    fn test_passthrough() {
        let resolver = EmojiResolver::default();
        let pasted = Delta::new().insert("no emoji here");
        assert_eq!(
            PasteMatcher.matches("no emoji here", pasted.clone(), &resolver),
            pasted
        );
        assert_eq!(PasteMatcher.matches("", Delta::new(), &resolver), Delta::new());
    }
}
