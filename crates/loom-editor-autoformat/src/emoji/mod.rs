//! Emoji embedding: metadata lookup, picker confirmation and the change
//! watcher that turns typed native emoji into embeds.

mod inserter;
mod resolver;
mod watcher;

pub use inserter::{EmojiInserter, ShortcodeInserter};
pub use resolver::{
    EmojiEmbedValue, EmojiResolver, normalize_unified, split_skin_tone, unified_of,
};
pub use watcher::EmojiWatcher;

/// Embed kind for emoji nodes.
pub const EMOJI_EMBED: &str = "emoji-embed";
