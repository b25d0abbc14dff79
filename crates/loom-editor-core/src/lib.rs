//! loom-editor-core: the document substrate for the loom editor.
//!
//! This crate provides:
//! - `Delta` - retain/insert/delete change algebra over UTF-16 offsets
//! - `DocumentHost` trait - the queries and mutators handlers run against
//! - `PlainDocument` - in-memory host with history and a call log
//! - Key and selection types shared by keyboard handlers

pub mod attributes;
pub mod delta;
pub mod document;
pub mod keys;
pub mod plain;
pub mod text;
pub mod types;
pub mod undo;

pub use attributes::{AttrValue, Attributes, attrs};
pub use delta::{Delta, Embed, Insert, Op, OpError, OpIter, OpKind};
pub use document::{DocumentHost, HostCall, LINE_FORMATS, is_line_format};
pub use keys::{Key, KeyEvent, KeydownResult, Modifiers};
pub use plain::{EmbedBehavior, EmbedRegistry, Layout, PlainDocument};
pub use smol_str::SmolStr;
pub use types::{Bounds, LeafInfo, LeafKind, LineInfo, Selection, Source, TextChange};
pub use undo::{History, HistoryEntry, UndoManager};
