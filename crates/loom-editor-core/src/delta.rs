//! Delta: the retain/insert/delete operation sequence.
//!
//! A document is a delta made only of inserts. A change is a delta of
//! retains, inserts and deletes read left to right against the document it
//! applies to. `compose` applies one delta after another and `invert`
//! produces the change that undoes a delta against its base document.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::attributes::{self, Attributes};
use crate::text::{utf16_len, utf16_slice};

/// Embedded, non-text content. Occupies exactly one offset unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embed {
    pub kind: SmolStr,
    pub value: serde_json::Value,
}

impl Embed {
    pub fn new(kind: impl Into<SmolStr>, value: serde_json::Value) -> Self {
        Self {
            kind: kind.into(),
            value,
        }
    }
}

/// Inserted content.
#[derive(Debug, Clone, PartialEq)]
pub enum Insert {
    Text(String),
    Embed(Embed),
}

impl Insert {
    pub fn len(&self) -> usize {
        match self {
            Insert::Text(s) => utf16_len(s),
            Insert::Embed(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Insert::Text(s) => Some(s),
            Insert::Embed(_) => None,
        }
    }
}

/// A single delta operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawOp", into = "RawOp")]
pub enum Op {
    Insert {
        insert: Insert,
        attributes: Attributes,
    },
    Retain {
        retain: usize,
        attributes: Attributes,
    },
    Delete(usize),
}

/// Which kind of op an iterator will produce next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Insert,
    Retain,
    Delete,
}

impl Op {
    pub fn len(&self) -> usize {
        match self {
            Op::Insert { insert, .. } => insert.len(),
            Op::Retain { retain, .. } => *retain,
            Op::Delete(n) => *n,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> OpKind {
        match self {
            Op::Insert { .. } => OpKind::Insert,
            Op::Retain { .. } => OpKind::Retain,
            Op::Delete(_) => OpKind::Delete,
        }
    }

    pub fn attributes(&self) -> Option<&Attributes> {
        match self {
            Op::Insert { attributes, .. } | Op::Retain { attributes, .. } => Some(attributes),
            Op::Delete(_) => None,
        }
    }

    /// Merge `other` into `self` when both are compatible runs.
    fn merge(&mut self, other: &Op) -> bool {
        match (self, other) {
            (
                Op::Insert {
                    insert: Insert::Text(a),
                    attributes: attrs_a,
                },
                Op::Insert {
                    insert: Insert::Text(b),
                    attributes: attrs_b,
                },
            ) if attrs_a == attrs_b => {
                a.push_str(b);
                true
            }
            (
                Op::Retain {
                    retain: a,
                    attributes: attrs_a,
                },
                Op::Retain {
                    retain: b,
                    attributes: attrs_b,
                },
            ) if attrs_a == attrs_b => {
                *a += b;
                true
            }
            _ => false,
        }
    }

    /// Take `[offset, offset + len)` of this op.
    fn slice(&self, offset: usize, len: usize) -> Op {
        match self {
            Op::Insert {
                insert: Insert::Text(s),
                attributes,
            } => Op::Insert {
                insert: Insert::Text(utf16_slice(s, offset, offset + len).to_string()),
                attributes: attributes.clone(),
            },
            Op::Insert { .. } => self.clone(),
            Op::Retain { attributes, .. } => Op::Retain {
                retain: len,
                attributes: attributes.clone(),
            },
            Op::Delete(_) => Op::Delete(len),
        }
    }
}

/// Walks a delta's ops, handing out pieces of a requested length.
pub struct OpIter<'a> {
    ops: &'a [Op],
    index: usize,
    offset: usize,
}

impl<'a> OpIter<'a> {
    pub fn new(ops: &'a [Op]) -> Self {
        Self {
            ops,
            index: 0,
            offset: 0,
        }
    }

    pub fn has_next(&self) -> bool {
        self.peek_len() < usize::MAX
    }

    /// Remaining length of the current op. Exhausted iterators report an
    /// unbounded retain.
    pub fn peek_len(&self) -> usize {
        match self.ops.get(self.index) {
            Some(op) => op.len() - self.offset,
            None => usize::MAX,
        }
    }

    pub fn peek_kind(&self) -> OpKind {
        match self.ops.get(self.index) {
            Some(op) => op.kind(),
            None => OpKind::Retain,
        }
    }

    /// Next piece of at most `len` units.
    pub fn next_len(&mut self, len: usize) -> Op {
        let Some(op) = self.ops.get(self.index) else {
            return Op::Retain {
                retain: len,
                attributes: Attributes::new(),
            };
        };
        let remaining = op.len() - self.offset;
        let take = len.min(remaining);
        let piece = if self.offset == 0 && take == op.len() {
            op.clone()
        } else {
            op.slice(self.offset, take)
        };
        if take == remaining {
            self.index += 1;
            self.offset = 0;
        } else {
            self.offset += take;
        }
        piece
    }

    /// Whatever is left, starting mid-op if needed.
    pub fn rest(&mut self) -> Vec<Op> {
        let mut out = Vec::new();
        while self.index < self.ops.len() {
            out.push(self.next_len(usize::MAX));
        }
        out
    }
}

/// An ordered sequence of operations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Delta {
    ops: Vec<Op>,
}

impl Delta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ops(ops: impl IntoIterator<Item = Op>) -> Self {
        let mut delta = Self::new();
        for op in ops {
            delta.push(op);
        }
        delta
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn iter(&self) -> OpIter<'_> {
        OpIter::new(&self.ops)
    }

    pub fn retain(self, len: usize) -> Self {
        self.retain_attrs(len, Attributes::new())
    }

    pub fn retain_attrs(mut self, len: usize, attributes: Attributes) -> Self {
        self.push(Op::Retain {
            retain: len,
            attributes,
        });
        self
    }

    pub fn insert(self, text: impl Into<String>) -> Self {
        self.insert_attrs(text, Attributes::new())
    }

    pub fn insert_attrs(mut self, text: impl Into<String>, attributes: Attributes) -> Self {
        self.push(Op::Insert {
            insert: Insert::Text(text.into()),
            attributes,
        });
        self
    }

    pub fn insert_embed(mut self, embed: Embed, attributes: Attributes) -> Self {
        self.push(Op::Insert {
            insert: Insert::Embed(embed),
            attributes,
        });
        self
    }

    pub fn delete(mut self, len: usize) -> Self {
        self.push(Op::Delete(len));
        self
    }

    /// Append an op, merging with the previous one where possible.
    ///
    /// An insert pushed after a delete is placed before it; both orders
    /// describe the same change and this keeps deltas canonical.
    pub fn push(&mut self, op: Op) -> &mut Self {
        if op.is_empty() {
            return self;
        }
        let mut index = self.ops.len();
        if let (Some(Op::Delete(last)), Op::Delete(n)) = (self.ops.last_mut(), &op) {
            *last += n;
            return self;
        }
        if matches!(self.ops.last(), Some(Op::Delete(_))) && op.kind() == OpKind::Insert {
            index -= 1;
            if index == 0 {
                self.ops.insert(0, op);
                return self;
            }
        }
        if index > 0 && self.ops[index - 1].merge(&op) {
            return self;
        }
        self.ops.insert(index, op);
        self
    }

    /// Drop a trailing attribute-less retain.
    pub fn chop(mut self) -> Self {
        if let Some(Op::Retain { attributes, .. }) = self.ops.last()
            && attributes.is_empty()
        {
            self.ops.pop();
        }
        self
    }

    /// Total length of all ops.
    pub fn length(&self) -> usize {
        self.ops.iter().map(Op::len).sum()
    }

    /// How much this delta grows (or shrinks) the document it applies to.
    pub fn change_length(&self) -> isize {
        self.ops.iter().fold(0isize, |acc, op| match op {
            Op::Insert { insert, .. } => acc + insert.len() as isize,
            Op::Delete(n) => acc - *n as isize,
            Op::Retain { .. } => acc,
        })
    }

    /// Ops covering `[start, end)`.
    pub fn slice(&self, start: usize, end: usize) -> Delta {
        let mut out = Delta::new();
        let mut iter = self.iter();
        let mut index = 0;
        while index < end && iter.has_next() {
            let op = if index < start {
                iter.next_len(start - index)
            } else {
                let op = iter.next_len(end - index);
                out.push(op.clone());
                op
            };
            index += op.len();
        }
        out
    }

    /// Apply `other` after `self`.
    pub fn compose(&self, other: &Delta) -> Delta {
        let mut this_iter = self.iter();
        let mut other_iter = other.iter();
        let mut out = Delta::new();

        while this_iter.has_next() || other_iter.has_next() {
            if other_iter.peek_kind() == OpKind::Insert {
                out.push(other_iter.next_len(usize::MAX));
            } else if this_iter.peek_kind() == OpKind::Delete {
                out.push(this_iter.next_len(usize::MAX));
            } else {
                let len = this_iter.peek_len().min(other_iter.peek_len());
                let this_op = this_iter.next_len(len);
                let other_op = other_iter.next_len(len);
                match (this_op, other_op) {
                    (this_op, Op::Retain { attributes, .. }) => {
                        let this_is_retain = this_op.kind() == OpKind::Retain;
                        let base = this_op.attributes().cloned().unwrap_or_default();
                        let composed = attributes::compose(&base, &attributes, this_is_retain);
                        match this_op {
                            Op::Insert { insert, .. } => out.push(Op::Insert {
                                insert,
                                attributes: composed,
                            }),
                            _ => out.push(Op::Retain {
                                retain: len,
                                attributes: composed,
                            }),
                        };
                    }
                    (Op::Retain { .. }, Op::Delete(n)) => {
                        out.push(Op::Delete(n));
                    }
                    // Insert followed by delete cancels out.
                    _ => {}
                }
            }
        }
        out.chop()
    }

    /// The change that reverts `self` when applied after it to `base`.
    pub fn invert(&self, base: &Delta) -> Delta {
        let mut inverted = Delta::new();
        let mut base_index = 0;
        for op in &self.ops {
            match op {
                Op::Insert { insert, .. } => {
                    inverted.push(Op::Delete(insert.len()));
                }
                Op::Retain {
                    retain,
                    attributes,
                } if attributes.is_empty() => {
                    inverted.push(Op::Retain {
                        retain: *retain,
                        attributes: Attributes::new(),
                    });
                    base_index += retain;
                }
                Op::Retain {
                    retain,
                    attributes,
                } => {
                    for base_op in base.slice(base_index, base_index + retain).ops {
                        let base_attrs = base_op.attributes().cloned().unwrap_or_default();
                        inverted.push(Op::Retain {
                            retain: base_op.len(),
                            attributes: attributes::invert(attributes, &base_attrs),
                        });
                    }
                    base_index += retain;
                }
                Op::Delete(n) => {
                    for base_op in base.slice(base_index, base_index + n).ops {
                        inverted.push(base_op);
                    }
                    base_index += n;
                }
            }
        }
        inverted.chop()
    }

    /// Where `index` ends up after this delta is applied.
    ///
    /// Inserts exactly at `index` push it forward unless `priority` is set.
    pub fn transform_position(&self, mut index: usize, priority: bool) -> usize {
        let mut iter = self.iter();
        let mut offset = 0;
        while iter.has_next() && offset <= index {
            let len = iter.peek_len();
            let kind = iter.peek_kind();
            iter.next_len(usize::MAX);
            match kind {
                OpKind::Delete => {
                    index -= len.min(index - offset);
                    continue;
                }
                OpKind::Insert if offset < index || !priority => index += len,
                _ => {}
            }
            offset += len;
        }
        index
    }

    /// Concatenated text of all text inserts; embeds contribute nothing.
    pub fn plain_text(&self) -> String {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Insert { insert, .. } => insert.as_text(),
                _ => None,
            })
            .collect()
    }
}

// === Wire format ===
//
// Ops serialize the way the host editor stores them:
// `{"insert": "text", "attributes": {...}}`, `{"insert": {"kind": value}}`,
// `{"retain": 3}`, `{"delete": 2}`.

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawInsert {
    Text(String),
    Embed(BTreeMap<SmolStr, serde_json::Value>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawOp {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    insert: Option<RawInsert>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    retain: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    delete: Option<usize>,
    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    attributes: Attributes,
}

impl From<Op> for RawOp {
    fn from(op: Op) -> Self {
        let mut raw = RawOp {
            insert: None,
            retain: None,
            delete: None,
            attributes: Attributes::new(),
        };
        match op {
            Op::Insert { insert, attributes } => {
                raw.insert = Some(match insert {
                    Insert::Text(s) => RawInsert::Text(s),
                    Insert::Embed(e) => RawInsert::Embed(BTreeMap::from([(e.kind, e.value)])),
                });
                raw.attributes = attributes;
            }
            Op::Retain { retain, attributes } => {
                raw.retain = Some(retain);
                raw.attributes = attributes;
            }
            Op::Delete(n) => raw.delete = Some(n),
        }
        raw
    }
}

/// A serialized op that does not describe exactly one operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum OpError {
    #[error("embed insert must have exactly one key, found {0}")]
    EmbedKeys(usize),
    #[error("op must have exactly one of insert, retain or delete")]
    Ambiguous,
}

impl TryFrom<RawOp> for Op {
    type Error = OpError;

    fn try_from(raw: RawOp) -> Result<Self, Self::Error> {
        match (raw.insert, raw.retain, raw.delete) {
            (Some(RawInsert::Text(s)), None, None) => Ok(Op::Insert {
                insert: Insert::Text(s),
                attributes: raw.attributes,
            }),
            (Some(RawInsert::Embed(map)), None, None) => {
                let count = map.len();
                let mut entries = map.into_iter();
                match (entries.next(), entries.next()) {
                    (Some((kind, value)), None) => Ok(Op::Insert {
                        insert: Insert::Embed(Embed { kind, value }),
                        attributes: raw.attributes,
                    }),
                    _ => Err(OpError::EmbedKeys(count)),
                }
            }
            (None, Some(retain), None) => Ok(Op::Retain {
                retain,
                attributes: raw.attributes,
            }),
            (None, None, Some(n)) => Ok(Op::Delete(n)),
            _ => Err(OpError::Ambiguous),
        }
    }
}
