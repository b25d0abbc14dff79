//! Format attributes attached to delta operations.
//!
//! Inline formats (`bold`, `link`, ...) live on text and embed inserts.
//! Line formats (`header`, `list`, `id`, ...) live on the `\n` that ends a
//! line. Both use the same map type.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// A single attribute value.
///
/// `Null` and `Bool(false)` both mean "remove this format" when a change is
/// applied to a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Null,
    Bool(bool),
    Int(i64),
    Str(SmolStr),
    List(Vec<SmolStr>),
}

impl AttrValue {
    /// Whether this value clears the format it is attached to.
    pub fn is_removal(&self) -> bool {
        matches!(self, AttrValue::Null | AttrValue::Bool(false))
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttrValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, AttrValue::List(_))
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        AttrValue::Bool(b)
    }
}

impl From<i64> for AttrValue {
    fn from(n: i64) -> Self {
        AttrValue::Int(n)
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Str(SmolStr::new(s))
    }
}

impl From<SmolStr> for AttrValue {
    fn from(s: SmolStr) -> Self {
        AttrValue::Str(s)
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Null => write!(f, "null"),
            AttrValue::Bool(b) => write!(f, "{b}"),
            AttrValue::Int(n) => write!(f, "{n}"),
            AttrValue::Str(s) => write!(f, "{s:?}"),
            AttrValue::List(items) => write!(f, "{items:?}"),
        }
    }
}

/// Attribute map. Ordered so deltas compare and print deterministically.
pub type Attributes = BTreeMap<SmolStr, AttrValue>;

/// Build an attribute map from `(name, value)` pairs.
pub fn attrs<I, K, V>(pairs: I) -> Attributes
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<SmolStr>,
    V: Into<AttrValue>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Render an attribute map as `{name: value, ...}`.
pub fn display(attributes: &Attributes) -> String {
    let inner: Vec<String> = attributes
        .iter()
        .map(|(k, v)| format!("{k}: {v}"))
        .collect();
    format!("{{{}}}", inner.join(", "))
}

/// Layer `b` over `a`.
///
/// With `keep_null` false, removal values are dropped from the result; this
/// is the rule for formats applied onto inserted content. Retains keep them so
/// the removal still reaches the document.
pub fn compose(a: &Attributes, b: &Attributes, keep_null: bool) -> Attributes {
    let mut out = a.clone();
    for (k, v) in b {
        out.insert(k.clone(), v.clone());
    }
    if !keep_null {
        out.retain(|_, v| !matches!(v, AttrValue::Null));
    }
    out
}

/// Attributes that undo applying `attr` on top of `base`.
pub fn invert(attr: &Attributes, base: &Attributes) -> Attributes {
    let mut out = Attributes::new();
    for (k, v) in base {
        if attr.contains_key(k) && attr.get(k) != Some(v) {
            out.insert(k.clone(), v.clone());
        }
    }
    for (k, v) in attr {
        if !base.contains_key(k) && !matches!(v, AttrValue::Null) {
            out.insert(k.clone(), AttrValue::Null);
        }
    }
    out
}

/// Convert `Bool(false)` into `Null` so it removes the format on retains.
pub fn normalize_removals(attributes: &Attributes) -> Attributes {
    attributes
        .iter()
        .map(|(k, v)| {
            let v = if v.is_removal() { AttrValue::Null } else { v.clone() };
            (k.clone(), v)
        })
        .collect()
}

/// Drop every removal value; inserted content never carries them.
pub fn strip_removals(attributes: &Attributes) -> Attributes {
    attributes
        .iter()
        .filter(|(_, v)| !v.is_removal())
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Keys present in both maps with equal values.
pub fn intersect(a: &Attributes, b: &Attributes) -> Attributes {
    a.iter()
        .filter(|(k, v)| b.get(*k) == Some(*v))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}
