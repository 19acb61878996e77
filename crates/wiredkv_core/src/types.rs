//! Value types a segment can carry, and the capabilities that move them to
//! and from canonical bytes.
//!
//! Canonical bytes are CBOR produced by `ciborium`. The encoding is only
//! ever read back by WiredKV itself, so it is not part of any external
//! contract beyond "decoding the bytes yields an equal value".

use crate::error::{CoreError, CoreResult};
use ciborium::Value;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A value that can be turned into canonical bytes for a segment.
pub trait Serializable: 'static {
    /// Encodes this value to canonical bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Serialization`] if the value cannot be encoded.
    fn to_canonical_bytes(&self) -> CoreResult<Vec<u8>>;
}

/// A value that can be rebuilt from its canonical bytes.
pub trait Deserializable: Serializable + Sized {
    /// Decodes a value from canonical bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Deserialization`] if the bytes are not a valid
    /// encoding of `Self`.
    fn from_canonical_bytes(bytes: &[u8]) -> CoreResult<Self>;
}

fn to_cbor<T: Serialize>(value: &T) -> CoreResult<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::into_writer(value, &mut buf).map_err(|e| CoreError::serialization(e.to_string()))?;
    Ok(buf)
}

fn from_cbor<T: DeserializeOwned>(bytes: &[u8]) -> CoreResult<T> {
    ciborium::from_reader(bytes).map_err(|e| CoreError::deserialization(e.to_string()))
}

macro_rules! canonical_cbor {
    ($($ty:ty),+ $(,)?) => {$(
        impl Serializable for $ty {
            fn to_canonical_bytes(&self) -> CoreResult<Vec<u8>> {
                to_cbor(self)
            }
        }

        impl Deserializable for $ty {
            fn from_canonical_bytes(bytes: &[u8]) -> CoreResult<Self> {
                from_cbor(bytes)
            }
        }
    )+};
}

canonical_cbor!(Set, ZSet, List, Text, Tables, Binary, Number);

/// Unordered collection of unique string members.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Set {
    members: BTreeSet<String>,
}

impl Set {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a member. Returns false if it was already present.
    pub fn add(&mut self, member: impl Into<String>) -> bool {
        self.members.insert(member.into())
    }

    /// Removes a member. Returns false if it was absent.
    pub fn remove(&mut self, member: &str) -> bool {
        self.members.remove(member)
    }

    /// Returns true if `member` is in the set.
    #[must_use]
    pub fn contains(&self, member: &str) -> bool {
        self.members.contains(member)
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns true if the set has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Iterates members in lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for Set {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            members: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Set of members ordered by score.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZSet {
    scores: BTreeMap<String, f64>,
}

impl ZSet {
    /// Creates an empty sorted set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the score of `member`, returning its previous score.
    pub fn add(&mut self, member: impl Into<String>, score: f64) -> Option<f64> {
        self.scores.insert(member.into(), score)
    }

    /// Returns the score of `member`.
    #[must_use]
    pub fn score(&self, member: &str) -> Option<f64> {
        self.scores.get(member).copied()
    }

    /// Removes `member`, returning its score.
    pub fn remove(&mut self, member: &str) -> Option<f64> {
        self.scores.remove(member)
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Returns true if the sorted set has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Members in ascending score order; ties break by member name.
    #[must_use]
    pub fn ranked(&self) -> Vec<(&str, f64)> {
        let mut ranked: Vec<(&str, f64)> =
            self.scores.iter().map(|(m, s)| (m.as_str(), *s)).collect();
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(b.0)));
        ranked
    }
}

/// Ordered sequence of dynamic values.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct List {
    items: Vec<Value>,
}

impl List {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an item to the back.
    pub fn push(&mut self, item: impl Into<Value>) {
        self.items.push(item.into());
    }

    /// Removes and returns the last item.
    pub fn pop(&mut self) -> Option<Value> {
        self.items.pop()
    }

    /// Returns the item at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.items.get(index)
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// All items in order.
    #[must_use]
    pub fn items(&self) -> &[Value] {
        &self.items
    }
}

/// UTF-8 text.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Text {
    content: String,
}

impl Text {
    /// Wraps a string.
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    /// Returns the text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.content
    }
}

/// String-keyed table of dynamic values.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tables {
    table: BTreeMap<String, Value>,
}

impl Tables {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a column, returning the previous value.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.table.insert(column.into(), value.into())
    }

    /// Returns the value of `column`.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.table.get(column)
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns true if the table has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

/// Opaque bytes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Binary {
    content: Vec<u8>,
}

impl Binary {
    /// Wraps bytes.
    #[must_use]
    pub fn new(content: impl Into<Vec<u8>>) -> Self {
        Self {
            content: content.into(),
        }
    }

    /// Returns the bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.content
    }
}

/// Signed 64-bit integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Number {
    value: i64,
}

impl Number {
    /// Wraps an integer.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self { value }
    }

    /// Returns the integer.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.value
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}
