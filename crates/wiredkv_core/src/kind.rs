//! Value-type tags stored in every segment.

use crate::types::{Binary, List, Number, Set, Tables, Text, ZSet};
use std::any::TypeId;
use std::fmt;

/// Which value type a segment's payload decodes to.
///
/// The set is closed: [`Kind::of`] only recognises the seven value types in
/// [`crate::types`]. `Unknown` is what everything else classifies as and is
/// never written into a valid record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Kind {
    /// [`Set`] of string members.
    #[default]
    Set = 0,
    /// [`ZSet`] of scored members.
    ZSet = 1,
    /// [`List`] of dynamic values.
    List = 2,
    /// [`Text`] string.
    Text = 3,
    /// [`Tables`] map of dynamic values.
    Tables = 4,
    /// [`Binary`] blob.
    Binary = 5,
    /// [`Number`] integer.
    Number = 6,
    /// Unsupported type.
    Unknown = 7,
}

impl Kind {
    /// Classifies a value type against the closed set of supported types.
    #[must_use]
    pub fn of<V: 'static>() -> Self {
        let id = TypeId::of::<V>();
        if id == TypeId::of::<Set>() {
            Self::Set
        } else if id == TypeId::of::<ZSet>() {
            Self::ZSet
        } else if id == TypeId::of::<List>() {
            Self::List
        } else if id == TypeId::of::<Text>() {
            Self::Text
        } else if id == TypeId::of::<Tables>() {
            Self::Tables
        } else if id == TypeId::of::<Binary>() {
            Self::Binary
        } else if id == TypeId::of::<Number>() {
            Self::Number
        } else {
            Self::Unknown
        }
    }

    /// Converts an on-disk tag to a kind.
    ///
    /// Returns `None` for bytes outside the tag range. `Unknown` (7) decodes
    /// so that callers can report it precisely.
    #[must_use]
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0 => Some(Self::Set),
            1 => Some(Self::ZSet),
            2 => Some(Self::List),
            3 => Some(Self::Text),
            4 => Some(Self::Tables),
            5 => Some(Self::Binary),
            6 => Some(Self::Number),
            7 => Some(Self::Unknown),
            _ => None,
        }
    }

    /// Returns the on-disk tag.
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        self as u8
    }

    /// Returns true for every kind except `Unknown`.
    #[must_use]
    pub const fn is_known(self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Set => "set",
            Self::ZSet => "zset",
            Self::List => "list",
            Self::Text => "text",
            Self::Tables => "tables",
            Self::Binary => "binary",
            Self::Number => "number",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}
