//! Core identifier and pointer types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Dense document identifier (0..num_docs)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocId(pub u32);

impl DocId {
    pub fn new(n: u32) -> Self {
        Self(n)
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }

    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Dense term identifier, strictly ascending in lexicon insertion order
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TermId(pub u32);

impl TermId {
    pub fn new(n: u32) -> Self {
        Self(n)
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }

    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TermId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Locates and sizes a posting list within a bit-packed stream
///
/// Lists are not byte-aligned: a list may start mid-byte, so the pointer
/// carries both a byte offset and a bit offset. `num_entries` is the number
/// of postings in the list (a document frequency for inverted lists, a
/// unique-term count for direct lists).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitPointer {
    pub byte_offset: u64,
    pub bit_offset: u8,
    pub num_entries: u32,
}

impl BitPointer {
    pub fn new(byte_offset: u64, bit_offset: u8, num_entries: u32) -> Self {
        Self {
            byte_offset,
            bit_offset,
            num_entries,
        }
    }

    /// Same location, different entry count
    pub fn with_entries(self, num_entries: u32) -> Self {
        Self {
            num_entries,
            ..self
        }
    }
}

impl fmt::Display for BitPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "@{{{},{}}} x{}",
            self.byte_offset, self.bit_offset, self.num_entries
        )
    }
}
