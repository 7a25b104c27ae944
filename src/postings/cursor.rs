//! Lazy forward-only posting cursors

use crate::codec::BitReader;
use crate::error::Result;

use super::types::{BitPointer, DocId};

/// A lazy forward cursor over a decoded posting list
///
/// `id()` and `frequency()` are valid after a `next()` or `advance_to()`
/// that returned `Some`; the cursor never moves backwards.
pub trait PostingCursor {
    /// Advance one posting; `None` at end of list
    fn next(&mut self) -> Result<Option<DocId>>;

    /// Advance to the first posting with id >= `target`
    ///
    /// Always advances at least one posting. The gamma stream admits no
    /// skipping, so the default implementation is repeated `next()`.
    fn advance_to(&mut self, target: DocId) -> Result<Option<DocId>> {
        loop {
            match self.next()? {
                Some(id) if id < target => continue,
                other => return Ok(other),
            }
        }
    }

    /// Id at the cursor position
    fn id(&self) -> DocId;

    /// Term frequency at the cursor position
    fn frequency(&self) -> u32;

    /// Per-field frequencies at the cursor position, if the list tracks fields
    fn field_frequencies(&self) -> Option<&[u32]>;

    /// Number of postings in the list
    fn len_hint(&self) -> u32;
}

/// Cursor over a bit-compressed posting list
///
/// Decodes id gaps (first entry absolute, offset by one), then the term
/// frequency, then one frequency per field when `field_count > 0`. The same
/// type serves inverted lists (ids are documents) and direct lists (ids are
/// terms).
pub struct BitPostingCursor {
    input: BitReader,
    remaining: u32,
    total: u32,
    current: u32,
    frequency: u32,
    fields: Vec<u32>,
    started: bool,
}

impl BitPostingCursor {
    /// Open a cursor at the position the pointer names
    pub fn open(mut input: BitReader, pointer: BitPointer, field_count: usize) -> Self {
        input.seek(pointer.byte_offset, pointer.bit_offset);
        Self::new(input, pointer.num_entries, field_count)
    }

    /// Open a cursor at the reader's current position
    pub fn new(input: BitReader, num_entries: u32, field_count: usize) -> Self {
        Self {
            input,
            remaining: num_entries,
            total: num_entries,
            current: 0,
            frequency: 0,
            fields: vec![0; field_count],
            started: false,
        }
    }
}

impl PostingCursor for BitPostingCursor {
    fn next(&mut self) -> Result<Option<DocId>> {
        if self.remaining == 0 {
            return Ok(None);
        }
        let gap = self.input.read_gamma()? as u32;
        if self.started {
            self.current += gap;
        } else {
            self.current = gap - 1;
            self.started = true;
        }
        self.frequency = self.input.read_gamma()? as u32;
        for f in self.fields.iter_mut() {
            *f = self.input.read_gamma()? as u32 - 1;
        }
        self.remaining -= 1;
        Ok(Some(DocId(self.current)))
    }

    fn id(&self) -> DocId {
        DocId(self.current)
    }

    fn frequency(&self) -> u32 {
        self.frequency
    }

    fn field_frequencies(&self) -> Option<&[u32]> {
        if self.fields.is_empty() {
            None
        } else {
            Some(&self.fields)
        }
    }

    fn len_hint(&self) -> u32 {
        self.total
    }
}
