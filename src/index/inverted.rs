//! Bit-compressed posting index: reader, sequential stream, and writer
//!
//! The same reader serves the inverted structure (term -> documents) and the
//! direct structure (document -> terms); only the interpretation of the ids
//! differs. The writer produces the inverted file together with its lexicon,
//! assigning term ids in insertion order so that the ids are aligned with
//! the scan order of the file, the property the transposition depends on.

use std::fs::File;
use std::io::BufWriter;
use std::sync::Arc;

use tracing::debug;

use super::index::Index;
use super::lexicon::{Lexicon, LexiconBuilder, LexiconEntry};
use crate::codec::{BitReader, BitWriter};
use crate::error::{NautexError, Result};
use crate::postings::{BitPointer, BitPostingCursor, DocId, TermId};

pub(crate) const POSTING_EXT: &str = ".bf";

/// Read-side posting index over a fully loaded bit file
pub struct InvertedIndex {
    data: Arc<Vec<u8>>,
    field_count: usize,
}

impl InvertedIndex {
    pub fn open(index: &Index, name: &str) -> Result<Self> {
        if !index.has_structure(name) {
            return Err(NautexError::MissingStructure(name.to_string()));
        }
        Ok(Self {
            data: index.read_structure_bytes(name, POSTING_EXT)?,
            field_count: index.statistics().field_count(),
        })
    }

    /// Open a cursor over the posting list the pointer locates
    pub fn open_cursor(&self, pointer: BitPointer) -> BitPostingCursor {
        BitPostingCursor::open(
            BitReader::new(Arc::clone(&self.data)),
            pointer,
            self.field_count,
        )
    }

    pub fn field_count(&self) -> usize {
        self.field_count
    }

    pub(crate) fn data(&self) -> &Arc<Vec<u8>> {
        &self.data
    }
}

/// Sequential iterator over every posting list of an inverted structure, in
/// term-id order
///
/// Each pass of the transposition opens a fresh stream; the underlying bytes
/// and lexicon are shared, so reopening costs nothing.
pub struct InvertedIndexStream {
    lexicon: Arc<Lexicon>,
    data: Arc<Vec<u8>>,
    field_count: usize,
    next_term: usize,
}

impl InvertedIndexStream {
    pub fn new(lexicon: Arc<Lexicon>, inverted: &InvertedIndex) -> Self {
        Self {
            lexicon,
            data: Arc::clone(inverted.data()),
            field_count: inverted.field_count(),
            next_term: 0,
        }
    }

    /// Next posting list with its lexicon entry, or `None` after the last
    pub fn next_list(&mut self) -> Option<(LexiconEntry, BitPostingCursor)> {
        let entry = self.lexicon.entry(TermId(self.next_term as u32))?.clone();
        self.next_term += 1;
        let cursor = BitPostingCursor::open(
            BitReader::new(Arc::clone(&self.data)),
            entry.pointer,
            self.field_count,
        );
        Some((entry, cursor))
    }
}

/// Writer producing the inverted file and its lexicon
///
/// Terms must be pushed in lexicographic order with their postings sorted by
/// document id; each term's id is its insertion ordinal.
pub struct InvertedIndexWriter {
    out: BitWriter<BufWriter<File>>,
    lexicon: LexiconBuilder,
    field_count: usize,
    num_pointers: u64,
}

impl InvertedIndexWriter {
    pub fn create(index: &Index) -> Result<Self> {
        let file = File::create(index.structure_path("inverted", POSTING_EXT))?;
        Ok(Self {
            out: BitWriter::new(BufWriter::new(file)),
            lexicon: LexiconBuilder::new(),
            field_count: index.statistics().field_count(),
            num_pointers: 0,
        })
    }

    /// Append one term's posting list
    ///
    /// Postings are `(doc, tf, field_freqs)` with strictly ascending doc ids
    /// and `field_freqs.len()` equal to the index's field count.
    pub fn push_term(&mut self, term: &str, postings: &[(DocId, u32, Vec<u32>)]) -> Result<()> {
        let (byte_offset, bit_offset) = self.out.position();
        let mut prev: Option<u32> = None;
        let mut term_frequency = 0u64;
        for (doc, tf, field_freqs) in postings {
            debug_assert_eq!(field_freqs.len(), self.field_count);
            match prev {
                None => self.out.write_gamma(doc.as_u32() as u64 + 1)?,
                Some(p) => self.out.write_gamma((doc.as_u32() - p) as u64)?,
            }
            self.out.write_gamma(*tf as u64)?;
            for ff in field_freqs {
                self.out.write_gamma(*ff as u64 + 1)?;
            }
            prev = Some(doc.as_u32());
            term_frequency += *tf as u64;
        }

        let entry = LexiconEntry {
            term_id: self.lexicon.next_term_id(),
            doc_frequency: postings.len() as u32,
            term_frequency,
            pointer: BitPointer::new(byte_offset, bit_offset, postings.len() as u32),
        };
        self.num_pointers += postings.len() as u64;
        self.lexicon.add(term, entry)
    }

    /// Pad, flush, register `inverted` and `lexicon`, update statistics
    pub fn finish(self, index: &mut Index) -> Result<()> {
        debug!(terms = self.lexicon.len(), "closing inverted index writer");
        self.out.finish()?;
        self.lexicon.write(index)?;
        index.add_structure("inverted");
        index.statistics_mut().num_pointers = self.num_pointers;
        Ok(())
    }
}
