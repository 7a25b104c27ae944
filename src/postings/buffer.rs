//! In-memory direct posting buffers
//!
//! During a transposition pass each document in the window accumulates its
//! direct postings in a compressed in-memory buffer. Term ids arrive in
//! strictly ascending order (one inverted list at a time), so the buffer can
//! gap-encode without sorting. When the pass completes, each buffer is
//! decoded and appended to the on-disk direct posting stream.

use std::io::Write;
use std::sync::Arc;

use crate::codec::{BitReader, BitWriter};
use crate::error::Result;

use super::cursor::{BitPostingCursor, PostingCursor};
use super::types::{BitPointer, TermId};

/// Compressed posting buffer for one document being materialised
pub struct DirectPostingBuffer {
    out: BitWriter<Vec<u8>>,
    doc_frequency: u32,
    term_frequency: u64,
    last_term: u32,
    field_count: usize,
}

impl DirectPostingBuffer {
    pub fn new(field_count: usize) -> Self {
        Self {
            out: BitWriter::new(Vec::new()),
            doc_frequency: 0,
            term_frequency: 0,
            last_term: 0,
            field_count,
        }
    }

    /// Unique terms recorded so far
    pub fn doc_frequency(&self) -> u32 {
        self.doc_frequency
    }

    /// Sum of term frequencies recorded so far
    pub fn term_frequency(&self) -> u64 {
        self.term_frequency
    }

    pub fn is_empty(&self) -> bool {
        self.doc_frequency == 0
    }

    /// Record the document's first posting: the term id is written absolute
    pub fn record_first(&mut self, term: TermId, tf: u32, field_freqs: &[u32]) -> Result<()> {
        debug_assert_eq!(self.doc_frequency, 0);
        self.out.write_gamma(term.as_u32() as u64 + 1)?;
        self.write_payload(term, tf, field_freqs)
    }

    /// Record a subsequent posting: the term id is written as a gap
    pub fn record_next(&mut self, term: TermId, tf: u32, field_freqs: &[u32]) -> Result<()> {
        debug_assert!(term.as_u32() > self.last_term, "term ids must ascend");
        self.out
            .write_gamma((term.as_u32() - self.last_term) as u64)?;
        self.write_payload(term, tf, field_freqs)
    }

    fn write_payload(&mut self, term: TermId, tf: u32, field_freqs: &[u32]) -> Result<()> {
        debug_assert_eq!(field_freqs.len(), self.field_count);
        self.out.write_gamma(tf as u64)?;
        for ff in field_freqs {
            self.out.write_gamma(*ff as u64 + 1)?;
        }
        self.last_term = term.as_u32();
        self.doc_frequency += 1;
        self.term_frequency += tf as u64;
        Ok(())
    }

    /// Seal the buffer for re-reading
    ///
    /// Appends two sentinel gamma-ones and byte-pads before handing the
    /// bytes over: the posting decoder may overread past the logical end by
    /// a few bits, and must find well-formed codes there.
    pub fn finish(mut self) -> Result<SealedPostingBuffer> {
        self.out.write_gamma(1)?;
        self.out.write_gamma(1)?;
        let data = self.out.finish()?;
        Ok(SealedPostingBuffer {
            data: Arc::new(data),
            doc_frequency: self.doc_frequency,
            field_count: self.field_count,
        })
    }
}

/// A sealed buffer ready to be decoded
pub struct SealedPostingBuffer {
    data: Arc<Vec<u8>>,
    doc_frequency: u32,
    field_count: usize,
}

impl SealedPostingBuffer {
    pub fn cursor(&self) -> BitPostingCursor {
        BitPostingCursor::new(
            BitReader::new(Arc::clone(&self.data)),
            self.doc_frequency,
            self.field_count,
        )
    }
}

/// Decode a sealed buffer and append its postings to a posting output stream
///
/// Returns the pointer at which the list begins in the output, carrying the
/// document's unique-term count.
pub fn append_buffer<W: Write>(
    buffer: SealedPostingBuffer,
    out: &mut BitWriter<W>,
) -> Result<BitPointer> {
    let (byte_offset, bit_offset) = out.position();
    let num_entries = buffer.doc_frequency;
    let mut cursor = buffer.cursor();
    let mut prev: Option<u32> = None;
    while let Some(id) = cursor.next()? {
        match prev {
            None => out.write_gamma(id.as_u32() as u64 + 1)?,
            Some(p) => out.write_gamma((id.as_u32() - p) as u64)?,
        }
        out.write_gamma(cursor.frequency() as u64)?;
        if let Some(ffs) = cursor.field_frequencies() {
            for ff in ffs {
                out.write_gamma(*ff as u64 + 1)?;
            }
        }
        prev = Some(id.as_u32());
    }
    Ok(BitPointer::new(byte_offset, bit_offset, num_entries))
}
