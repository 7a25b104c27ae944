//! Document index: per-document lengths and posting pointers
//!
//! Stored as fixed-width big-endian records so it can be scanned as a stream
//! during transposition without loading the whole structure. The pointer
//! fields address whichever posting structure the index currently pairs the
//! document index with (the direct file, once built).

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};

use super::index::Index;
use crate::error::{NautexError, Result};
use crate::postings::{BitPointer, DocId};

pub(crate) const DOCUMENT_EXT: &str = ".bin";

/// One document record
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DocumentIndexEntry {
    /// Number of tokens in the document
    pub doc_length: u32,
    /// Tokens per field, when fields are tracked
    pub field_lengths: Vec<u32>,
    /// Location of the document's posting list
    pub pointer: BitPointer,
}

impl DocumentIndexEntry {
    pub fn new(doc_length: u32, field_lengths: Vec<u32>) -> Self {
        Self {
            doc_length,
            field_lengths,
            pointer: BitPointer::default(),
        }
    }

    fn write_to<W: Write>(&self, w: &mut W, field_count: usize) -> io::Result<()> {
        debug_assert_eq!(self.field_lengths.len(), field_count);
        w.write_all(&self.doc_length.to_be_bytes())?;
        for fl in &self.field_lengths {
            w.write_all(&fl.to_be_bytes())?;
        }
        w.write_all(&self.pointer.byte_offset.to_be_bytes())?;
        w.write_all(&[self.pointer.bit_offset])?;
        w.write_all(&self.pointer.num_entries.to_be_bytes())?;
        Ok(())
    }

    fn read_from<R: Read>(r: &mut R, field_count: usize) -> Result<Option<Self>> {
        let mut len_buf = [0u8; 4];
        if !read_exact_or_eof(r, &mut len_buf)? {
            return Ok(None);
        }
        let doc_length = u32::from_be_bytes(len_buf);

        let mut field_lengths = Vec::with_capacity(field_count);
        let mut buf4 = [0u8; 4];
        for _ in 0..field_count {
            read_record_part(r, &mut buf4)?;
            field_lengths.push(u32::from_be_bytes(buf4));
        }

        let mut buf8 = [0u8; 8];
        read_record_part(r, &mut buf8)?;
        let byte_offset = u64::from_be_bytes(buf8);
        let mut bit = [0u8; 1];
        read_record_part(r, &mut bit)?;
        read_record_part(r, &mut buf4)?;
        let num_entries = u32::from_be_bytes(buf4);

        Ok(Some(Self {
            doc_length,
            field_lengths,
            pointer: BitPointer::new(byte_offset, bit[0], num_entries),
        }))
    }
}

/// Read a field in the middle of a record; EOF here means truncation
fn read_record_part<R: Read>(r: &mut R, buf: &mut [u8]) -> Result<()> {
    r.read_exact(buf).map_err(|e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            NautexError::MalformedStream("truncated document index record".into())
        } else {
            NautexError::Io(e)
        }
    })
}

/// Read a full buffer, or report a clean end-of-stream before the first byte
fn read_exact_or_eof<R: Read>(r: &mut R, buf: &mut [u8]) -> Result<bool> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = r.read(&mut buf[filled..])?;
        if n == 0 {
            if filled == 0 {
                return Ok(false);
            }
            return Err(NautexError::MalformedStream(
                "truncated document index record".into(),
            ));
        }
        filled += n;
    }
    Ok(true)
}

/// Sequential reader over a document index structure
///
/// The stream is advanced destructively: successive window-sizing calls
/// resume where the previous one stopped.
pub struct DocumentIndexStream {
    reader: BufReader<File>,
    field_count: usize,
}

impl DocumentIndexStream {
    pub fn open(index: &Index, name: &str) -> Result<Self> {
        if !index.has_structure(name) {
            return Err(NautexError::MissingStructure(name.to_string()));
        }
        let file = File::open(index.structure_path(name, DOCUMENT_EXT))?;
        Ok(Self {
            reader: BufReader::new(file),
            field_count: index.statistics().field_count(),
        })
    }

    /// Next record, or `None` at end of structure
    pub fn next_entry(&mut self) -> Result<Option<DocumentIndexEntry>> {
        DocumentIndexEntry::read_from(&mut self.reader, self.field_count)
    }
}

/// Random-access document index, fully loaded
///
/// Query-time scoring needs document lengths by id; the table is small
/// relative to the posting files.
pub struct DocumentIndex {
    entries: Vec<DocumentIndexEntry>,
}

impl DocumentIndex {
    pub fn open(index: &Index) -> Result<Self> {
        let mut stream = DocumentIndexStream::open(index, "document")?;
        let mut entries = Vec::with_capacity(index.statistics().num_docs as usize);
        while let Some(entry) = stream.next_entry()? {
            entries.push(entry);
        }
        Ok(Self { entries })
    }

    pub fn entry(&self, doc: DocId) -> Option<&DocumentIndexEntry> {
        self.entries.get(doc.as_usize())
    }

    pub fn doc_length(&self, doc: DocId) -> u32 {
        self.entry(doc).map(|e| e.doc_length).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Append-only builder for a document index structure
///
/// Writes under the given (possibly provisional) structure name; the
/// transposition builds `document-df` and renames it over `document` once
/// complete.
pub struct DocumentIndexBuilder {
    writer: BufWriter<File>,
    name: String,
    field_count: usize,
    num_docs: u32,
    num_tokens: u64,
    field_tokens: Vec<u64>,
}

impl DocumentIndexBuilder {
    pub fn create(index: &Index, name: &str) -> Result<Self> {
        let file = File::create(index.structure_path(name, DOCUMENT_EXT))?;
        let field_count = index.statistics().field_count();
        Ok(Self {
            writer: BufWriter::new(file),
            name: name.to_string(),
            field_count,
            num_docs: 0,
            num_tokens: 0,
            field_tokens: vec![0; field_count],
        })
    }

    pub fn add_entry(&mut self, entry: &DocumentIndexEntry) -> Result<()> {
        entry.write_to(&mut self.writer, self.field_count)?;
        self.num_docs += 1;
        self.num_tokens += entry.doc_length as u64;
        for (sum, fl) in self.field_tokens.iter_mut().zip(&entry.field_lengths) {
            *sum += *fl as u64;
        }
        Ok(())
    }

    /// Flush and register the structure. Building the canonical `document`
    /// structure also records document counts in the statistics.
    pub fn finish(mut self, index: &mut Index) -> Result<()> {
        self.writer.flush()?;
        index.add_structure(&self.name);
        if self.name == "document" {
            let stats = index.statistics_mut();
            stats.num_docs = self.num_docs;
            stats.num_tokens = self.num_tokens;
            stats.field_tokens = self.field_tokens;
        }
        Ok(())
    }
}
