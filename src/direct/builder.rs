//! Multi-pass inverted-to-direct transposition
//!
//! Each pass scans the document index for a window of documents whose
//! cumulative token count stays under the configured budget, then traverses
//! the whole inverted file once, collecting the window's postings into
//! per-document compressed buffers. Term ids are assigned in scan order of
//! the inverted file (the `aligned` lexicon property), so every document
//! sees its term ids strictly ascending and the buffers can gap-encode
//! without sorting. After the last pass the document index is rewritten with
//! the direct-file pointers and atomically swapped in.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use crate::codec::BitWriter;
use crate::config::TranspositionConfig;
use crate::error::{NautexError, Result};
use crate::index::{DocumentIndexBuilder, DocumentIndexStream, Index, InvertedIndexStream};
use crate::index::{DOCUMENT_EXT, POSTING_EXT};
use crate::postings::{append_buffer, BitPointer, DirectPostingBuffer, DocId, PostingCursor};

const SOURCE_STRUCTURE: &str = "inverted";
const DESTINATION_STRUCTURE: &str = "direct";
const OFFSETS_EXT: &str = ".offsets";

/// Builds a direct index from an inverted index
pub struct DirectIndexBuilder {
    config: TranspositionConfig,
    cancel: Option<Arc<AtomicBool>>,
}

impl DirectIndexBuilder {
    pub fn new(config: TranspositionConfig) -> Self {
        Self {
            config,
            cancel: None,
        }
    }

    /// Install a flag checked at pass boundaries; setting it aborts the
    /// build cleanly without registering the destination structure
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(false)
    }

    /// Create the direct structure
    ///
    /// Aborts without touching the index when the source is missing, the
    /// destination already exists, the index version predates aligned term
    /// ids, or the lexicon does not declare them aligned.
    pub fn create_direct_index(&self, index: &mut Index) -> Result<()> {
        let start = Instant::now();

        if !index.has_structure(SOURCE_STRUCTURE) {
            return Err(NautexError::MissingStructure(SOURCE_STRUCTURE.to_string()));
        }
        if index.has_structure(DESTINATION_STRUCTURE) {
            return Err(NautexError::StructureExists(
                DESTINATION_STRUCTURE.to_string(),
            ));
        }
        let version = index.property_or("index.version", "2.0");
        if version.starts_with("1.") {
            return Err(NautexError::UnsupportedVersion(version.to_string()));
        }
        if index.property_or("index.lexicon.termids", "") != "aligned" {
            return Err(NautexError::UnalignedTermIds);
        }

        let field_count = index.statistics().field_count();
        let total_docs = index.statistics().num_docs;
        let total_tokens = index.statistics().num_tokens;
        let process_tokens = self.config.process_tokens;
        let expected_iterations = if process_tokens >= total_tokens {
            1
        } else {
            total_tokens.div_ceil(process_tokens)
        };

        info!(
            "generating a {} structure from the {} structure ({} docs, {} expected passes)",
            DESTINATION_STRUCTURE, SOURCE_STRUCTURE, total_docs, expected_iterations
        );

        let lexicon = Arc::new(index.lexicon()?);
        let inverted = index.inverted_index()?;
        let mut doc_stream = DocumentIndexStream::open(index, "document")?;

        let offsets_path = index.structure_path(DESTINATION_STRUCTURE, OFFSETS_EXT);
        let mut offsets = BufWriter::new(File::create(&offsets_path)?);
        let direct_path = index.structure_path(DESTINATION_STRUCTURE, POSTING_EXT);
        let mut out = BitWriter::new(BufWriter::new(File::create(&direct_path)?));

        let mut first_docid = 0u32;
        let mut tokens_found = 0u64;
        let mut iteration = 0u64;
        // Carried across passes so an empty document at a window boundary
        // still shares the preceding non-empty document's pointer
        let mut last_pointer = BitPointer::default();

        while first_docid < total_docs {
            if self.cancelled() {
                return Err(NautexError::Cancelled);
            }
            iteration += 1;

            let window = scan_document_index_for_tokens(process_tokens, &mut doc_stream)?;
            if window == 0 {
                break;
            }
            info!(
                "pass {}/{}: generating postings for {} documents starting from id {}",
                iteration, expected_iterations, window, first_docid
            );

            let mut buffers: Vec<DirectPostingBuffer> =
                (0..window).map(|_| DirectPostingBuffer::new(field_count)).collect();
            let mut used = vec![false; window];

            let mut inv_stream = InvertedIndexStream::new(Arc::clone(&lexicon), &inverted);
            tokens_found += traverse_inverted_file(
                &mut inv_stream,
                first_docid,
                window,
                &mut buffers,
                &mut used,
            )?;

            // Empty documents reuse the previous pointer with a zero count
            for buffer in buffers {
                let pointer = if buffer.is_empty() {
                    last_pointer.with_entries(0)
                } else {
                    let sealed = buffer.finish()?;
                    last_pointer = append_buffer(sealed, &mut out)?;
                    last_pointer
                };
                write_offset_record(&mut offsets, pointer)?;
            }

            first_docid += window as u32;
        }

        debug_assert_eq!(first_docid, total_docs);
        info!("completed after {} passes", iteration);

        if tokens_found != total_tokens {
            warn!(
                "tokens found while scanning {} structure do not match expected: expected {}, found {}",
                SOURCE_STRUCTURE, total_tokens, tokens_found
            );
        }

        out.finish()?;
        offsets.flush()?;
        drop(offsets);

        self.rewrite_document_index(index, &offsets_path)?;

        index.add_structure(DESTINATION_STRUCTURE);
        mirror_field_properties(index);
        index.set_property(
            "direct.checksum",
            &checksum_file(&direct_path)?.to_string(),
        );
        std::fs::remove_file(&offsets_path)?;
        index.flush()?;

        info!(
            "finished generating a {} structure from the {} structure in {:.1}s",
            DESTINATION_STRUCTURE,
            SOURCE_STRUCTURE,
            start.elapsed().as_secs_f64()
        );
        Ok(())
    }

    /// Rewrite the document index with the direct-file offsets, preserving
    /// lengths, and atomically replace the old structure
    fn rewrite_document_index(&self, index: &mut Index, offsets_path: &std::path::Path) -> Result<()> {
        info!("finishing up: rewriting document index");
        let mut offsets = BufReader::new(File::open(offsets_path)?);
        let mut old_entries = DocumentIndexStream::open(index, "document")?;
        let mut builder = DocumentIndexBuilder::create(index, "document-df")?;

        while let Some(mut entry) = old_entries.next_entry()? {
            entry.pointer = read_offset_record(&mut offsets)?;
            builder.add_entry(&entry)?;
        }
        builder.finish(index)?;
        index.rename_structure("document-df", "document", DOCUMENT_EXT)?;
        Ok(())
    }
}

/// Advance the document stream until the running token sum reaches the
/// budget; returns the number of documents consumed
///
/// The last window is naturally smaller; the stream resumes where the
/// previous call stopped.
fn scan_document_index_for_tokens(
    budget: u64,
    stream: &mut DocumentIndexStream,
) -> Result<usize> {
    let mut tokens = 0u64;
    let mut count = 0usize;
    while let Some(entry) = stream.next_entry()? {
        tokens += entry.doc_length as u64;
        count += 1;
        if tokens >= budget {
            break;
        }
    }
    Ok(count)
}

/// One scan of the inverted file, gathering postings for documents in
/// `[first_docid, first_docid + window)`; returns the tokens found
fn traverse_inverted_file(
    stream: &mut InvertedIndexStream,
    first_docid: u32,
    window: usize,
    buffers: &mut [DirectPostingBuffer],
    used: &mut [bool],
) -> Result<u64> {
    let last_docid = first_docid + window as u32 - 1;
    let mut tokens = 0u64;
    let mut num_postings = 0u64;

    while let Some((entry, mut cursor)) = stream.next_list() {
        let term_id = entry.term_id;
        let mut doc = match cursor.advance_to(DocId(first_docid))? {
            None => continue,
            Some(d) if d.as_u32() > last_docid => continue,
            Some(d) => d,
        };
        debug_assert!(doc.as_u32() >= first_docid);

        loop {
            tokens += cursor.frequency() as u64;
            num_postings += 1;
            let slot = (doc.as_u32() - first_docid) as usize;
            let field_freqs = cursor.field_frequencies().unwrap_or(&[]);
            if used[slot] {
                buffers[slot].record_next(term_id, cursor.frequency(), field_freqs)?;
            } else {
                used[slot] = true;
                buffers[slot].record_first(term_id, cursor.frequency(), field_freqs)?;
            }
            match cursor.next()? {
                Some(d) if d.as_u32() <= last_docid => doc = d,
                _ => break,
            }
        }
    }

    info!(
        "finished scanning inverted structure: {} postings ({} tokens) for {} documents",
        num_postings, tokens, window
    );
    Ok(tokens)
}

/// Offsets scratch record: `(byte_offset: i64 BE, bit_offset: i8, df: i32 BE)`
fn write_offset_record<W: Write>(w: &mut W, pointer: BitPointer) -> Result<()> {
    w.write_all(&(pointer.byte_offset as i64).to_be_bytes())?;
    w.write_all(&[pointer.bit_offset])?;
    w.write_all(&(pointer.num_entries as i32).to_be_bytes())?;
    Ok(())
}

fn read_offset_record<R: Read>(r: &mut R) -> Result<BitPointer> {
    let mut buf8 = [0u8; 8];
    r.read_exact(&mut buf8)?;
    let byte_offset = i64::from_be_bytes(buf8) as u64;
    let mut bit = [0u8; 1];
    r.read_exact(&mut bit)?;
    let mut buf4 = [0u8; 4];
    r.read_exact(&mut buf4)?;
    let num_entries = i32::from_be_bytes(buf4) as u32;
    Ok(BitPointer::new(byte_offset, bit[0], num_entries))
}

fn mirror_field_properties(index: &mut Index) {
    let names = index.statistics().field_names.join(",");
    let count = index.statistics().field_count().to_string();
    index.set_property("direct.fields.names", &names);
    index.set_property("direct.fields.count", &count);
}

fn checksum_file(path: &std::path::Path) -> Result<u32> {
    let bytes = std::fs::read(path)?;
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(&bytes);
    Ok(hasher.finalize())
}
