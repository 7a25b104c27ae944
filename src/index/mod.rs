//! On-disk index structures
//!
//! An index is a directory of named structures sharing one prefix: the
//! lexicon (term dictionary), the inverted posting file, the document index,
//! and, once built, the direct posting file. A JSON properties file records
//! the structure registry, collection statistics, and free-form key/value
//! properties.

mod document;
mod inverted;
mod lexicon;
mod statistics;

#[allow(clippy::module_inception)]
mod index;

pub use document::{DocumentIndex, DocumentIndexBuilder, DocumentIndexEntry, DocumentIndexStream};
pub use index::Index;
pub use inverted::{InvertedIndex, InvertedIndexStream, InvertedIndexWriter};
pub use lexicon::{EntryStatistics, Lexicon, LexiconEntry};
pub use statistics::CollectionStatistics;

pub(crate) use document::DOCUMENT_EXT;
pub(crate) use inverted::POSTING_EXT;
