pub mod codec;
pub mod config;
pub mod direct;
pub mod error;
pub mod index;
pub mod matching;
pub mod postings;

pub use codec::{BitReader, BitWriter};
pub use config::{MatchingConfig, TranspositionConfig};
pub use direct::DirectIndexBuilder;
pub use error::{NautexError, Result};
pub use index::{
    CollectionStatistics, DocumentIndex, DocumentIndexBuilder, DocumentIndexEntry,
    DocumentIndexStream, EntryStatistics, Index, InvertedIndex, InvertedIndexStream,
    InvertedIndexWriter, Lexicon, LexiconEntry,
};
pub use matching::{
    register_plugin, Bm25, ManagerPlugin, MatchingEntry, MatchingQueryTerms, PostingListManager,
    QueryTerm, QueryTermProperties, TfIdf, WeightingModel,
};
pub use postings::{
    BitPointer, BitPostingCursor, DocId, OrPostingCursor, PostingCursor, TermId,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
