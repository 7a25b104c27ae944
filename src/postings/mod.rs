//! Posting lists: types, lazy decoding cursors, and in-memory buffers
//!
//! A posting list is a bit-packed sequence of `(id, tf, field frequencies)`
//! entries, ids strictly ascending and gap-encoded. In an inverted list the
//! id is a document id; in a direct list it is a term id. Both share one
//! wire format and one cursor implementation.

mod buffer;
mod cursor;
mod or_merge;
mod types;

pub use buffer::{append_buffer, DirectPostingBuffer, SealedPostingBuffer};
pub use cursor::{BitPostingCursor, PostingCursor};
pub use or_merge::OrPostingCursor;
pub use types::{BitPointer, DocId, TermId};
