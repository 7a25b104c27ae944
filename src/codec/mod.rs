//! Bit-granular compression codec
//!
//! Posting lists are stored as a continuous bit stream: lists start at
//! arbitrary bit offsets and values are written with variable-length codes
//! (Elias gamma, unary, fixed-width binary). The codec does not interpret
//! content; callers impose meaning.

mod bitstream;

pub use bitstream::{BitReader, BitWriter};
