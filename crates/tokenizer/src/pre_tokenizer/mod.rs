//! Pre-tokenization pipeline.
//!
//! Text is split into pieces by a fixed pattern before BPE runs on each piece.

pub mod split;

pub use split::{Pieces, PreTokenizer, GPT2_PATTERN};
