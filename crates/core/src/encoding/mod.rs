//! Byte-level encoding for BPE tokenization.
//!
//! GPT-2 style vocabularies operate on UTF-8 bytes rendered as printable
//! symbol characters; this module owns that mapping.

pub mod byte_level;

pub use byte_level::ByteCodec;
