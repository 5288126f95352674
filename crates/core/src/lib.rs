//! gptbpe-core - Core byte-level BPE implementation
//!
//! This crate provides the tables and the merge algorithm behind GPT-2/GPT-3
//! style tokenization, independent of how resources are loaded or text is
//! pre-tokenized.
//!
//! # Features
//!
//! - Byte-to-symbol bijection so arbitrary bytes can be merged as strings
//! - Vocabulary and merge-rank tables backed by `AHashMap` and compact strings
//! - Optional whitespace-run extension (Codex-style indentation tokens)
//! - Greedy BPE engine with a memo cache under a configurable eviction policy
//!
//! # Example
//!
//! ```rust
//! use gptbpe_core::{BpeEngine, CachePolicy, MergeRankTable};
//!
//! let ranks = MergeRankTable::from_pairs([("h", "e"), ("l", "l")]);
//! let mut engine = BpeEngine::new(ranks, CachePolicy::Unbounded);
//! assert_eq!(engine.bpe("hello"), "he ll o");
//! ```

pub mod error;
pub use error::{Result, TokenizerError};

// Core BPE algorithm modules
pub mod core;
pub use self::core::{
    BpeEngine, MergeMap, MergeRankTable, Pair, Vocab, VocabR, VocabTable, SYMBOL_SEPARATOR,
};

// Byte-level symbol mapping
pub mod encoding;
pub use encoding::ByteCodec;

// Memo caches
pub mod utils;
pub use utils::{CachePolicy, CacheStats, MemoCache};
