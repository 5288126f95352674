//! Utility modules for the BPE tokenizer.

pub mod cache;

pub use cache::{CachePolicy, CacheStats, MemoCache};
