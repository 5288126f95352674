//! gptbpe-tokenizer - High-level tokenizer API
//!
//! This crate puts the core tables and merge engine behind a single
//! `Tokenizer` that encodes text to GPT-2 / GPT-3 / Codex token IDs and back.
//!
//! # Features
//!
//! - Builder-based configuration, also readable from JSON
//! - GPT-2 pre-tokenization pattern, compiled and checked once
//! - Base and whitespace-merging (Codex) vocabulary variants
//! - Loading from GPT-2 or HuggingFace resource directories
//! - Token counting and fixed-size chunking
//!
//! # Example
//!
//! ```rust,no_run
//! use gptbpe_tokenizer::{Tokenizer, Variant};
//! use std::path::Path;
//!
//! let mut tokenizer = Tokenizer::builder()
//!     .variant(Variant::Codex)
//!     .build_from_dir(Path::new("resources/gpt2"))?;
//!
//! let ids = tokenizer.encode("def main():\n    print('hello world')")?;
//! assert_eq!(tokenizer.decode(&ids)?, "def main():\n    print('hello world')");
//! # Ok::<(), gptbpe_tokenizer::TokenizerError>(())
//! ```

// Re-export core types
pub use gptbpe_core::{CachePolicy, CacheStats, Result, TokenizerError};

// Tokenizer API
pub mod tokenizer;
pub use tokenizer::{
    Chunk, Tokenizer, TokenizerBuilder, TokenizerCacheStats, TokenizerConfig, Variant,
};

// Resource loading
pub mod io;
pub use io::{ResourceLayout, Resources, TokenizerLoader};

// Pre-tokenization
pub mod pre_tokenizer;
pub use pre_tokenizer::{PreTokenizer, GPT2_PATTERN};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
