//! CLI commands for the gptbpe tokenizer.

pub mod benchmark;
pub mod chunk;
pub mod count;
pub mod decode;
pub mod encode;

pub use benchmark::BenchmarkCommand;
pub use chunk::ChunkCommand;
pub use count::CountCommand;
pub use decode::DecodeCommand;
pub use encode::EncodeCommand;

use anyhow::{Context, Result as AnyhowResult};
use clap::{Args, ValueEnum};
use gptbpe_tokenizer::{CachePolicy, Tokenizer, Variant};
use std::io::Read;
use std::path::PathBuf;

/// Vocabulary presets selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum VariantArg {
    /// Base GPT-2 / GPT-3 vocabulary
    #[value(alias = "gpt4")]
    Gpt3,
    /// Codex vocabulary with merged whitespace runs
    Codex,
}

/// Arguments shared by every command that needs a tokenizer.
#[derive(Args)]
pub struct TokenizerArgs {
    /// Directory holding encoder.json + vocab.bpe or vocab.json + merges.txt
    #[arg(short = 'd', long, env = "GPTBPE_VOCAB_DIR")]
    pub vocab_dir: PathBuf,

    /// Vocabulary variant
    #[arg(long, value_enum, default_value_t = VariantArg::Gpt3)]
    pub variant: VariantArg,

    /// Merge whitespace runs up to this length (overrides --variant)
    #[arg(long)]
    pub max_run: Option<usize>,

    /// Bound both caches to this many entries (unbounded if not specified)
    #[arg(long)]
    pub cache_capacity: Option<usize>,
}

impl TokenizerArgs {
    fn variant(&self) -> Variant {
        match (self.max_run, self.variant) {
            (Some(max_run), _) => Variant::WhitespaceMerging { max_run },
            (None, VariantArg::Gpt3) => Variant::Gpt3,
            (None, VariantArg::Codex) => Variant::Codex,
        }
    }

    fn cache_policy(&self) -> CachePolicy {
        match self.cache_capacity {
            Some(capacity) => CachePolicy::Lru { capacity },
            None => CachePolicy::Unbounded,
        }
    }

    /// Load the tokenizer these arguments describe.
    pub fn load(&self) -> AnyhowResult<Tokenizer> {
        Tokenizer::builder()
            .variant(self.variant())
            .cache_policy(self.cache_policy())
            .build_from_dir(&self.vocab_dir)
            .with_context(|| format!("loading tokenizer from {}", self.vocab_dir.display()))
    }
}

/// Read the input argument, or stdin if it is "-".
pub fn read_input(input: String) -> AnyhowResult<String> {
    if input == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(input)
    }
}
