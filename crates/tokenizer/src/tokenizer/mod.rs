//! Main tokenizer implementation.
//!
//! This module provides the high-level `Tokenizer` struct that ties the byte
//! codec, vocabulary, merge ranks, pre-tokenizer and caches together.

use crate::io::{Resources, TokenizerLoader};
use crate::pre_tokenizer::{PreTokenizer, GPT2_PATTERN};
use gptbpe_core::{
    BpeEngine, ByteCodec, CachePolicy, CacheStats, MemoCache, MergeRankTable, Result,
    TokenizerError, VocabTable, SYMBOL_SEPARATOR,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Largest accepted whitespace-run bound.
pub const MAX_WHITESPACE_RUN: usize = 256;

/// Vocabulary variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Variant {
    /// Base GPT-2 / GPT-3 vocabulary (also accepted as `gpt4`)
    #[default]
    #[serde(alias = "gpt4")]
    Gpt3,
    /// Codex vocabulary: whitespace runs merged up to 24 markers
    Codex,
    /// Base vocabulary extended with whitespace runs up to `max_run`
    WhitespaceMerging { max_run: usize },
}

impl Variant {
    /// Whitespace-run bound used by [`Variant::Codex`].
    pub const CODEX_MAX_RUN: usize = 24;

    /// Whitespace-run bound, zero for the base vocabulary.
    pub fn max_run(self) -> usize {
        match self {
            Variant::Gpt3 => 0,
            Variant::Codex => Self::CODEX_MAX_RUN,
            Variant::WhitespaceMerging { max_run } => max_run,
        }
    }
}

/// Configuration for building a tokenizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizerConfig {
    /// Vocabulary variant
    pub variant: Variant,
    /// Pre-tokenization pattern
    pub pattern: String,
    /// Eviction policy for both memo caches
    pub cache: CachePolicy,
    /// Smallest plausible base vocabulary
    pub min_vocab_size: usize,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            variant: Variant::default(),
            pattern: GPT2_PATTERN.to_string(),
            cache: CachePolicy::default(),
            min_vocab_size: 256,
        }
    }
}

/// Builder for creating a tokenizer.
#[derive(Clone, Default)]
pub struct TokenizerBuilder {
    config: TokenizerConfig,
}

impl TokenizerBuilder {
    /// Create a new tokenizer builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration.
    pub fn with_config(config: TokenizerConfig) -> Self {
        Self { config }
    }

    /// Set the vocabulary variant.
    pub fn variant(mut self, variant: Variant) -> Self {
        self.config.variant = variant;
        self
    }

    /// Set the pre-tokenization pattern.
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.config.pattern = pattern.into();
        self
    }

    /// Set the cache eviction policy.
    pub fn cache_policy(mut self, policy: CachePolicy) -> Self {
        self.config.cache = policy;
        self
    }

    /// Set the vocabulary sanity threshold.
    pub fn min_vocab_size(mut self, size: usize) -> Self {
        self.config.min_vocab_size = size;
        self
    }

    /// Build from already loaded resources.
    pub fn build(self, resources: Resources) -> Result<Tokenizer> {
        Tokenizer::new(self.config, resources)
    }

    /// Build from a vocabulary JSON string and a merge-rule list.
    pub fn build_from_strs(self, vocab_json: &str, merges: &str) -> Result<Tokenizer> {
        self.build(TokenizerLoader::from_strs(vocab_json, merges)?)
    }

    /// Build from a resource directory.
    pub fn build_from_dir(self, path: &Path) -> Result<Tokenizer> {
        self.build(TokenizerLoader::load_dir(path)?)
    }
}

/// One window of a chunked encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunk {
    /// Decoded text of the window
    pub text: String,
    /// Token IDs of the window
    pub ids: Vec<u32>,
}

/// Statistics for both tokenizer caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TokenizerCacheStats {
    /// Token -> merged representation
    pub bpe: CacheStats,
    /// Token -> id sequence
    pub ids: CacheStats,
}

/// Byte-level BPE tokenizer.
///
/// Tables are fixed at construction. Encoding fills two memo caches, so the
/// operations that encode take `&mut self`; share an instance across threads
/// only behind a lock.
pub struct Tokenizer {
    /// Byte <-> symbol mapping
    codec: ByteCodec,
    /// Token string <-> ID
    vocab: VocabTable,
    /// Merge ranks and the merged-representation cache
    engine: BpeEngine,
    /// Text splitter
    pre_tokenizer: PreTokenizer,
    /// Symbol string -> id sequence
    id_cache: MemoCache<Vec<u32>>,
    /// Configuration
    config: TokenizerConfig,
}

impl Tokenizer {
    /// Create a tokenizer from a configuration and its resources.
    pub fn new(config: TokenizerConfig, resources: Resources) -> Result<Self> {
        let max_run = config.variant.max_run();
        if max_run > MAX_WHITESPACE_RUN {
            return Err(TokenizerError::InvalidConfig(format!(
                "whitespace run bound {} exceeds {}",
                max_run, MAX_WHITESPACE_RUN
            )));
        }

        let codec = ByteCodec::new();
        let marker = codec.whitespace_marker();

        let vocab = if max_run > 0 {
            VocabTable::with_whitespace_runs(resources.vocab, marker, max_run)?
        } else {
            VocabTable::new(resources.vocab)
        };
        vocab.validate(&codec, config.min_vocab_size)?;

        let mut ranks = MergeRankTable::parse(&resources.merges)?;
        if max_run > 0 {
            ranks = ranks.with_whitespace_runs(marker, max_run);
        }

        let pre_tokenizer = PreTokenizer::new(&config.pattern)?;

        log::info!(
            "tokenizer ready: {:?}, {} tokens ({} base), {} merge rules",
            config.variant,
            vocab.len(),
            vocab.base_size(),
            ranks.len()
        );
        log::debug!("cache policy: {:?}", config.cache);

        Ok(Self {
            codec,
            vocab,
            engine: BpeEngine::new(ranks, config.cache),
            pre_tokenizer,
            id_cache: MemoCache::new(config.cache),
            config,
        })
    }

    /// Create a tokenizer builder.
    pub fn builder() -> TokenizerBuilder {
        TokenizerBuilder::new()
    }

    /// Encode text to token IDs.
    pub fn encode(&mut self, text: &str) -> Result<Vec<u32>> {
        let mut ids = Vec::new();

        for piece in self.pre_tokenizer.split(text) {
            let symbols = self.codec.encode_bytes(piece?.as_bytes());

            if let Some(cached) = self.id_cache.get(&symbols) {
                ids.extend_from_slice(cached);
                continue;
            }

            let piece_ids = merge_to_ids(&mut self.engine, &self.vocab, &symbols)?;
            ids.extend_from_slice(&piece_ids);
            self.id_cache.insert(&symbols, piece_ids);
        }

        Ok(ids)
    }

    /// Count the tokens `encode` would produce, without mapping them to ids.
    pub fn estimate_token_count(&mut self, text: &str) -> Result<usize> {
        let mut count = 0;

        for piece in self.pre_tokenizer.split(text) {
            let symbols = self.codec.encode_bytes(piece?.as_bytes());
            count += self.engine.bpe(&symbols).split(SYMBOL_SEPARATOR).count();
        }

        Ok(count)
    }

    /// Decode token IDs to raw bytes.
    pub fn decode_bytes(&self, ids: &[u32]) -> Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(ids.len() * 4);
        for &id in ids {
            let token = self.vocab.token(id).ok_or(TokenizerError::InvalidToken(id))?;
            self.codec.decode_into(token, &mut bytes)?;
        }
        Ok(bytes)
    }

    /// Decode token IDs back to text.
    ///
    /// Fails on IDs outside the vocabulary, on tokens holding characters the
    /// byte codec does not know, and on byte sequences that are not UTF-8.
    pub fn decode(&self, ids: &[u32]) -> Result<String> {
        String::from_utf8(self.decode_bytes(ids)?).map_err(|_| TokenizerError::InvalidUtf8)
    }

    /// Decode token IDs, replacing invalid UTF-8 with U+FFFD.
    pub fn decode_lossy(&self, ids: &[u32]) -> Result<String> {
        let bytes = self.decode_bytes(ids)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Encode text and split the IDs into windows of `max_tokens` IDs.
    ///
    /// Every window but the last holds exactly `max_tokens` IDs. Windows are
    /// decoded independently and lossily, since a window edge may fall inside
    /// a multi-byte character.
    pub fn chunk_text(&mut self, text: &str, max_tokens: usize) -> Result<Vec<Chunk>> {
        if max_tokens == 0 {
            return Err(TokenizerError::InvalidConfig(
                "chunk size must be at least one token".to_string(),
            ));
        }

        let ids = self.encode(text)?;
        ids.chunks(max_tokens)
            .map(|window| {
                Ok(Chunk {
                    text: self.decode_lossy(window)?,
                    ids: window.to_vec(),
                })
            })
            .collect()
    }

    /// Statistics for the merge and id caches.
    pub fn cache_stats(&self) -> TokenizerCacheStats {
        TokenizerCacheStats {
            bpe: self.engine.cache_stats(),
            ids: self.id_cache.stats(),
        }
    }

    /// Empty both caches.
    pub fn clear_cache(&mut self) {
        self.engine.clear_cache();
        self.id_cache.clear();
    }

    /// Number of tokens, whitespace runs included.
    pub fn vocab_size(&self) -> usize {
        self.vocab.len()
    }

    /// Number of merge rules.
    pub fn merge_count(&self) -> usize {
        self.engine.ranks().len()
    }

    /// The vocabulary variant.
    pub fn variant(&self) -> Variant {
        self.config.variant
    }

    /// The configuration this tokenizer was built with.
    pub fn config(&self) -> &TokenizerConfig {
        &self.config
    }
}

/// Merge one symbol string and map the surviving symbols to IDs.
fn merge_to_ids(engine: &mut BpeEngine, vocab: &VocabTable, symbols: &str) -> Result<Vec<u32>> {
    engine
        .bpe(symbols)
        .split(SYMBOL_SEPARATOR)
        .map(|symbol| {
            vocab
                .lookup(symbol)
                .ok_or_else(|| TokenizerError::UnknownToken(symbol.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gptbpe_core::Vocab;

    const MERGES: &str =
        "#version: 0.2\nh e\nl l\nhe ll\nhell o\nĠ w\no r\nĠw or\nl d\nĠwor ld\n";

    /// All 256 byte symbols (id = byte value) plus the merged tokens.
    fn resources() -> Resources {
        let codec = ByteCodec::new();
        let mut vocab: Vocab = (0u8..=255)
            .map(|b| (codec.to_symbol(b).to_string().into(), b as u32))
            .collect();
        let merged = ["he", "ll", "hell", "hello", "Ġw", "or", "Ġwor", "ld", "Ġworld"];
        for (i, token) in merged.into_iter().enumerate() {
            vocab.insert(token.into(), 256 + i as u32);
        }
        vocab.insert("▁".into(), 300);

        Resources {
            vocab,
            merges: MERGES.to_string(),
        }
    }

    fn tokenizer(variant: Variant) -> Tokenizer {
        Tokenizer::builder()
            .variant(variant)
            .build(resources())
            .unwrap()
    }

    #[test]
    fn test_encode_merged_words() {
        let mut tokenizer = tokenizer(Variant::Gpt3);
        assert_eq!(tokenizer.encode("hello world").unwrap(), vec![259, 264]);
        assert_eq!(
            tokenizer.encode("hello there").unwrap(),
            vec![259, 32, 116, 256, 114, 101]
        );
        assert_eq!(tokenizer.encode("").unwrap(), Vec::<u32>::new());
        assert_eq!(tokenizer.encode(" ").unwrap(), vec![32]);
    }

    #[test]
    fn test_decode() {
        let tokenizer = tokenizer(Variant::Gpt3);
        assert_eq!(tokenizer.decode(&[259, 264]).unwrap(), "hello world");
        assert_eq!(tokenizer.decode(&[]).unwrap(), "");
        assert_eq!(tokenizer.decode(&[10]).unwrap(), "\n");
    }

    #[test]
    fn test_round_trip() {
        let mut tokenizer = tokenizer(Variant::Gpt3);
        for text in [
            "hello world",
            "Hello, World!\n\tindented   spaces",
            "日本語 and émojis 👋🌍",
            "\u{0}\u{7f} control bytes",
        ] {
            let ids = tokenizer.encode(text).unwrap();
            assert_eq!(tokenizer.decode(&ids).unwrap(), text);
        }
    }

    #[test]
    fn test_whitespace_merging_variant() {
        let mut base = tokenizer(Variant::Gpt3);
        let mut merged = tokenizer(Variant::WhitespaceMerging { max_run: 3 });

        // Base ids end at 300, so runs of 2, 3 and 4 markers take 301, 302 and 303.
        assert_eq!(merged.vocab_size(), base.vocab_size() + 3);
        assert_eq!(merged.merge_count(), base.merge_count() + 3);

        let text = "a    b";
        assert_eq!(base.encode(text).unwrap(), vec![97, 32, 32, 32, 32, 98]);
        assert_eq!(merged.encode(text).unwrap(), vec![97, 302, 32, 98]);
        assert_eq!(merged.decode(&[97, 302, 32, 98]).unwrap(), text);
    }

    #[test]
    fn test_codex_preset() {
        assert_eq!(Variant::Codex.max_run(), 24);
        assert_eq!(Variant::Gpt3.max_run(), 0);

        let tokenizer = tokenizer(Variant::Codex);
        assert_eq!(tokenizer.vocab.lookup("ĠĠ"), Some(301));
        assert_eq!(tokenizer.vocab.lookup(&"Ġ".repeat(25)), Some(324));
    }

    #[test]
    fn test_run_bound_too_large() {
        let err = Tokenizer::builder()
            .variant(Variant::WhitespaceMerging { max_run: 1000 })
            .build(resources())
            .err()
            .unwrap();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_run_ids_overflowing_u32() {
        let mut resources = resources();
        resources.vocab.insert("zz".into(), u32::MAX);

        let err = Tokenizer::builder()
            .variant(Variant::Codex)
            .build(resources)
            .err()
            .unwrap();
        assert!(matches!(err, TokenizerError::InvalidConfig(_)));
    }

    #[test]
    fn test_gpt4_is_an_alias_of_base() {
        let variant: Variant = serde_json::from_str(r#"{"kind": "gpt4"}"#).unwrap();
        assert_eq!(variant, Variant::Gpt3);
        assert_eq!(serde_json::to_string(&variant).unwrap(), r#"{"kind":"gpt3"}"#);
    }

    #[test]
    fn test_estimate_matches_encode() {
        let mut tokenizer = tokenizer(Variant::WhitespaceMerging { max_run: 3 });
        for text in ["", "hello there", "a    b", "hello world\n\n  world"] {
            let count = tokenizer.estimate_token_count(text).unwrap();
            assert_eq!(count, tokenizer.encode(text).unwrap().len(), "{:?}", text);
        }
    }

    #[test]
    fn test_chunk_text() {
        let mut tokenizer = tokenizer(Variant::Gpt3);
        let chunks = tokenizer.chunk_text("hello world hello there", 4).unwrap();

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["hello world hello", " ther", "e"]);
        assert_eq!(chunks[0].ids, vec![259, 264, 32, 259]);
        assert_eq!(chunks[2].ids, vec![101]);

        assert!(tokenizer.chunk_text("", 4).unwrap().is_empty());
        assert!(tokenizer.chunk_text("hello", 0).is_err());
    }

    #[test]
    fn test_chunk_splitting_a_character_is_lossy() {
        let mut tokenizer = tokenizer(Variant::Gpt3);
        // "é" is two bytes with no merge, so two ids.
        let chunks = tokenizer.chunk_text("é", 1).unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text, "\u{FFFD}");
    }

    #[test]
    fn test_decode_errors() {
        let tokenizer = tokenizer(Variant::Gpt3);

        assert!(matches!(
            tokenizer.decode(&[99_999]),
            Err(TokenizerError::InvalidToken(99_999))
        ));
        assert!(matches!(
            tokenizer.decode(&[300]),
            Err(TokenizerError::UnmappedSymbol('▁'))
        ));
        // 0xF0 alone is not UTF-8.
        assert!(matches!(
            tokenizer.decode(&[0xF0]),
            Err(TokenizerError::InvalidUtf8)
        ));
        assert_eq!(tokenizer.decode_lossy(&[0xF0]).unwrap(), "\u{FFFD}");
        assert_eq!(tokenizer.decode_bytes(&[0xF0]).unwrap(), vec![0xF0]);
    }

    #[test]
    fn test_unknown_merged_token() {
        let mut resources = resources();
        resources.vocab.remove("he");
        let mut tokenizer = Tokenizer::builder().build(resources).unwrap();

        let err = tokenizer.encode("he").unwrap_err();
        assert!(matches!(err, TokenizerError::UnknownToken(ref t) if t == "he"));
        assert!(!err.is_configuration());
    }

    #[test]
    fn test_implausible_vocabulary() {
        let err = Tokenizer::builder()
            .min_vocab_size(50_000)
            .build(resources())
            .err()
            .unwrap();
        assert!(matches!(err, TokenizerError::InvalidConfig(_)));

        let mut resources = resources();
        resources.vocab.remove("Ġ");
        assert!(Tokenizer::builder().build(resources).is_err());
    }

    #[test]
    fn test_bad_pattern() {
        let err = Tokenizer::builder()
            .pattern("(")
            .build(resources())
            .err()
            .unwrap();
        assert!(matches!(err, TokenizerError::Pattern(_)));
    }

    #[test]
    fn test_caches() {
        let mut tokenizer = tokenizer(Variant::Gpt3);
        tokenizer.encode("hello").unwrap();
        tokenizer.encode("hello").unwrap();

        let stats = tokenizer.cache_stats();
        assert_eq!((stats.ids.hits, stats.ids.misses), (1, 1));
        assert_eq!((stats.bpe.hits, stats.bpe.misses), (0, 1));

        // Single-symbol pieces get an id entry but no merge entry.
        tokenizer.encode("!").unwrap();
        let stats = tokenizer.cache_stats();
        assert_eq!(stats.ids.entries, 2);
        assert_eq!(stats.bpe.entries, 1);

        tokenizer.clear_cache();
        let stats = tokenizer.cache_stats();
        assert_eq!((stats.ids.entries, stats.bpe.entries), (0, 0));
    }

    #[test]
    fn test_bounded_cache_gives_same_ids() {
        let mut bounded = Tokenizer::builder()
            .cache_policy(CachePolicy::Lru { capacity: 1 })
            .build(resources())
            .unwrap();
        let mut unbounded = tokenizer(Variant::Gpt3);

        let text = "hello world hello there world";
        assert_eq!(bounded.encode(text).unwrap(), unbounded.encode(text).unwrap());
        assert!(bounded.cache_stats().ids.entries <= 1);
    }

    #[test]
    fn test_config_serde() {
        let config: TokenizerConfig = serde_json::from_str(
            r#"{"variant": {"kind": "whitespace_merging", "max_run": 8},
                "cache": {"kind": "lru", "capacity": 1024}}"#,
        )
        .unwrap();
        assert_eq!(config.variant, Variant::WhitespaceMerging { max_run: 8 });
        assert_eq!(config.cache, CachePolicy::Lru { capacity: 1024 });
        assert_eq!(config.pattern, GPT2_PATTERN);
        assert_eq!(config.min_vocab_size, 256);

        let tokenizer = TokenizerBuilder::with_config(config)
            .build(resources())
            .unwrap();
        assert_eq!(tokenizer.variant().max_run(), 8);
    }
}
