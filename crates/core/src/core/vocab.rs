//! Vocabulary storage and lookup.
//!
//! Token strings are byte-level symbol strings (see [`ByteCodec`]); ids are the
//! integers the model sees. Storage uses `AHashMap` for fast lookups and
//! `CompactString` so that the many short tokens stay inline.

use crate::encoding::ByteCodec;
use crate::error::{Result, TokenizerError};
use ahash::AHashMap;
use compact_str::CompactString;

/// Forward mapping: token string -> ID
pub type Vocab = AHashMap<CompactString, u32>;

/// Reverse mapping: ID -> token string
pub type VocabR = AHashMap<u32, CompactString>;

/// Repeat the whitespace marker `len` times.
pub(crate) fn whitespace_run(marker: char, len: usize) -> CompactString {
    std::iter::repeat(marker).take(len).collect()
}

/// Vocabulary with forward and reverse mappings.
///
/// Both directions are built once at construction and never change afterwards.
#[derive(Debug, Clone)]
pub struct VocabTable {
    /// Forward mapping: token string -> ID
    vocab: Vocab,
    /// Reverse mapping: ID -> token string
    vocab_r: VocabR,
    /// Number of entries in the base resource
    base_size: usize,
}

impl VocabTable {
    /// Build a table from the base token -> id mapping.
    pub fn new(base: Vocab) -> Self {
        let base_size = base.len();
        Self::finish(base, base_size)
    }

    /// Build a table that also knows whitespace-run tokens.
    ///
    /// Runs of the marker of length 2 through `max_run + 1` get consecutive ids
    /// starting right after the highest base id, replacing any base entry with
    /// the same string. Fails if those ids do not fit in a `u32`.
    pub fn with_whitespace_runs(mut base: Vocab, marker: char, max_run: usize) -> Result<Self> {
        let base_size = base.len();
        let max_base_id = base.values().max().copied();

        let first_id = match max_base_id {
            Some(max) => max.checked_add(1),
            None => Some(0),
        };
        let fits = match (first_id, max_run) {
            (_, 0) => true,
            (Some(first), n) => u32::try_from(n - 1)
                .ok()
                .and_then(|last| first.checked_add(last))
                .is_some(),
            (None, _) => false,
        };
        if !fits {
            return Err(TokenizerError::InvalidConfig(format!(
                "{} whitespace-run ids do not fit after base id {}",
                max_run,
                max_base_id.unwrap_or(0)
            )));
        }
        let first_id = first_id.unwrap_or(0);

        for i in 0..max_run {
            let run = whitespace_run(marker, i + 2);
            if let Some(previous) = base.insert(run, first_id + i as u32) {
                log::debug!("whitespace run of length {} replaces base id {}", i + 2, previous);
            }
        }

        Ok(Self::finish(base, base_size))
    }

    fn finish(vocab: Vocab, base_size: usize) -> Self {
        let vocab_r = vocab.iter().map(|(token, &id)| (id, token.clone())).collect();
        Self {
            vocab,
            vocab_r,
            base_size,
        }
    }

    /// Get the ID for a token string.
    #[inline]
    pub fn lookup(&self, token: &str) -> Option<u32> {
        self.vocab.get(token).copied()
    }

    /// Get the token string for an ID.
    #[inline]
    pub fn token(&self, id: u32) -> Option<&str> {
        self.vocab_r.get(&id).map(|s| s.as_str())
    }

    /// Number of token strings, synthetic entries included.
    #[inline]
    pub fn len(&self) -> usize {
        self.vocab.len()
    }

    /// Check if the vocabulary is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vocab.is_empty()
    }

    /// Number of entries the base resource contributed.
    #[inline]
    pub fn base_size(&self) -> usize {
        self.base_size
    }

    /// One past the highest id in the table.
    pub fn id_span(&self) -> usize {
        self.vocab_r.keys().max().map_or(0, |&max| max as usize + 1)
    }

    /// Reject vocabularies that cannot possibly encode arbitrary text.
    ///
    /// The base must hold at least `min_size` entries and every single-byte
    /// symbol, so that an unmergeable symbol always has an id. No two tokens
    /// may share an id, or decoding that id would be ambiguous.
    pub fn validate(&self, codec: &ByteCodec, min_size: usize) -> Result<()> {
        if self.base_size < min_size {
            return Err(TokenizerError::InvalidConfig(format!(
                "vocabulary has {} entries, expected at least {}",
                self.base_size, min_size
            )));
        }

        let mut buf = [0u8; 4];
        for byte in 0u8..=255 {
            let symbol = codec.to_symbol(byte).encode_utf8(&mut buf);
            if !self.vocab.contains_key(&*symbol) {
                return Err(TokenizerError::InvalidConfig(format!(
                    "vocabulary has no token for byte 0x{:02X} ({:?})",
                    byte, symbol
                )));
            }
        }

        if self.vocab_r.len() != self.vocab.len() {
            let mut ids: Vec<u32> = self.vocab.values().copied().collect();
            ids.sort_unstable();
            let shared = ids.windows(2).find(|w| w[0] == w[1]).map_or(0, |w| w[0]);
            return Err(TokenizerError::InvalidConfig(format!(
                "vocabulary maps {} tokens to {} ids (id {} is shared)",
                self.vocab.len(),
                self.vocab_r.len(),
                shared
            )));
        }

        Ok(())
    }
}
