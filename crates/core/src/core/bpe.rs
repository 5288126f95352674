//! Greedy BPE merge engine.
//!
//! A token (one pre-tokenized chunk rendered as byte-level symbols) starts as
//! a word of single symbols. Each round picks the adjacent pair with the
//! lowest merge rank, ties going to the leftmost occurrence, and fuses every
//! non-overlapping occurrence of that pair from left to right. Merging stops
//! when one symbol is left or no adjacent pair has a rule.
//!
//! The result is the surviving symbols joined by [`SYMBOL_SEPARATOR`]. Results
//! are memoized per token; the worst case is O(L²) rank lookups for a token of
//! L symbols, paid once per distinct token.

use crate::core::merges::MergeRankTable;
use crate::utils::{CachePolicy, CacheStats, MemoCache};
use compact_str::CompactString;

/// Separator between symbols in a merged representation.
///
/// Never part of a symbol: the space byte is encoded as `Ġ`.
pub const SYMBOL_SEPARATOR: char = ' ';

/// BPE merge engine with a per-token memo cache.
pub struct BpeEngine {
    /// Merge priorities
    ranks: MergeRankTable,
    /// token -> merged representation
    cache: MemoCache<CompactString>,
}

impl BpeEngine {
    /// Create an engine over `ranks`, memoizing under `policy`.
    pub fn new(ranks: MergeRankTable, policy: CachePolicy) -> Self {
        Self {
            ranks,
            cache: MemoCache::new(policy),
        }
    }

    /// Merge a token and return its symbols joined by [`SYMBOL_SEPARATOR`].
    ///
    /// Tokens of fewer than two symbols come back unchanged and are not cached.
    pub fn bpe(&mut self, token: &str) -> CompactString {
        if let Some(merged) = self.cache.get(token) {
            return merged.clone();
        }

        let word = split_symbols(token);
        if word.len() < 2 {
            return CompactString::new(token);
        }

        let word = self.merge_word(word);

        let mut merged = CompactString::with_capacity(token.len() + word.len());
        for (i, symbol) in word.iter().enumerate() {
            if i > 0 {
                merged.push(SYMBOL_SEPARATOR);
            }
            merged.push_str(symbol);
        }

        self.cache.insert(token, merged.clone());
        merged
    }

    /// Merge a token without consulting or filling the cache.
    pub fn merge_symbols(&self, token: &str) -> Vec<CompactString> {
        self.merge_word(split_symbols(token))
    }

    fn merge_word(&self, mut word: Vec<CompactString>) -> Vec<CompactString> {
        while word.len() > 1 {
            let Some(at) = self.best_pair(&word) else {
                break;
            };
            let first = word[at].clone();
            let second = word[at + 1].clone();
            word = apply_merge(word, &first, &second);
        }
        word
    }

    /// Index of the leftmost occurrence of the lowest-ranked adjacent pair.
    ///
    /// Pairs without a rule never win; `None` means nothing can merge.
    fn best_pair(&self, word: &[CompactString]) -> Option<usize> {
        let mut best: Option<(u32, usize)> = None;

        for (i, pair) in word.windows(2).enumerate() {
            let Some(rank) = self.ranks.lookup(&pair[0], &pair[1]) else {
                continue;
            };
            if best.map_or(true, |(best_rank, _)| rank < best_rank) {
                best = Some((rank, i));
            }
        }

        best.map(|(_, i)| i)
    }

    /// Merge rules in use.
    pub fn ranks(&self) -> &MergeRankTable {
        &self.ranks
    }

    /// Statistics for the merge cache.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Drop every memoized merge.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}

/// One symbol per character.
fn split_symbols(token: &str) -> Vec<CompactString> {
    token
        .char_indices()
        .map(|(i, ch)| CompactString::new(&token[i..i + ch.len_utf8()]))
        .collect()
}

/// Fuse every non-overlapping `first second` occurrence, scanning left to right.
fn apply_merge(word: Vec<CompactString>, first: &str, second: &str) -> Vec<CompactString> {
    let mut merged = Vec::with_capacity(word.len() - 1);
    let mut symbols = word.into_iter().peekable();

    while let Some(symbol) = symbols.next() {
        if symbol == first && symbols.peek().is_some_and(|next| next == second) {
            let mut joined = symbol;
            joined.push_str(second);
            symbols.next();
            merged.push(joined);
        } else {
            merged.push(symbol);
        }
    }

    merged
}
