//! Merge rule management for BPE.
//!
//! Merge rules are pairs of adjacent symbol strings. A rule's rank is its
//! position in the merge list: lower rank = higher priority. Pairs are keyed
//! by `CompactString`, so building a lookup key for a typical short token
//! does not touch the heap.

use crate::core::vocab::whitespace_run;
use crate::error::{Result, TokenizerError};
use ahash::AHashMap;
use compact_str::CompactString;

/// A pair of adjacent symbol strings that can be merged.
pub type Pair = (CompactString, CompactString);

/// Merge rule mapping: pair -> rank.
pub type MergeMap = AHashMap<Pair, u32>;

/// Ordered BPE merge rules with rank lookup.
#[derive(Debug, Clone, Default)]
pub struct MergeRankTable {
    /// Merge rules: pair -> rank
    ranks: MergeMap,
    /// Rank handed to the next appended rule
    next_rank: u32,
}

impl MergeRankTable {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a merge-rule resource.
    ///
    /// The first line (a version header) and the last line (empty after the
    /// trailing newline) are reserved and skipped. Every other line holds two
    /// whitespace-separated symbol strings; blank lines are tolerated but still
    /// consume a rank, so ranks always equal line positions.
    pub fn parse(text: &str) -> Result<Self> {
        let lines: Vec<&str> = text.split('\n').collect();
        let body = match lines.len() {
            0..=2 => &[][..],
            n => &lines[1..n - 1],
        };

        let mut table = Self {
            ranks: MergeMap::with_capacity(body.len()),
            next_rank: 0,
        };

        for (offset, line) in body.iter().enumerate() {
            let mut parts = line.split_whitespace();
            match (parts.next(), parts.next(), parts.next()) {
                (None, _, _) => table.next_rank += 1,
                (Some(first), Some(second), None) => table.push_rule(first, second),
                _ => {
                    return Err(TokenizerError::Load(format!(
                        "Invalid merge format at line {}: '{}'",
                        offset + 2,
                        line.trim_end()
                    )))
                }
            }
        }

        Ok(table)
    }

    /// Build a table from pairs, ranked in order (0, 1, 2, ...).
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut table = Self::new();
        for (first, second) in pairs {
            table.push_rule(first, second);
        }
        table
    }

    /// Append a rule with the next rank.
    ///
    /// A pair that already has a rule takes the new, lower priority.
    pub fn push_rule(&mut self, first: &str, second: &str) {
        let rank = self.next_rank;
        self.next_rank += 1;

        let pair = (CompactString::new(first), CompactString::new(second));
        if let Some(previous) = self.ranks.insert(pair, rank) {
            log::debug!(
                "merge rule ({}, {}) re-ranked from {} to {}",
                first,
                second,
                previous,
                rank
            );
        }
    }

    /// Append the synthetic rules joining whitespace runs.
    ///
    /// For every `i, j` in `1..max_run` with `i + j <= max_run`, a rule merging
    /// a run of `i` markers with a run of `j` markers is appended, `i` outer.
    pub fn with_whitespace_runs(mut self, marker: char, max_run: usize) -> Self {
        for i in 1..max_run {
            for j in 1..max_run {
                if i + j <= max_run {
                    let left = whitespace_run(marker, i);
                    let right = whitespace_run(marker, j);
                    self.push_rule(&left, &right);
                }
            }
        }
        self
    }

    /// Get the rank of a pair, or `None` if no rule merges it.
    #[inline]
    pub fn lookup(&self, first: &str, second: &str) -> Option<u32> {
        let key = (CompactString::new(first), CompactString::new(second));
        self.ranks.get(&key).copied()
    }

    /// Get the number of distinct merge rules.
    #[inline]
    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    /// Check if there are no merge rules.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skips_reserved_lines() {
        let text = "#version: 0.2\nĠ t\nĠ a\nh e\n";
        let table = MergeRankTable::parse(text).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.lookup("Ġ", "t"), Some(0));
        assert_eq!(table.lookup("Ġ", "a"), Some(1));
        assert_eq!(table.lookup("h", "e"), Some(2));
        assert_eq!(table.lookup("e", "h"), None);
    }

    #[test]
    fn test_parse_drops_unterminated_last_line() {
        // Without a trailing newline the last rule sits on the reserved line.
        let table = MergeRankTable::parse("#version: 0.2\nh e\nl l").unwrap();
        assert_eq!(table.lookup("h", "e"), Some(0));
        assert_eq!(table.lookup("l", "l"), None);
    }

    #[test]
    fn test_parse_blank_line_keeps_positions() {
        let table = MergeRankTable::parse("#version\nh e\n\nl l\n").unwrap();
        assert_eq!(table.lookup("h", "e"), Some(0));
        assert_eq!(table.lookup("l", "l"), Some(2));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_parse_rejects_malformed_line() {
        let err = MergeRankTable::parse("#version\nh e\na b c\n").unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn test_parse_tiny_resources() {
        assert!(MergeRankTable::parse("").unwrap().is_empty());
        assert!(MergeRankTable::parse("#version\n").unwrap().is_empty());
    }

    #[test]
    fn test_whitespace_runs() {
        let table = MergeRankTable::from_pairs([("h", "e")]).with_whitespace_runs('Ġ', 3);

        // (1,1), (1,2), (2,1) follow the natural rule.
        assert_eq!(table.lookup("h", "e"), Some(0));
        assert_eq!(table.lookup("Ġ", "Ġ"), Some(1));
        assert_eq!(table.lookup("Ġ", "ĠĠ"), Some(2));
        assert_eq!(table.lookup("ĠĠ", "Ġ"), Some(3));
        assert_eq!(table.lookup("ĠĠ", "ĠĠ"), None);
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn test_synthetic_rule_demotes_natural_duplicate() {
        let table =
            MergeRankTable::from_pairs([("Ġ", "Ġ"), ("h", "e")]).with_whitespace_runs('Ġ', 2);
        assert_eq!(table.lookup("Ġ", "Ġ"), Some(2));
        assert_eq!(table.lookup("h", "e"), Some(1));
        assert_eq!(table.len(), 2);
    }
}
