//! Text splitting for pre-tokenization.
//!
//! BPE runs independently on each piece produced here, so the splitting
//! pattern decides which byte sequences can ever share a token. The pattern is
//! compiled once and checked before use.

use fancy_regex::Regex;
use gptbpe_core::{Result, TokenizerError};

/// GPT-2 splitting pattern: contractions, letter runs, digit runs, punctuation
/// runs (each optionally led by one space), whitespace not followed by a
/// non-space, and any remaining whitespace.
pub const GPT2_PATTERN: &str =
    r"'s|'t|'re|'ve|'m|'ll|'d| ?\p{L}+| ?\p{N}+| ?[^\s\p{L}\p{N}]+|\s+(?!\S)|\s+";

/// Trailing alternatives that are matched as plain `\s+` plus a give-back of
/// the last whitespace character, instead of through the backtracking VM.
const TRAILING_WHITESPACE_ALTS: &str = r"|\s+(?!\S)|\s+";

/// Regex-driven pre-tokenizer.
#[derive(Debug, Clone)]
pub struct PreTokenizer {
    /// Compiled matcher, lookahead-free when `give_back` is set
    regex: Regex,
    /// Pattern as supplied
    source: String,
    /// Shorten whitespace runs followed by a non-space by one character
    give_back: bool,
}

impl PreTokenizer {
    /// Compile a splitting pattern.
    ///
    /// Patterns that can match the empty string are rejected, since they would
    /// yield empty pieces. A pattern ending in `\s+(?!\S)|\s+` is compiled
    /// without the lookahead, so long whitespace runs never exhaust the
    /// backtracking stack.
    pub fn new(pattern: &str) -> Result<Self> {
        let (compiled, give_back) = match pattern.strip_suffix(TRAILING_WHITESPACE_ALTS) {
            Some(head) => (format!(r"{}|\s+", head), true),
            None => (pattern.to_string(), false),
        };

        let regex = Regex::new(&compiled)
            .map_err(|e| TokenizerError::Pattern(format!("{}: {}", pattern, e)))?;

        let matches_empty = regex
            .is_match("")
            .map_err(|e| TokenizerError::Pattern(e.to_string()))?;
        if matches_empty {
            return Err(TokenizerError::Pattern(format!(
                "pattern {:?} matches the empty string",
                pattern
            )));
        }

        log::debug!("pre-tokenizer compiled (whitespace give-back: {})", give_back);

        Ok(Self {
            regex,
            source: pattern.to_string(),
            give_back,
        })
    }

    /// The GPT-2 / GPT-3 / Codex pre-tokenizer.
    pub fn gpt2() -> Result<Self> {
        Self::new(GPT2_PATTERN)
    }

    /// The source pattern.
    pub fn pattern(&self) -> &str {
        &self.source
    }

    /// Lazily split text into pieces, leftmost-first and non-overlapping.
    ///
    /// An item is an error only when the regex engine gives up (backtrack
    /// limit), never for ordinary input.
    pub fn split<'r, 't>(&'r self, text: &'t str) -> Pieces<'r, 't> {
        Pieces {
            pre_tokenizer: self,
            text,
            pos: 0,
        }
    }

    /// Split text into a vector of pieces.
    pub fn split_all<'t>(&self, text: &'t str) -> Result<Vec<&'t str>> {
        self.split(text).collect()
    }

    /// End of the piece `text[start..end]`, one character shorter when it is a
    /// whitespace run of two or more characters followed by a non-space.
    fn piece_end(&self, text: &str, start: usize, end: usize) -> usize {
        if !self.give_back {
            return end;
        }

        let piece = &text[start..end];
        if !piece.chars().all(char::is_whitespace) {
            return end;
        }
        let followed_by_text = text[end..].chars().next().is_some_and(|c| !c.is_whitespace());
        if !followed_by_text {
            return end;
        }

        let mut chars = piece.chars();
        match (chars.next_back(), chars.next()) {
            (Some(last), Some(_)) => end - last.len_utf8(),
            _ => end,
        }
    }
}

/// Iterator over the pieces of one text.
pub struct Pieces<'r, 't> {
    pre_tokenizer: &'r PreTokenizer,
    text: &'t str,
    pos: usize,
}

impl<'r, 't> Iterator for Pieces<'r, 't> {
    type Item = Result<&'t str>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos < self.text.len() {
            let found = match self.pre_tokenizer.regex.find_from_pos(self.text, self.pos) {
                Ok(Some(found)) => found,
                Ok(None) => break,
                Err(e) => {
                    self.pos = self.text.len();
                    return Some(Err(TokenizerError::Pattern(e.to_string())));
                }
            };

            let start = found.start();
            if found.end() == start {
                // Empty match: step over one character.
                let step = self.text[start..].chars().next().map_or(1, char::len_utf8);
                self.pos = start + step;
                continue;
            }

            let end = self.pre_tokenizer.piece_end(self.text, start, found.end());
            self.pos = end;
            return Some(Ok(&self.text[start..end]));
        }

        self.pos = self.text.len();
        None
    }
}
