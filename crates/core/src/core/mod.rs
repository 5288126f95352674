//! Core BPE tables and merge algorithm.
//!
//! This module contains the vocabulary and merge-rank tables plus the greedy
//! merge engine that runs over them.

pub mod bpe;
pub mod merges;
pub mod vocab;

pub use bpe::{BpeEngine, SYMBOL_SEPARATOR};
pub use merges::{MergeMap, MergeRankTable, Pair};
pub use vocab::{Vocab, VocabR, VocabTable};
