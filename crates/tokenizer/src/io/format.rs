//! Resource layouts for pre-trained vocabularies.
//!
//! A vocabulary directory holds two files: a JSON object mapping token
//! strings to ids, and a text file of merge rules. The file names depend on
//! where the resources came from.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Known resource directory layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceLayout {
    /// GPT-2 release files (encoder.json + vocab.bpe)
    Gpt2,
    /// HuggingFace tokenizer files (vocab.json + merges.txt)
    HuggingFace,
}

impl ResourceLayout {
    /// All layouts, in detection order.
    pub const ALL: [ResourceLayout; 2] = [ResourceLayout::Gpt2, ResourceLayout::HuggingFace];

    /// File name of the token -> id mapping.
    pub fn vocab_file(self) -> &'static str {
        match self {
            ResourceLayout::Gpt2 => "encoder.json",
            ResourceLayout::HuggingFace => "vocab.json",
        }
    }

    /// File name of the merge-rule list.
    pub fn merges_file(self) -> &'static str {
        match self {
            ResourceLayout::Gpt2 => "vocab.bpe",
            ResourceLayout::HuggingFace => "merges.txt",
        }
    }

    /// Pick the first layout whose vocabulary file exists in `dir`.
    pub fn detect(dir: &Path) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|layout| dir.join(layout.vocab_file()).is_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_names() {
        assert_eq!(ResourceLayout::Gpt2.vocab_file(), "encoder.json");
        assert_eq!(ResourceLayout::Gpt2.merges_file(), "vocab.bpe");
        assert_eq!(ResourceLayout::HuggingFace.vocab_file(), "vocab.json");
        assert_eq!(ResourceLayout::HuggingFace.merges_file(), "merges.txt");
    }

    #[test]
    fn test_detect() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(ResourceLayout::detect(dir.path()), None);

        std::fs::write(dir.path().join("vocab.json"), "{}").unwrap();
        assert_eq!(
            ResourceLayout::detect(dir.path()),
            Some(ResourceLayout::HuggingFace)
        );

        std::fs::write(dir.path().join("encoder.json"), "{}").unwrap();
        assert_eq!(ResourceLayout::detect(dir.path()), Some(ResourceLayout::Gpt2));
    }

    #[test]
    fn test_serde_names() {
        let layout: ResourceLayout = serde_json::from_str(r#""hugging_face""#).unwrap();
        assert_eq!(layout, ResourceLayout::HuggingFace);
    }
}
