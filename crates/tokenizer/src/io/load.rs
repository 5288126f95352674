//! Loading of pre-trained vocabulary resources.
//!
//! Resources are read whole into memory once, at construction time. Nothing
//! here is touched again after a tokenizer has been built.

use super::format::ResourceLayout;
use gptbpe_core::{Result, TokenizerError, Vocab};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Raw resources for one tokenizer: the base vocabulary and the unparsed
/// merge-rule text.
#[derive(Debug, Clone)]
pub struct Resources {
    /// Base token -> id mapping
    pub vocab: Vocab,
    /// Merge-rule list, first and last lines reserved
    pub merges: String,
}

/// Resource loader for vocabulary directories and in-memory strings.
pub struct TokenizerLoader;

impl TokenizerLoader {
    /// Load resources from a directory, detecting its layout.
    pub fn load_dir(path: &Path) -> Result<Resources> {
        let layout = ResourceLayout::detect(path).ok_or_else(|| {
            TokenizerError::Load(format!(
                "No vocabulary found in {} (expected {} or {})",
                path.display(),
                ResourceLayout::Gpt2.vocab_file(),
                ResourceLayout::HuggingFace.vocab_file()
            ))
        })?;
        Self::load_layout(path, layout)
    }

    /// Load resources from a directory in the given layout.
    pub fn load_layout(path: &Path, layout: ResourceLayout) -> Result<Resources> {
        let vocab_path = path.join(layout.vocab_file());
        let merges_path = path.join(layout.merges_file());
        log::debug!("loading {:?} resources from {}", layout, path.display());

        let vocab_file = File::open(&vocab_path).map_err(|err| missing(&vocab_path, err))?;
        let vocab_map: HashMap<String, u32> = serde_json::from_reader(BufReader::new(vocab_file))
            .map_err(|e| {
                TokenizerError::Load(format!(
                    "Failed to deserialize {}: {}",
                    vocab_path.display(),
                    e
                ))
            })?;

        let merges =
            std::fs::read_to_string(&merges_path).map_err(|err| missing(&merges_path, err))?;

        Ok(Resources {
            vocab: into_vocab(vocab_map),
            merges,
        })
    }

    /// Build resources from the two resource texts.
    pub fn from_strs(vocab_json: &str, merges: &str) -> Result<Resources> {
        let vocab_map: HashMap<String, u32> = serde_json::from_str(vocab_json)?;
        Ok(Resources {
            vocab: into_vocab(vocab_map),
            merges: merges.to_string(),
        })
    }
}

fn missing(path: &Path, err: std::io::Error) -> TokenizerError {
    TokenizerError::MissingResource {
        path: PathBuf::from(path),
        err,
    }
}

fn into_vocab(map: HashMap<String, u32>) -> Vocab {
    let mut vocab = Vocab::with_capacity(map.len());
    for (token, id) in map {
        vocab.insert(token.into(), id);
    }
    vocab
}
