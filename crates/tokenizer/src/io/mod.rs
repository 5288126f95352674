//! Loading of vocabulary and merge-rule resources.
//!
//! Two directory layouts are understood (GPT-2 release files and
//! HuggingFace files); both can also be supplied as in-memory strings.

pub mod format;
pub mod load;

pub use format::ResourceLayout;
pub use load::{Resources, TokenizerLoader};
