//! Chunk command implementation.

use clap::Parser;

/// Chunk command arguments.
#[derive(Parser)]
pub struct ChunkCommand {
    #[command(flatten)]
    pub tokenizer: TokenizerArgs,

    /// Text to chunk ("-" reads stdin)
    #[arg(short, long)]
    pub input: String,

    /// Maximum number of tokens per chunk
    #[arg(short, long)]
    pub max_tokens: usize,
}

use super::{read_input, TokenizerArgs};
use anyhow::Result as AnyhowResult;

/// Print one JSON object per chunk.
pub fn run(cmd: ChunkCommand) -> AnyhowResult<()> {
    let mut tokenizer = cmd.tokenizer.load()?;
    let input_text = read_input(cmd.input)?;

    for chunk in tokenizer.chunk_text(&input_text, cmd.max_tokens)? {
        println!("{}", serde_json::to_string(&chunk)?);
    }

    Ok(())
}
