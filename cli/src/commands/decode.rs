//! Decode command implementation.

use clap::Parser;

/// Decode command arguments.
#[derive(Parser)]
pub struct DecodeCommand {
    #[command(flatten)]
    pub tokenizer: TokenizerArgs,

    /// Token IDs to decode, separated by spaces or commas ("-" reads stdin)
    #[arg(short, long)]
    pub ids: String,

    /// Replace invalid UTF-8 instead of failing
    #[arg(short, long, default_value_t = false)]
    pub lossy: bool,
}

use super::{read_input, TokenizerArgs};
use anyhow::{Context, Result as AnyhowResult};

pub fn run(cmd: DecodeCommand) -> AnyhowResult<()> {
    let tokenizer = cmd.tokenizer.load()?;
    let input = read_input(cmd.ids)?;

    let ids: Vec<u32> = input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u32>()
                .with_context(|| format!("invalid token ID {:?}", s))
        })
        .collect::<AnyhowResult<Vec<_>>>()?;

    let text = if cmd.lossy {
        tokenizer.decode_lossy(&ids)?
    } else {
        tokenizer.decode(&ids)?
    };

    print!("{}", text);

    Ok(())
}
