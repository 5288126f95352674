//! Encode command implementation.

use clap::Parser;

/// Encode command arguments.
#[derive(Parser)]
pub struct EncodeCommand {
    #[command(flatten)]
    pub tokenizer: TokenizerArgs,

    /// Text to encode ("-" reads stdin)
    #[arg(short, long)]
    pub input: String,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<String>,
}

use super::{read_input, TokenizerArgs};
use anyhow::Result as AnyhowResult;

pub fn run(cmd: EncodeCommand) -> AnyhowResult<()> {
    let mut tokenizer = cmd.tokenizer.load()?;
    let input_text = read_input(cmd.input)?;

    let ids = tokenizer.encode(&input_text)?;

    let ids_str: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
    let output = ids_str.join(" ");

    match &cmd.output {
        Some(path) => {
            std::fs::write(path, &output)?;
            println!("Encoded {} tokens to {}", ids.len(), path);
        }
        None => {
            println!("{}", output);
        }
    }

    Ok(())
}
