//! Count command implementation.

use clap::Parser;

/// Count command arguments.
#[derive(Parser)]
pub struct CountCommand {
    #[command(flatten)]
    pub tokenizer: TokenizerArgs,

    /// Text to count ("-" reads stdin)
    #[arg(short, long)]
    pub input: String,
}

use super::{read_input, TokenizerArgs};
use anyhow::Result as AnyhowResult;

pub fn run(cmd: CountCommand) -> AnyhowResult<()> {
    let mut tokenizer = cmd.tokenizer.load()?;
    let input_text = read_input(cmd.input)?;

    println!("{}", tokenizer.estimate_token_count(&input_text)?);

    Ok(())
}
