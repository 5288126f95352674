//! gptbpe CLI - Command-line interface for the GPT-2/GPT-3/Codex tokenizer.
//!
//! This is the main entry point for the `gptbpe` command-line tool.

mod commands;

use clap::{Parser, Subcommand};
use commands::{BenchmarkCommand, ChunkCommand, CountCommand, DecodeCommand, EncodeCommand};

#[derive(Parser)]
#[command(name = "gptbpe")]
#[command(about = "Byte-level BPE tokenizer for GPT-2, GPT-3 and Codex", long_about = None)]
#[command(version)]
struct Cli {
    /// Log more (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode text to token IDs
    Encode(EncodeCommand),
    /// Decode token IDs back to text
    Decode(DecodeCommand),
    /// Count the tokens in a text
    Count(CountCommand),
    /// Split a text into fixed-size token windows (JSON lines)
    Chunk(ChunkCommand),
    /// Benchmark encoding performance
    Benchmark(BenchmarkCommand),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Commands::Encode(cmd) => commands::encode::run(cmd)?,
        Commands::Decode(cmd) => commands::decode::run(cmd)?,
        Commands::Count(cmd) => commands::count::run(cmd)?,
        Commands::Chunk(cmd) => commands::chunk::run(cmd)?,
        Commands::Benchmark(cmd) => commands::benchmark::run(cmd)?,
    }

    Ok(())
}
