//! Benchmark command implementation.

use clap::Parser;

/// Benchmark command arguments.
#[derive(Parser)]
pub struct BenchmarkCommand {
    #[command(flatten)]
    pub tokenizer: TokenizerArgs,

    /// Path to input text file for benchmarking
    #[arg(short, long)]
    pub input: String,

    /// Number of iterations to run
    #[arg(short = 'n', long, default_value_t = 100)]
    pub iterations: usize,
}

use super::TokenizerArgs;
use anyhow::Result as AnyhowResult;
use std::fs;
use std::time::Instant;

pub fn run(cmd: BenchmarkCommand) -> AnyhowResult<()> {
    let mut tokenizer = cmd.tokenizer.load()?;
    let text = fs::read_to_string(&cmd.input)?;
    let iterations = cmd.iterations.max(1);

    println!("Benchmarking encoding...");
    println!("  Text length: {} bytes", text.len());
    println!("  Iterations: {}", iterations);
    println!();

    // Cold: every piece misses both caches
    let start = Instant::now();
    let token_count = tokenizer.encode(&text)?.len();
    let cold = start.elapsed();

    let start = Instant::now();
    for _ in 0..iterations {
        tokenizer.encode(&text)?;
    }
    let warm = start.elapsed() / iterations as u32;

    let stats = tokenizer.cache_stats();
    log::debug!("cache stats: {:?}", stats);

    println!("Results:");
    println!("  Tokens: {}", token_count);
    println!("  Cold encode: {:.3}ms", cold.as_secs_f64() * 1000.0);
    println!("  Warm encode: {:.3}ms", warm.as_secs_f64() * 1000.0);
    println!(
        "  Throughput (warm): {:.0} tokens/s",
        token_count as f64 / warm.as_secs_f64().max(f64::EPSILON)
    );
    println!(
        "  Cache entries: {} merged, {} id sequences",
        stats.bpe.entries, stats.ids.entries
    );
    if let Some(rate) = stats.ids.hit_rate() {
        println!("  Id cache hit rate: {:.1}%", rate * 100.0);
    }

    Ok(())
}
