use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "item_pipeline")]
#[command(about = "Drive a consumer/processor pipeline with a sequential or pooled runtime")]
#[command(version)]
pub struct Cli {
    /// Default log filter (RUST_LOG takes precedence)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Consume a counting stream and print every item
    Run {
        /// Runtime strategy
        #[arg(short, long, value_enum, default_value = "pipe")]
        strategy: Strategy,

        /// Number of items produced before the stream ends
        #[arg(short = 'n', long, default_value = "10")]
        items: u64,

        /// Maximum number of concurrent processors (pipe only)
        #[arg(short = 'w', long)]
        max_concurrent: Option<usize>,

        /// JSON config file with a "pipeline" section
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Simulated processing time per item in milliseconds
        #[arg(long, default_value = "0")]
        delay_ms: u64,
    },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    Sequential,
    Pipe,
}
