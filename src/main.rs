use anyhow::Result;
use clap::Parser;
use std::time::Duration;

use item_pipeline::cli::{execute_run, Cli, Commands, RunConfig};
use item_pipeline::telemetry::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match cli.command {
        Commands::Run {
            strategy,
            items,
            max_concurrent,
            config,
            delay_ms,
        } => {
            let config = RunConfig {
                strategy,
                items,
                max_concurrent,
                config_file: config,
                delay: Duration::from_millis(delay_ms),
            };

            match execute_run(config).await {
                Ok(processed) => {
                    println!("✅ {processed} items processed");
                }
                Err(error) => {
                    eprintln!("❌ エラー: {error:#}");
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
