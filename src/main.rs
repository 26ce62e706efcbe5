use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sharescribe::cli::Cli;
use sharescribe::config::Config;
use sharescribe::pipeline::{RunOptions, TranscriptionPipeline};
use sharescribe::utils;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose {
        "sharescribe=debug"
    } else {
        "sharescribe=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Check for required external tools (non-fatal)
    let missing_deps = utils::check_dependencies().await;
    if !missing_deps.is_empty() {
        eprintln!("⚠️  Dependency check warnings:");
        for dep in missing_deps {
            eprintln!("   • {}", dep);
        }
        eprintln!("   (Continuing anyway - tools may be available)");
    }

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            println!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if !config.summarization_enabled() {
        tracing::info!("ANTHROPIC_API_KEY not set, summarization disabled");
    }

    let pipeline = TranscriptionPipeline::new(config);
    let options = RunOptions {
        no_summary: cli.no_summary,
        keep_media: cli.keep_media,
    };

    tracing::info!("Starting transcription for link: {}", cli.link);

    match pipeline.run(&cli.filename, &cli.link, options).await {
        Ok(result) => {
            println!("Transcription saved to: {}", result.transcript_file.display());
            if let Some(summary_file) = result.summary_file {
                println!("Summary saved to: {}", summary_file.display());
            }
        }
        Err(e) => {
            println!("Error: {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}
