use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "lfnscan",
    version,
    about = "Batch LFN/infrasound analyzer with VAD risk classification"
)]
struct Cli {
    /// Directory of audio files to analyze (wav, mp3, mp4, flac)
    input_dir: PathBuf,

    /// Number of parallel workers (0 = auto-detect from config)
    #[arg(short = 'j', long, default_value = "0")]
    jobs: usize,

    /// Path to a config file (defaults to the XDG location)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Load config file (optional, defaults if missing)
    let config = lfnscan::config::AppConfig::load(cli.config.as_deref());

    let workers = if cli.jobs > 0 {
        cli.jobs
    } else {
        config.resolve_workers()
    };

    let outcome = lfnscan::analyzer::analyze_directory(&cli.input_dir, &config, workers)
        .context("Batch analysis failed")?;

    println!(
        "Analysis complete: {} analyzed, {} failed. Results saved to {} and {}/",
        outcome.analyzed,
        outcome.failed,
        outcome.report_path.display(),
        outcome.spectrogram_dir.display()
    );

    Ok(())
}
