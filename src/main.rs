//! traceit: trace file, job, or table usage across the organization
//!
//! This is the main entry point for the command-line tool.

use anyhow::Result;
use clap::Parser;
use traceit::{
    cli::Cli,
    config::{self, LoggingSettings},
    output, TraceContext, TraceRequest,
};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Exit status for a user interrupt
///
/// 128 + SIGINT, the shell convention, rather than the generic status 1.
const INTERRUPTED: i32 = 130;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let loaded = config::load(cli.config.as_deref())?;
    init_logging(&loaded.settings.logging, cli.verbose);

    match &loaded.path {
        Some(path) => info!("Loaded configuration from {}", path.display()),
        None => info!("No configuration file found, using defaults"),
    }

    // Runtime sized from config, so it is built by hand
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(loaded.settings.performance.max_workers)
        .enable_all()
        .build()?;

    runtime.block_on(run(cli, loaded.settings))
}

async fn run(cli: Cli, settings: traceit::Settings) -> Result<()> {
    let context = TraceContext::new(settings, cli.verbose)?;
    debug!("LLM summarizer available: {}", context.llm_available());

    let request = TraceRequest::new(&cli.query)
        .with_summary(cli.wants_summary())
        .with_max_depth(cli.depth);

    info!("Tracing: {}", request.query);

    let outcome = tokio::select! {
        outcome = context.search.execute(&request) => outcome,
        _ = tokio::signal::ctrl_c() => {
            warn!("Search interrupted by user");
            std::process::exit(INTERRUPTED);
        }
    };

    if cli.json {
        println!("{}", output::format_json(&outcome)?);
    } else {
        println!("{}", output::format_human(&outcome));
    }

    Ok(())
}

/// Initialize the stderr subscriber
///
/// `RUST_LOG` wins over the configured level; `--verbose` raises the
/// configured level to debug.
fn init_logging(settings: &LoggingSettings, verbose: bool) {
    let level = if verbose {
        "debug".to_string()
    } else {
        settings.level.to_lowercase()
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if settings.format.eq_ignore_ascii_case("compact") {
        builder.compact().init();
    } else {
        builder.init();
    }
}
