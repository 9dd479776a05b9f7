use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "traceit",
    version,
    about = "Trace file, job, or table usage across the organization",
    after_help = "Examples:\n  traceit file.py\n  traceit job:daily_prices\n  traceit table:analytics.pnl\n\nExits with status 130 when interrupted with Ctrl-C."
)]
pub struct Cli {
    #[arg(help = "File name, job:<name>, or table:<schema>.<name>")]
    pub query: String,
    #[arg(long, help = "Output machine-readable JSON")]
    pub json: bool,
    #[arg(long, help = "Generate an impact summary (always on for text output)")]
    pub summary: bool,
    #[arg(long, help = "Directory levels to descend below the AFS root (0 = root only)")]
    pub depth: Option<usize>,
    #[arg(long, help = "Path to config.yaml file")]
    pub config: Option<PathBuf>,
    #[arg(long, help = "Show all files analyzed")]
    pub verbose: bool,
}

impl Cli {
    /// Summaries accompany every human-readable report
    pub fn wants_summary(&self) -> bool {
        self.summary || !self.json
    }
}
