//! CLI definition, tracing setup, and the sync command.

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use indicatif::{ProgressBar, ProgressStyle};
use skilldocs_core::{ProgressReporter, SyncSummary};
use skilldocs_shared::load_config;
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// skilldocs: sync skill and workflow docs into the documentation site.
#[derive(Parser)]
#[command(
    name = "skilldocs",
    version,
    about = "Sync skills, guides and workflow docs into the site content tree and build llms.txt.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Repository root; all configured paths are relative to it.
    #[arg(long, default_value = ".", env = "SKILLDOCS_ROOT")]
    pub root: PathBuf,

    /// Config file (defaults to <root>/skilldocs.toml when present).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text")]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "skilldocs=info",
        1 => "skilldocs=debug",
        _ => "skilldocs=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Sync
// ---------------------------------------------------------------------------

/// Load config and run the whole pipeline once.
pub(crate) fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli.root, cli.config.as_deref())
        .wrap_err("failed to load configuration")?;

    info!(
        root = %cli.root.display(),
        base = %config.site.base,
        "syncing documentation content"
    );

    let reporter = CliProgress::new();
    let summary =
        skilldocs_core::run(&cli.root, &config, &reporter).wrap_err("content sync failed")?;

    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &SyncSummary) {
    println!();
    println!("  {:<12} {:>9} {:>7} {:>7}", "Stage", "Processed", "Written", "Skipped");
    for stage in &summary.stages {
        println!(
            "  {:<12} {:>9} {:>7} {:>7}",
            stage.name, stage.processed, stage.written, stage.skipped
        );
    }
    println!();

    for skipped in &summary.skipped {
        println!("  {skipped}");
    }
    if !summary.skipped.is_empty() {
        println!();
    }

    println!("  Pages:    {}", summary.manifest.len());
    println!("  Mirrors:  {}", summary.mirrors);
    println!("  Version:  {}", summary.version.version);
    if summary.drift > 0 {
        println!("  Drift:    {} counter(s) in version.json out of date", summary.drift);
    }
    println!("  Time:     {:.2}s", summary.elapsed.as_secs_f64());
    println!();
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn stage(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn page_written(&self, site_url: &str) {
        self.spinner.set_message(format!("Wrote {site_url}"));
    }

    fn done(&self, _summary: &SyncSummary) {
        self.spinner.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_flags_is_the_default_invocation() {
        let cli = Cli::try_parse_from(["skilldocs"]).unwrap();
        assert_eq!(cli.root, PathBuf::from("."));
        assert!(cli.config.is_none());
        assert_eq!(cli.verbose, 0);
        assert!(matches!(cli.log_format, LogFormat::Text));
    }

    #[test]
    fn flags_parse() {
        let cli = Cli::try_parse_from([
            "skilldocs",
            "--root",
            "/repo",
            "--config",
            "alt.toml",
            "-vv",
            "--log-format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.root, PathBuf::from("/repo"));
        assert_eq!(cli.config, Some(PathBuf::from("alt.toml")));
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.log_format, LogFormat::Json));
    }
}
