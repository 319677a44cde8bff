//! reqdiag CLI - scans a proxy log for rejected requests and reports likely
//! causes.

pub mod render;

mod cli_args;

use anyhow::{Context, Result};
use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, info};

use reqdiag_config::Config;
use reqdiag_core::{dump_record, read_log_lossy, scan_inventory, scan_rejections, DiagError};

pub use cli_args::Cli;
use clap::Parser;

/// Exit status when the log file does not exist.
const EXIT_LOG_NOT_FOUND: u8 = 2;

pub fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    initialize_logging(&cli);

    let config = Config::load_with_overrides(cli.config.as_deref(), cli.overrides())?;
    debug!(?config, "loaded configuration");

    let log_text = match read_log_lossy(&cli.log) {
        Ok(text) => text,
        Err(DiagError::LogNotFound(path)) => {
            eprintln!("ERROR: log file not found: {}", path.display());
            return Ok(ExitCode::from(EXIT_LOG_NOT_FOUND));
        }
        Err(e) => return Err(e).context("Failed to read log file"),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    diagnose(&mut out, &log_text, &config)?;
    out.flush()?;

    Ok(ExitCode::SUCCESS)
}

/// Run both phases over `log_text` and write the report to `out`.
pub fn diagnose<W: Write>(out: &mut W, log_text: &str, config: &Config) -> Result<()> {
    let dump_dir = config.report.dump_dir.as_deref().map(Path::new);
    if let Some(dir) = dump_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create dump directory {}", dir.display()))?;
    }

    render::write_banner(out, "Phase 1: scanning \"Improperly formed request\" rejections")?;
    let rejections = scan_rejections(log_text, &config.rejection);
    info!(count = rejections.len(), "rejection scan finished");
    render::write_rejections(out, &rejections, config.rejection.lookback_lines)?;

    render::write_banner(out, "Phase 2: parsing request bodies")?;
    let report = scan_inventory(
        log_text,
        &config.scan,
        config.report.max_samples,
        |line_no, record| match dump_dir {
            Some(dir) => dump_record(dir, line_no, record).map(|_| ()),
            None => Ok(()),
        },
    )
    .context("Failed to dump request body")?;
    info!(
        total = report.total,
        truncated = report.truncated,
        "inventory scan finished"
    );
    render::write_inventory(out, &report, !rejections.is_empty())?;

    Ok(())
}

const LOGGED_CRATES: [&str; 4] = ["reqdiag", "reqdiag_cli", "reqdiag_core", "reqdiag_config"];

fn initialize_logging(cli: &Cli) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let level = if cli.verbose { "debug" } else { "info" };
    let filter = LOGGED_CRATES
        .iter()
        .fold(EnvFilter::from_default_env(), |filter, krate| {
            filter.add_directive(format!("{}={}", krate, level).parse().unwrap())
        });

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}
