//! ud: window update-delay monitor
//!
//! Without an argument, lists the visible top-level windows. With one,
//! resolves it to a window (wildcard title pattern, window handle, or
//! process id) and prints the milliseconds between visible changes to that
//! window's screen region, sampled every 20ms.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Parser;

use update_delay::backend::{self, TargetSpec};
use update_delay::monitor::{RunConfig, run_enumerate, run_tracking};
use update_delay::timing::TICK_PERIOD;

const AFTER_HELP: &str = "\
The target is matched against window titles as a whole, case-insensitively;
* matches any run of characters and ? matches exactly one. A numeric target
(decimal or 0x-prefixed hex) also matches a window handle or process id.

Examples:
  ud                track nothing; list the visible windows instead
  ud \"calc*\"        track the window whose title starts with calc
  ud 0x6bf0         track the window with handle 0x6bf0
  ud 27632          track the first window owned by process 27632

Output is one value per detected change: the milliseconds elapsed since the
previous change, ten values per line. Stop with Ctrl-C.

Notes:
  - The capture reads the screen, so a window overlapping the target counts
    as part of its content. Keep the target unobscured while measuring.
  - While the screen is locked or a screen saver is active, captures are
    skipped and nothing is reported.
  - Sampling runs every 20ms; treat measurements finer than about 1/5 of a
    second as approximate.";

#[derive(Parser, Debug)]
#[command(name = "ud")]
#[command(about = "Measures the time between visible changes to a window's content")]
#[command(after_help = AFTER_HELP)]
struct Cli {
    /// Window title pattern, window handle, or process id to track
    ///
    /// Omit to list the visible windows instead.
    appname: Option<String>,

    /// Log per-tick diagnostics (capture geometry, GDI object counts)
    #[arg(short, long)]
    verbose: bool,

    /// Capture the whole window bounds instead of just the client area
    #[arg(short, long)]
    whole_window: bool,
}

/// Rewrites `/v`-style switches into the `-v` form clap expects
///
/// Windows command-line convention accepts slash switches, keyed by their
/// first letter (`/V`, `/verbose`). Recognized ones are normalized before
/// parsing; any other slash-prefixed argument is rewritten into a flag the
/// parser rejects, so it hits the usage path instead of being mistaken for
/// a tracking target.
fn normalize_slash_flags(args: impl Iterator<Item = String>) -> Vec<String> {
    args.map(|arg| {
        if let Some(rest) = arg.strip_prefix('/') {
            return match rest.chars().next().map(|c| c.to_ascii_lowercase()) {
                Some('v') => "-v".to_string(),
                Some('w') => "-w".to_string(),
                Some(_) => format!("--{rest}"),
                None => "-/".to_string(),
            };
        }
        if arg.len() == 2 && arg.starts_with('-') {
            match arg.as_bytes()[1].to_ascii_lowercase() {
                b'v' => return "-v".to_string(),
                b'w' => return "-w".to_string(),
                _ => {}
            }
        }
        arg
    })
    .collect()
}

fn main() -> Result<()> {
    let args = normalize_slash_flags(std::env::args());
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) => {
            // Usage problems print the help text and exit cleanly; a typo'd
            // invocation is not a failure worth a nonzero status.
            let _ = err.print();
            return Ok(());
        }
    };

    let default_filter = if cli.verbose {
        "update_delay=debug"
    } else {
        "update_delay=info"
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();

    backend::init_physical_pixel_space();

    let mut backend = backend::create_default_backend().context("no capture backend")?;

    let stdout = std::io::stdout();
    match cli.appname {
        None => {
            let mut out = stdout.lock();
            run_enumerate(backend.as_mut(), &mut out).context("window enumeration failed")?;
        }
        Some(appname) => {
            let target = TargetSpec::parse(&appname)
                .with_context(|| format!("invalid target pattern '{appname}'"))?;
            tracing::debug!("tracking target '{}'", target.raw());

            let config = RunConfig {
                target,
                whole_window: cli.whole_window,
                period: TICK_PERIOD,
            };

            let mut out = stdout.lock();
            run_tracking(&config, backend.as_mut(), &mut out)
                .context("could not start the tracking loop")?;
            // run_tracking only returns on error; terminate with Ctrl-C.
            out.flush()?;
        }
    }

    Ok(())
}
