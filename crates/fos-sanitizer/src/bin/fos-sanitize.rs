//! fOS Sanitize - command line entry point
//!
//! Usage: fos-sanitize [--config FILE.json] [--strip] [--keep-comments] [INPUT]
//!
//! Reads HTML from INPUT (or stdin) and writes the sanitized HTML to stdout.

use std::io::{Read, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use fos_sanitizer::{Sanitizer, SanitizerBuilder, SanitizerConfig};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    strip: bool,
    keep_comments: bool,
    input: Option<PathBuf>,
}

fn parse_args() -> Result<Args> {
    let mut args = Args::default();
    let mut iter = std::env::args().skip(1);

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let path = iter.next().context("--config requires a file argument")?;
                args.config = Some(PathBuf::from(path));
            }
            "--strip" => args.strip = true,
            "--keep-comments" => args.keep_comments = true,
            flag if flag.starts_with("--") => bail!("unknown option: {flag}"),
            path => {
                if args.input.is_some() {
                    bail!("only one input file may be given");
                }
                args.input = Some(PathBuf::from(path));
            }
        }
    }
    Ok(args)
}

fn load_config(path: Option<&PathBuf>) -> Result<SanitizerConfig> {
    let Some(path) = path else {
        return Ok(SanitizerConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid config {}", path.display()))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args()?;
    let mut config = load_config(args.config.as_ref())?;
    if args.strip {
        config.strip = true;
    }
    if args.keep_comments {
        config.strip_comments = false;
    }

    let sanitizer: Sanitizer = SanitizerBuilder::from_config(config)
        .build()
        .context("invalid sanitizer configuration")?;

    let mut html = String::new();
    match &args.input {
        Some(path) => {
            html = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
        }
        None => {
            std::io::stdin().read_to_string(&mut html).context("failed to read stdin")?;
        }
    }

    tracing::info!(bytes = html.len(), "sanitizing input");
    let clean = sanitizer.clean(&html);

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(clean.as_bytes()).context("failed to write output")?;
    stdout.flush()?;
    Ok(())
}
