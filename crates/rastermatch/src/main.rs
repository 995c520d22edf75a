mod cli;

use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use rastermatch::{codec, compare, config, report};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("rastermatch=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run().await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("error: {e:#}");
            std::process::exit(2);
        }
    }
}

/// Exit code: 0 = images match, 1 = differences found, 2 = usage/IO error
/// (via the error path in `main`).
async fn run() -> anyhow::Result<i32> {
    let cli = cli::Cli::parse();

    let file_config = config::Config::load(cli.config.as_deref())?;
    let options = config::resolve(&cli.overrides(), &file_config.diff)?;
    debug!(?options, "resolved options");

    let left = codec::load_rgba(&cli.image1)?;
    let right = codec::load_rgba(&cli.image2)?;

    if (left.width, left.height) != (right.width, right.height) {
        anyhow::bail!(
            "image dimensions do not match: {}x{} vs {}x{}",
            left.width,
            left.height,
            right.width,
            right.height
        );
    }

    let (width, height) = (left.width, left.height);
    let want_output = cli.output.is_some();
    let start = Instant::now();

    // The engine is synchronous CPU work; keep it off the async runtime.
    let (diff_pixels, diff_buf) = tokio::task::spawn_blocking(move || {
        let mut out = want_output.then(|| vec![0u8; left.data.len()]);
        let count = compare::compare(
            &left.data,
            &right.data,
            out.as_deref_mut(),
            width,
            height,
            &options,
        )?;
        Ok::<_, compare::CompareError>((count, out))
    })
    .await
    .context("comparison task panicked")??;

    let elapsed = start.elapsed();

    if let (Some(path), Some(buf)) = (&cli.output, &diff_buf) {
        codec::save_rgba(path, buf, width, height)?;
    }

    let report = report::CompareReport::new(width, height, diff_pixels, elapsed);
    if cli.json {
        report::print_json(&report)?;
    } else {
        report::print_line(&report);
    }

    Ok(if report.is_match() { 0 } else { 1 })
}
