mod cli;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use wanscope::config::Config;
use wanscope::core::PacketRecord;
use wanscope::session::Environment;
use wanscope::{tables, UserAgentAnalyzer};

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    let default_level = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default()?,
    };
    if let Some(seed) = cli.seed {
        config.session.seed = Some(seed);
    }

    let loaded = tables::load(&config.tables)?;
    let analyzer = UserAgentAnalyzer::new(loaded.patterns, loaded.linux_distributions);
    let mut session = Environment::new(
        loaded.catalog,
        analyzer,
        loaded.inference,
        config.session.seed,
    );

    let reader: Box<dyn BufRead> = if cli.packets == Path::new("-") {
        Box::new(BufReader::new(std::io::stdin()))
    } else {
        let file = File::open(&cli.packets)
            .with_context(|| format!("Failed to open packet file: {}", cli.packets.display()))?;
        Box::new(BufReader::new(file))
    };

    let mut processed = 0u64;
    let mut skipped = 0u64;
    for (number, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read packet record line")?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<PacketRecord>(&line) {
            Ok(record) => {
                session.update(&record);
                processed += 1;
            }
            Err(e) => {
                warn!(line = number + 1, error = %e, "skipping malformed packet record");
                skipped += 1;
            }
        }
    }

    info!(
        processed,
        skipped,
        devices = session.devices().len(),
        "session complete"
    );

    let report = session.report();
    let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
    match &cli.output {
        Some(path) => std::fs::write(path, json)
            .with_context(|| format!("Failed to write report: {}", path.display()))?,
        None => println!("{json}"),
    }

    Ok(())
}
