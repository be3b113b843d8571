use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "wanscope")]
#[command(author, version, about = "Passive device and service fingerprinting from dissected capture traffic")]
pub struct Cli {
    /// Dissected packet record file, one JSON object per line ('-' for stdin)
    pub packets: PathBuf,

    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write the session report here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Seed for reproducible tie-breaking
    #[arg(long)]
    pub seed: Option<u64>,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,
}
