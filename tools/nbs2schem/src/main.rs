//! nbs2schem - Note Block Studio song to schematic converter
//!
//! Reads a `.nbs` song and writes a gzip NBT `.schem` whose chests hold the
//! song as music discs and wool stacks.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use nether_nbs::DecodeOptions;
use tracing_subscriber::EnvFilter;

use nbs2schem::{ConvertOptions, convert_file, default_output_path, load_config};

#[derive(Parser)]
#[command(name = "nbs2schem")]
#[command(about = "Convert a Note Block Studio song into a chest schematic")]
#[command(version)]
struct Cli {
    /// Input .nbs song
    input: PathBuf,

    /// Output .schem file (default: input with a .schem extension)
    output: Option<PathBuf>,

    /// More output (-v: per-note timelines, -vv: packing trace)
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Only print errors
    #[arg(short, long)]
    quiet: bool,

    /// TOML file overriding item and block ids
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Ticks to add after the declared song length
    #[arg(long, value_name = "N", default_value_t = 0)]
    extra_ticks: u16,
}

impl Cli {
    /// Log filter for the chosen verbosity
    fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over the command line flags
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level())),
        )
        .with_target(false)
        .without_time()
        .init();

    let options = ConvertOptions {
        decode: DecodeOptions {
            extra_ticks: cli.extra_ticks,
        },
        config: load_config(cli.config.as_deref())?,
    };
    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&cli.input));

    convert_file(&cli.input, &output, &options)?;
    Ok(())
}
