//! Opus CLI - A command line interface for libopus.

use clap::{Parser, Subcommand};

mod commands;

use commands::{DecodeCommand, EncodeCommand, TocCommand, VersionCommand};

/// Opus CLI - A command line interface for libopus.
///
/// This tool exercises the Opus bindings:
///   - Packet inspection (TOC byte, frame layout)
///   - Encoding raw PCM into a length-prefixed packet stream
///   - Decoding a packet stream back to raw PCM
///
/// Codec settings are read from a YAML or JSON file given with `-f`.
#[derive(Parser)]
#[command(name = "opus")]
#[command(about = "Opus codec CLI tool")]
#[command(version)]
pub struct Cli {
    /// Codec settings file (YAML or JSON)
    #[arg(short = 'f', long = "file", global = true)]
    pub input: Option<String>,

    /// Output as JSON (for piping)
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the linked libopus version
    Version(VersionCommand),
    /// Inspect an Opus packet given in hex
    Toc(TocCommand),
    /// Encode 16-bit little-endian PCM to a packet stream
    Encode(EncodeCommand),
    /// Decode a packet stream to 16-bit little-endian PCM
    Decode(DecodeCommand),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_target(false)
            .init();
    }

    match &cli.command {
        Commands::Version(cmd) => cmd.run(&cli),
        Commands::Toc(cmd) => cmd.run(&cli),
        Commands::Encode(cmd) => cmd.run(&cli),
        Commands::Decode(cmd) => cmd.run(&cli),
    }
}
