//! Version command.

use clap::Args;
use serde::Serialize;

use super::output_result;
use crate::Cli;

/// Print the linked libopus version.
#[derive(Args)]
pub struct VersionCommand {}

#[derive(Serialize)]
struct VersionInfo {
    cli: &'static str,
    libopus: String,
}

impl VersionCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let info = VersionInfo {
            cli: env!("CARGO_PKG_VERSION"),
            libopus: giztoy_opus::version(),
        };
        output_result(&info, cli.json)
    }
}
