//! Shared helpers for commands.

use anyhow::Context;
use giztoy_opus::Config;

use crate::Cli;

/// Loads codec settings from `-f`, or the defaults when no file is given.
pub fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    match &cli.input {
        Some(path) => {
            print_verbose(cli, &format!("Loading settings: {}", path));
            Config::load(path).with_context(|| format!("failed to load {}", path))
        }
        None => Ok(Config::default()),
    }
}

/// Outputs result as YAML, or JSON with `--json`.
pub fn output_result<T: serde::Serialize>(result: &T, as_json: bool) -> anyhow::Result<()> {
    let output = if as_json {
        serde_json::to_string_pretty(result)? + "\n"
    } else {
        serde_yaml::to_string(result)?
    };
    print!("{}", output);
    Ok(())
}

/// Prints verbose message.
pub fn print_verbose(cli: &Cli, msg: &str) {
    if cli.verbose {
        eprintln!("[verbose] {}", msg);
    }
}

/// Prints success message.
pub fn print_success(msg: &str) {
    eprintln!("\x1b[32m✓\x1b[0m {}", msg);
}
