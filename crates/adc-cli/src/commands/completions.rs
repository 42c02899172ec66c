use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use clap_complete::{generate, generate_to, Shell};

use adc_cli::cli::build_cli_command;

const BIN_NAME: &str = "adc";

/// Prints the script for `shell`, or installs it under `dir` with the file
/// name the shell expects (`adc.bash`, `_adc`, `adc.fish`, ...).
pub fn handle(shell: Shell, dir: Option<&Path>) -> Result<()> {
    let mut cmd = build_cli_command();
    match dir {
        Some(dir) => {
            let written = generate_to(shell, &mut cmd, BIN_NAME, dir)
                .with_context(|| format!("writing {shell} completion into {}", dir.display()))?;
            println!("{}", written.display());
        }
        None => generate(shell, &mut cmd, BIN_NAME, &mut io::stdout()),
    }
    Ok(())
}
