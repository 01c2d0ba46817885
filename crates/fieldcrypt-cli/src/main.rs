//! `fieldcrypt` — encrypt or decrypt a single field value from the shell.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise structured JSON logging (stderr; stdout carries the result).
//! 3. Build the codec registry and run the requested command.
//!
//! `fieldcrypt encrypt <value>` writes the ciphertext of `<value>` under the
//! configured active method. `fieldcrypt decrypt <value>` tries every
//! registered codec and writes the recovered plaintext, exiting non-zero when
//! no codec accepts the value. Pass `-` to read the value from stdin.

mod telemetry;

use std::io::Read;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fieldcrypt::{Config, Crypto};
use tracing::info;

#[derive(Parser)]
#[command(name = "fieldcrypt", version, about = "Field-level encryption tool")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Encrypt a value with the configured active method.
    Encrypt {
        /// The plaintext value, or `-` to read it from stdin.
        value: String,
    },
    /// Decrypt a value, trying every configured method in order.
    Decrypt {
        /// The ciphertext value, or `-` to read it from stdin.
        value: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("ERROR: fieldcrypt configuration invalid: {e}");
            return ExitCode::FAILURE;
        }
    };

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    if let Err(e) = telemetry::init(&cfg.log_level) {
        eprintln!("ERROR: {e}");
        return ExitCode::FAILURE;
    }

    // -----------------------------------------------------------------------
    // 3. Registry and command
    // -----------------------------------------------------------------------
    match run(&cli.command, &cfg) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("ERROR: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: &Command, cfg: &Config) -> Result<String> {
    let crypto = Crypto::from_config(cfg).context("failed to build crypto registry")?;
    info!(active = %crypto.active_method(), "registry built");

    match command {
        Command::Encrypt { value } => {
            let plaintext = resolve_value(value)?;
            crypto
                .encrypt(&plaintext)
                .context("encryption failed")
        }
        Command::Decrypt { value } => {
            let ciphertext = resolve_value(value)?;
            crypto
                .decrypt(&ciphertext)
                .context("value not decryptable by any configured method")
        }
    }
}

/// Return `value` as-is, or the trimmed contents of stdin when it is `-`.
fn resolve_value(value: &str) -> Result<String> {
    if value != "-" {
        return Ok(value.to_owned());
    }
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("failed to read value from stdin")?;
    // Strip the trailing newline a shell pipe almost always appends.
    Ok(buf.trim_end_matches(['\r', '\n']).to_owned())
}
