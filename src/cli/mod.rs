//! CLI module — Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::Parser;
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::crypto::{Cipher, FieldCodec};
use crate::errors::{EnvSealError, Result};
use crate::provision;
use crate::rewrite::RewriteEngine;

/// Environment variable that overrides the secret store.
pub const SECRET_ENV_VAR: &str = "ENVSEAL_SECRET";

/// EnvSeal CLI: encrypt values of KEY=VALUE config files in place.
#[derive(Parser)]
#[command(
    name = "envseal",
    about = "Encrypt selected values of KEY=VALUE config files in place",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Secret store file (default: from .envseal.toml, else .env.secret)
    #[arg(long, global = true)]
    pub store: Option<String>,

    /// Name of the secret entry in the store (default: SECRET_KEY)
    #[arg(long, global = true)]
    pub secret_name: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Generate the secret key and add it to the secret store (never overwrites)
    Keygen,

    /// Encrypt values in a config file in place
    Encrypt {
        /// Config file to rewrite
        file: String,
        /// Keys (or literal values) to encrypt; all entries if omitted
        lookups: Vec<String>,
    },

    /// Decrypt and print values from a config file (the file is not modified)
    Decrypt {
        /// Config file to read
        file: String,
        /// Keys (or literal values) to decrypt; all entries if omitted
        lookups: Vec<String>,
        /// Show plaintext values in the table
        #[arg(long)]
        show_values: bool,
        /// Print a JSON object of key -> plaintext instead of a table
        #[arg(long, conflicts_with = "show_values")]
        json: bool,
    },

    /// Show which entries of a config file are encrypted
    Status {
        /// Config file to inspect
        file: String,
    },
}

/// Everything a command needs once flags and `.envseal.toml` are merged.
pub struct Context {
    pub project_dir: PathBuf,
    pub settings: Settings,
    pub store: PathBuf,
    pub secret_name: String,
}

impl Context {
    /// Load settings from the current directory and apply CLI overrides.
    pub fn load(cli: &Cli) -> Result<Self> {
        let project_dir = std::env::current_dir()
            .map_err(|e| EnvSealError::file_access(".", e))?;
        let settings = Settings::load(&project_dir)?;

        let store = match &cli.store {
            Some(path) => project_dir.join(path),
            None => settings.secret_store_path(&project_dir),
        };
        let secret_name = cli
            .secret_name
            .clone()
            .unwrap_or_else(|| settings.secret_key_name.clone());

        Ok(Self {
            project_dir,
            settings,
            store,
            secret_name,
        })
    }

    /// Resolve a path argument relative to the project directory.
    pub fn resolve(&self, path: &str) -> PathBuf {
        self.project_dir.join(path)
    }

    /// Build the rewrite engine from the configured crypto params.
    pub fn engine(&self) -> Result<RewriteEngine> {
        let cipher = Cipher::new(self.settings.crypto_params())?;
        Ok(RewriteEngine::new(FieldCodec::new(
            cipher,
            self.settings.concurrency,
        )))
    }

    /// Get the encryption secret, trying in order:
    /// 1. `ENVSEAL_SECRET` env var (CI/CD)
    /// 2. The configured entry in the secret store
    /// 3. Interactive prompt (terminals only)
    ///
    /// Returns `Zeroizing<String>` so the secret is wiped from memory on drop.
    pub async fn secret(&self) -> Result<Zeroizing<String>> {
        if let Ok(secret) = std::env::var(SECRET_ENV_VAR) {
            if !secret.is_empty() {
                tracing::debug!("using secret from {SECRET_ENV_VAR}");
                return Ok(Zeroizing::new(secret));
            }
        }

        if let Some(secret) = provision::read_secret(&self.store, &self.secret_name).await? {
            tracing::debug!(store = %self.store.display(), key = %self.secret_name, "using secret from store");
            return Ok(secret);
        }

        if !std::io::stdin().is_terminal() {
            return Err(EnvSealError::CommandFailed(format!(
                "no secret '{}' in {}; run `envseal keygen` or set {SECRET_ENV_VAR}",
                self.secret_name,
                self.store.display()
            )));
        }

        let secret = dialoguer::Password::new()
            .with_prompt("Enter encryption secret")
            .interact()
            .map_err(|e| EnvSealError::CommandFailed(format!("secret prompt: {e}")))?;
        Ok(Zeroizing::new(secret))
    }
}

/// Turn positional lookups into the engine's `Option` form.
///
/// No lookups means "every entry".
pub fn lookups(values: &[String]) -> Option<&[String]> {
    if values.is_empty() {
        None
    } else {
        Some(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_lookups_mean_all_entries() {
        assert!(lookups(&[]).is_none());
        let one = vec!["PASS".to_string()];
        assert_eq!(lookups(&one), Some(&one[..]));
    }

    #[test]
    fn cli_parses_encrypt_with_lookups() {
        let cli = Cli::try_parse_from(["envseal", "encrypt", "app.env", "PASS", "TOKEN"]).unwrap();
        match cli.command {
            Commands::Encrypt { file, lookups } => {
                assert_eq!(file, "app.env");
                assert_eq!(lookups, vec!["PASS", "TOKEN"]);
            }
            _ => panic!("expected encrypt"),
        }
    }

    #[test]
    fn decrypt_json_conflicts_with_show_values() {
        let result = Cli::try_parse_from(["envseal", "decrypt", "a.env", "--json", "--show-values"]);
        assert!(result.is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["envseal", "keygen", "--store", "s.env", "--secret-name", "K", "-v"])
                .unwrap();
        assert_eq!(cli.store.as_deref(), Some("s.env"));
        assert_eq!(cli.secret_name.as_deref(), Some("K"));
        assert!(cli.verbose);
    }
}
