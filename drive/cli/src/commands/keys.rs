use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use drive_core::utils::is_zeroed;
use drive_sce::KeyStore;

/**
    Key file commands.
*/
#[derive(Args)]
pub struct KeysCommand {
    #[command(subcommand)]
    command: KeysSubcommand,
}

#[derive(Subcommand)]
enum KeysSubcommand {
    /// Write a key file with every value zeroed.
    Template(TemplateCommand),
    /// List the roles of a key file and flag the ones left zeroed.
    Inspect(InspectCommand),
}

impl KeysCommand {
    pub fn run(self) -> Result<()> {
        match self.command {
            KeysSubcommand::Template(cmd) => cmd.run(),
            KeysSubcommand::Inspect(cmd) => cmd.run(),
        }
    }
}

#[derive(Args)]
struct TemplateCommand {
    /// Output file path. If omitted, the template goes to stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl TemplateCommand {
    fn run(self) -> Result<()> {
        let json = KeyStore::zeroed()
            .to_json()
            .context("failed to serialize key file")?;

        match &self.output {
            Some(path) => {
                std::fs::write(path, json + "\n").context("failed to write key file")?;
                eprintln!("Created {}", path.display());
            }
            None => println!("{json}"),
        }
        Ok(())
    }
}

#[derive(Args)]
struct InspectCommand {
    /// JSON key file.
    path: PathBuf,
}

impl InspectCommand {
    fn run(self) -> Result<()> {
        let keys = KeyStore::from_file(&self.path)
            .with_context(|| format!("failed to load key file {}", self.path.display()))?;

        let roles = keys.roles();
        let width = roles.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
        let mut zeroed = 0;
        for (name, value) in &roles {
            let flag = if is_zeroed(value) {
                zeroed += 1;
                "  (zero)"
            } else {
                ""
            };
            println!("{name:<width$}  {} bytes{flag}", value.len());
        }

        println!();
        println!("{} roles, {zeroed} zeroed", roles.len());
        Ok(())
    }
}
