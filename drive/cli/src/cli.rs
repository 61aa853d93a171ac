use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

#[cfg(target_os = "linux")]
use crate::commands::AuthCommand;
use crate::commands::KeysCommand;

/**
    Drive authentication command-line tool.
*/
#[derive(Parser)]
#[command(name = "drive-cli")]
pub struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Authenticate with a drive and read the material for a role mode.
    #[cfg(target_os = "linux")]
    Auth(AuthCommand),
    /// Key file commands.
    Keys(KeysCommand),
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            #[cfg(target_os = "linux")]
            Command::Auth(cmd) => cmd.run(),
            Command::Keys(cmd) => cmd.run(),
        }
    }
}
