use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use crate::commands::{CompletionCommand, TokenCommand};

#[derive(Debug, Clone, Parser)]
#[command(
    name = "awsmfa",
    version,
    about = "Refresh AWS temporary credentials with MFA via STS GetSessionToken or AssumeRole",
    long_about = None,
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    #[command(flatten)]
    pub token: TokenCommand,

    #[arg(
        short = 'v',
        long,
        global = true,
        action = ArgAction::Count,
        help = "Increase verbosity (-v info, -vv debug, -vvv trace)"
    )]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    #[command(about = "Generate shell completion scripts for awsmfa")]
    Completion(CompletionCommand),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        match self.command {
            None => self.token.execute().await,
            Some(Commands::Completion(cmd)) => {
                cmd.execute();
                Ok(())
            }
        }
    }
}
