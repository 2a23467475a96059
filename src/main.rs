use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cmd;

#[derive(Parser)]
#[command(name = "gic")]
#[command(version, about = "Commit messages written from your working tree")]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Commit without asking for confirmation
    #[arg(long, global = true)]
    pub yes: bool,

    /// Print the assembled prompt instead of contacting the model
    #[arg(long)]
    pub dry_run: bool,

    #[arg(long, global = true)]
    pub project_dir: Option<PathBuf>,

    /// Path to gic.toml. Defaults to $GIC_CONFIG or <config_dir>/gic/gic.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Prompt size ceiling in characters. Overrides gic.toml setting.
    #[arg(long, global = true)]
    pub max_chars: Option<usize>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Extra context for the message, e.g. `gic fixes the login race`
    #[arg(trailing_var_arg = true)]
    pub hint: Vec<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run as an MCP server on stdin/stdout
    Mcp,
    /// Show build metadata
    Version,
    /// Log in, log out or inspect the stored token
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
    /// View or initialize configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum AuthCommands {
    /// Authorize gic with your Claude account
    Login {
        /// Use the Anthropic Console instead of claude.ai
        #[arg(long)]
        console: bool,
    },
    /// Delete the stored token
    Logout,
    /// Show whether a token is stored and when it expires
    Status,
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Validate configuration and show any warnings
    Validate,
    /// Initialize a default gic.toml file
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    gic::logging::init(cli.verbose);

    let project_dir = match cli.project_dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    match &cli.command {
        None => cmd::cmd_commit(&cli, project_dir).await?,
        Some(Commands::Mcp) => cmd::cmd_mcp(&cli, project_dir).await?,
        Some(Commands::Version) => cmd::cmd_version(),
        Some(Commands::Auth { command }) => cmd::cmd_auth(command.clone()).await?,
        Some(Commands::Config { command }) => {
            cmd::cmd_config(&cli, &project_dir, command.clone())?
        }
    }

    Ok(())
}
