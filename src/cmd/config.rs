//! Configuration view and validation commands (`gic config`).

use anyhow::{Context, Result};
use gic::config::{GicConfig, GicToml, default_config_path};

use super::super::{Cli, ConfigCommands};

pub fn cmd_config(
    cli: &Cli,
    project_dir: &std::path::Path,
    command: Option<ConfigCommands>,
) -> Result<()> {
    let config_path = cli
        .config
        .clone()
        .or_else(default_config_path)
        .context("Could not determine a config directory")?;

    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("gic Configuration");
            println!("=================");
            println!();

            if config_path.exists() {
                println!("Config file: {}", config_path.display());
            } else {
                println!("No gic.toml found at {}", config_path.display());
                println!("Using default configuration.");
            }
            println!();

            let config = GicConfig::with_cli_args(
                project_dir.to_path_buf(),
                config_path.exists().then(|| config_path.clone()),
                cli.yes,
                cli.max_chars,
            )?;
            let toml = &config.toml;

            println!("[budget]");
            println!("  max_chars = {}", toml.budget.max_chars);
            println!("  overhead_chars = {}", toml.budget.overhead_chars);
            println!("  per_line_estimate = {}", toml.budget.per_line_estimate);
            println!("  history_limit = {}", toml.budget.history_limit);
            println!();

            println!("[model]");
            println!("  name = \"{}\"", toml.model.name);
            println!("  max_tokens = {}", toml.model.max_tokens);
            println!("  base_url = \"{}\"", toml.model.base_url);
            println!();

            println!("Effective values (with env/CLI overrides):");
            println!("  max_chars = {}", config.budget().max_chars);
            println!("  model = \"{}\"", config.model_name());
            println!("  base_url = \"{}\"", config.api_url());
            match config.token_path() {
                Ok(path) => println!("  token_path = \"{}\"", path.display()),
                Err(e) => println!("  token_path = <unavailable: {}>", e),
            }
            println!();

            if !config_path.exists() {
                println!("Run 'gic config init' to create a gic.toml file.");
                println!();
            }
        }
        Some(ConfigCommands::Validate) => {
            println!();
            println!("Validating configuration...");
            println!();

            if !config_path.exists() {
                println!("No gic.toml found. Using defaults (valid).");
                return Ok(());
            }

            let toml = GicToml::load(&config_path)?;
            let warnings = toml.validate();

            if warnings.is_empty() {
                println!("Configuration is valid.");
            } else {
                println!("Configuration warnings:");
                for warning in warnings {
                    println!("  - {}", warning);
                }
            }
            println!();
        }
        Some(ConfigCommands::Init) => {
            if config_path.exists() {
                println!("gic.toml already exists at {}", config_path.display());
                println!("Delete it first if you want to recreate it.");
                return Ok(());
            }

            GicToml::default().save(&config_path)?;

            println!("Created gic.toml at {}", config_path.display());
            println!();
            println!("You can now customize:");
            println!("  - [budget] max_chars, overhead_chars, per_line_estimate, history_limit");
            println!("  - [model] name, max_tokens, base_url");
            println!();
        }
    }

    Ok(())
}
