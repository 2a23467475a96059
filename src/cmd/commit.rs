//! Interactive commit flow: bare `gic [hint...]`.

use anyhow::{Context, Result};
use console::style;
use gic::auth::TokenStore;
use gic::config::GicConfig;
use gic::git::{GitCli, RepoInspector};
use gic::llm::AnthropicClient;
use gic::ui::icons::{CLIPBOARD, MEMO, SPARKLE, WARN};
use gic::ui::{Step, clean_status, print_box};
use gic::workflow::{complete, prepare_prompt};
use std::path::PathBuf;

use crate::Cli;

pub async fn cmd_commit(cli: &Cli, project_dir: PathBuf) -> Result<()> {
    let config =
        GicConfig::with_cli_args(project_dir, cli.config.clone(), cli.yes, cli.max_chars)?;
    for warning in config.validate() {
        eprintln!("{}{}", WARN, style(warning).yellow());
    }

    let git = GitCli::new(&config.project_dir);
    let budget = config.budget();
    let hint = cli.hint.join(" ");
    let hint = (!hint.is_empty()).then_some(hint.as_str());

    if cli.dry_run {
        match prepare_prompt(&git, &budget, hint).await? {
            Some(prepared) => println!("{}", prepared.prompt),
            None => println!("No changes to commit"),
        }
        return Ok(());
    }

    let step = Step::start("Staging all changes...");
    if let Err(e) = git.stage_all().await {
        step.fail("Failed to stage changes");
        return Err(e).context("Failed to stage changes");
    }
    step.success("Changes staged");

    let step = Step::start("Analyzing repository changes...");
    let prepared = match prepare_prompt(&git, &budget, hint).await {
        Ok(prepared) => prepared,
        Err(e) => {
            step.fail("Analysis failed");
            return Err(e.into());
        }
    };
    step.success("Analysis complete");

    let Some(prepared) = prepared else {
        println!("No changes to commit");
        return Ok(());
    };

    print_box(
        &format!("{}Repository Status", MEMO),
        &format!("\n{}", clean_status(&prepared.snapshot.status)),
    );
    if !budget.fits(&prepared.snapshot) {
        println!(
            "{}Large changeset detected, selecting most relevant files...",
            WARN
        );
    }

    let store = TokenStore::new(config.token_path()?);
    if store.load()?.is_none() {
        super::auth::login(&store, false).await?;
    }

    let client = AnthropicClient::new(config.api_url(), config.model_name(), config.max_tokens());
    let step = Step::start(format!("Generating commit message with {}...", client.model()));
    let message = match complete(&client, &store, &prepared.prompt).await {
        Ok(message) => message,
        Err(e) => {
            step.fail("Failed to generate commit message");
            return Err(e);
        }
    };
    step.success("Commit message generated");

    print_box(
        &format!("{}Proposed Commit Message", CLIPBOARD),
        &format!("\n{}\n", message),
    );

    if !config.yes {
        use dialoguer::Confirm;

        let proceed = Confirm::new()
            .with_prompt("Proceed with commit?")
            .default(true)
            .interact()
            .context("Failed to read confirmation")?;
        if !proceed {
            anyhow::bail!("commit cancelled");
        }
    }

    let step = Step::start("Creating commit...");
    if let Err(e) = git.commit(&message).await {
        step.fail("Failed to create commit");
        return Err(e).context("Failed to create commit");
    }
    step.success("Commit created!");

    match git.head_short_sha().await {
        Ok(Some(sha)) => println!("{}All done! {}", SPARKLE, style(sha).dim()),
        _ => println!("{}All done!", SPARKLE),
    }
    Ok(())
}
