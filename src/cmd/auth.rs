//! Token management (`gic auth`).

use anyhow::{Context, Result};
use console::style;
use gic::auth::{Token, TokenStore, oauth};
use gic::config::token_path;
use gic::ui::icons::{CHECK, LOCK, WARN};
use gic::ui::{Step, print_box};

use super::super::AuthCommands;

pub async fn cmd_auth(command: AuthCommands) -> Result<()> {
    let store = TokenStore::new(token_path()?);

    match command {
        AuthCommands::Login { console } => {
            login(&store, console).await?;
        }
        AuthCommands::Logout => {
            if store.clear()? {
                println!("{}Logged out, removed {}", CHECK, store.path().display());
            } else {
                println!("Not logged in.");
            }
        }
        AuthCommands::Status => match store.load()? {
            None => {
                println!("Not logged in. Run 'gic auth login' to authorize.");
            }
            Some(token) => {
                println!("Token file: {}", store.path().display());
                let expires = chrono::DateTime::from_timestamp(token.expires_at, 0)
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                    .unwrap_or_else(|| token.expires_at.to_string());
                if token.is_valid() {
                    println!("{}Logged in, access token expires {}", CHECK, expires);
                } else {
                    println!(
                        "{}Access token expired {} {}",
                        WARN,
                        expires,
                        style("(refreshed on next use)").dim()
                    );
                }
            }
        },
    }

    Ok(())
}

/// Interactive PKCE login. Prints the authorize URL, reads back the pasted
/// `code#state` and stores the resulting token.
pub async fn login(store: &TokenStore, use_console: bool) -> Result<Token> {
    use dialoguer::Input;

    println!();
    println!("{}{}", LOCK, style("Authentication Required").bold());

    let (url, verifier) = oauth::build_auth_url(use_console)?;
    println!("Please visit this URL to authorize:");
    print_box("Authorization URL", &url);
    if let Err(e) = open::that(&url) {
        eprintln!("Failed to open browser: {}", e);
    }

    let auth_code: String = Input::new()
        .with_prompt("Paste the authorization code here")
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.contains('#') {
                Ok(())
            } else {
                Err("code should be in format: code#state")
            }
        })
        .interact_text()
        .context("Authorization cancelled")?;

    let step = Step::start("Exchanging authorization code for token...");
    let token = match oauth::exchange_code(
        &reqwest::Client::new(),
        oauth::TOKEN_URL,
        &auth_code,
        &verifier,
    )
    .await
    {
        Ok(token) => token,
        Err(e) => {
            step.fail("Failed to exchange code");
            return Err(e).context("Failed to exchange code");
        }
    };

    if let Err(e) = store.save(&token) {
        step.fail("Failed to save token");
        return Err(e).context("Failed to save token");
    }

    step.success("Authorization successful!");
    Ok(token)
}
