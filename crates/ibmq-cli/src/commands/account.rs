//! Account command implementation.

use anyhow::Result;
use console::style;

use ibmq_credentials::{Credentials, CredentialsMap, HubGroupProject, read_credentials_from_environ};
use ibmq_provider::IbmqProvider;

use super::common::Context;

/// Execute `account show`.
pub fn execute_show(ctx: &Context) -> Result<()> {
    let path = ctx.accounts_path()?;

    let environ = read_credentials_from_environ();
    print_section("Environment (QE_*)", &environ);

    let stored = IbmqProvider::stored_accounts(&path)?;
    print_section(&format!("Accounts file ({})", path.display()), &stored);

    if !environ.is_empty() && !stored.is_empty() {
        println!(
            "{} Environment credentials take precedence over the accounts file",
            style("note:").dim()
        );
    }
    Ok(())
}

fn print_section(title: &str, accounts: &CredentialsMap) {
    println!("{}", style(title).cyan().bold());
    if accounts.is_empty() {
        println!("  {}\n", style("none").dim());
        return;
    }
    for (id, creds) in accounts {
        println!("  {} {}", style("●").green(), style(id).bold());
        println!("    URL:   {}", creds.url());
        println!("    Token: {}", mask_token(creds.token()));
        if !creds.verify() {
            println!("    {}", style("TLS verification disabled").yellow());
        }
    }
    println!();
}

/// Show only the last four characters of a token.
fn mask_token(token: &str) -> String {
    let visible: String = token
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    if token.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("****{visible}")
    }
}

/// Execute `account save`.
pub fn execute_save(
    ctx: &Context,
    token: String,
    url: String,
    hub: Option<String>,
    group: Option<String>,
    project: Option<String>,
    overwrite: bool,
) -> Result<()> {
    let path = ctx.accounts_path()?;
    let credentials =
        Credentials::new(token, url).with_hub_group_project(HubGroupProject { hub, group, project });

    IbmqProvider::save_account(&path, &credentials, overwrite)?;
    println!(
        "{} Saved account {} to {}",
        style("✓").green().bold(),
        style(credentials.unique_id()).bold(),
        path.display()
    );
    Ok(())
}

/// Execute `account remove`.
pub fn execute_remove(
    ctx: &Context,
    hub: Option<String>,
    group: Option<String>,
    project: Option<String>,
) -> Result<()> {
    let path = ctx.accounts_path()?;
    let id = HubGroupProject { hub, group, project };

    IbmqProvider::delete_account(&path, &id)?;
    println!(
        "{} Removed account {} from {}",
        style("✓").green().bold(),
        style(&id).bold(),
        path.display()
    );
    Ok(())
}
