//! Shared helpers for CLI commands.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use console::style;

use ibmq_credentials::default_accounts_path;
use ibmq_provider::{ClientConfig, IbmqProvider, JobResult};

/// Global options shared by every command.
#[derive(Debug, Clone, Default)]
pub struct Context {
    pub config_file: Option<PathBuf>,
    pub accounts_file: Option<PathBuf>,
}

impl Context {
    /// Accounts file from `--accounts-file`, or the default location.
    pub fn accounts_path(&self) -> Result<PathBuf> {
        match &self.accounts_file {
            Some(path) => Ok(path.clone()),
            None => default_accounts_path().context("Could not locate the accounts file"),
        }
    }

    /// Client configuration: optional file, then `IBMQ_*` overrides.
    pub fn client_config(&self) -> Result<ClientConfig> {
        ClientConfig::load(self.config_file.as_deref()).context("Invalid client configuration")
    }

    /// A provider with every discovered account enabled.
    pub async fn provider(&self) -> Result<IbmqProvider> {
        let mut provider = IbmqProvider::with_config(self.client_config()?);
        let enabled = provider.load_accounts(&self.accounts_path()?).await?;
        tracing::info!("enabled {} account(s)", enabled.len());
        Ok(provider)
    }
}

/// Print the counts of every experiment in a result.
pub fn print_counts(result: &JobResult) {
    for (index, experiment) in result.results.iter().enumerate() {
        let name = experiment
            .header
            .get("name")
            .and_then(|v| v.as_str())
            .map_or_else(|| format!("experiment {index}"), str::to_string);

        println!(
            "\n{} {} ({} shots):",
            style("✓").green().bold(),
            style(name).bold(),
            experiment.shots
        );

        let Some(counts) = result.counts(index) else {
            println!("  no counts returned");
            continue;
        };

        let mut sorted: Vec<_> = counts.into_iter().collect();
        sorted.sort_by(|a, b| b.1.cmp(&a.1));
        let total: u64 = sorted.iter().map(|(_, c)| c).sum();

        for (bitstring, count) in sorted.iter().take(16) {
            let prob = *count as f64 / total.max(1) as f64 * 100.0;
            let bar: String = "█".repeat((prob / 2.0).round() as usize);
            println!(
                "  {}: {:>6} ({:>5.2}%) {}",
                style(bitstring).cyan(),
                count,
                prob,
                style(bar).green()
            );
        }

        if sorted.len() > 16 {
            println!("  ... and {} more outcomes", sorted.len() - 16);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_accounts_path_wins() {
        let ctx = Context {
            accounts_file: Some(PathBuf::from("/tmp/ibmq-accounts.yaml")),
            ..Context::default()
        };
        assert_eq!(
            ctx.accounts_path().unwrap(),
            PathBuf::from("/tmp/ibmq-accounts.yaml")
        );
    }

    #[test]
    fn test_client_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.yaml");
        std::fs::write(&path, "poll_interval_ms: 100\n").unwrap();

        let ctx = Context {
            config_file: Some(path),
            ..Context::default()
        };
        assert!(ctx.client_config().is_ok());
    }

    #[test]
    fn test_client_config_missing_file() {
        let ctx = Context {
            config_file: Some(PathBuf::from("/nonexistent/client.yaml")),
            ..Context::default()
        };
        assert!(ctx.client_config().is_err());
    }
}
