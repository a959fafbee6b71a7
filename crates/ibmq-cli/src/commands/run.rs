//! Run command implementation.

use std::path::Path;

use anyhow::{Context as _, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use ibmq_provider::Qobj;

use super::common::{Context, print_counts};

/// Load a Qobj from a JSON file.
pub fn load_qobj(path: &Path) -> Result<Qobj> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    serde_json::from_str(&source).with_context(|| format!("Invalid Qobj: {}", path.display()))
}

/// Execute the run command.
pub async fn execute(
    ctx: &Context,
    qobj_path: &Path,
    backend_name: &str,
    shots: Option<u32>,
    json: bool,
) -> Result<()> {
    let mut qobj = load_qobj(qobj_path)?;
    if let Some(shots) = shots {
        qobj = qobj.with_shots(shots);
    }

    println!(
        "{} Running {} on {} ({} experiments, {} shots)",
        style("→").cyan().bold(),
        style(qobj_path.display()).green(),
        style(backend_name).yellow(),
        qobj.experiments.len(),
        qobj.shots()
            .map_or_else(|| "default".to_string(), |s| s.to_string())
    );

    let provider = ctx.provider().await?;
    let backend = provider.get_backend(backend_name).await?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.set_message("Submitting job...");
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    let job = match backend.run(&qobj).await {
        Ok(job) => job,
        Err(e) => {
            spinner.finish_and_clear();
            return Err(e.into());
        }
    };
    spinner.set_message(format!("Waiting for job {}...", job.id()));

    let result = job.result().await;
    spinner.finish_and_clear();
    let result = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!(
        "  Job {} on {} {}",
        style(job.id()).bold(),
        result.backend_name,
        if result.success {
            style("succeeded").green()
        } else {
            style("failed").red()
        }
    );
    if let Some(created) = job.creation_date() {
        println!("  Submitted: {}", created.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    if !result.header.is_empty() {
        println!("  Header: {}", serde_json::Value::Object(result.header.clone()));
    }
    print_counts(&result);
    Ok(())
}
