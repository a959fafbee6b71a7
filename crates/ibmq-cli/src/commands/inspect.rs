//! Single-backend inspection: status, configuration, properties.

use anyhow::Result;
use console::style;

use super::common::Context;

/// Execute the status command.
pub async fn execute_status(ctx: &Context, name: &str) -> Result<()> {
    let provider = ctx.provider().await?;
    let backend = provider.get_backend(name).await?;
    let status = backend.status().await?;

    println!(
        "{} {} ({})",
        if status.operational {
            style("●").green()
        } else {
            style("○").red()
        },
        style(&status.backend_name).bold(),
        status.backend_version
    );
    println!("  Operational:  {}", status.operational);
    println!("  Pending jobs: {}", style(status.pending_jobs).yellow());
    println!("  Message:      {}", status.status_msg);
    Ok(())
}

/// Execute the config command.
pub async fn execute_config(ctx: &Context, name: &str) -> Result<()> {
    let provider = ctx.provider().await?;
    let backend = provider.get_backend(name).await?;
    println!("{}", serde_json::to_string_pretty(backend.configuration())?);
    Ok(())
}

/// Execute the properties command.
pub async fn execute_properties(ctx: &Context, name: &str) -> Result<()> {
    let provider = ctx.provider().await?;
    let backend = provider.get_backend(name).await?;

    let Some(properties) = backend.properties().await? else {
        println!(
            "{} {} publishes no calibration properties",
            style("!").yellow().bold(),
            backend.name()
        );
        return Ok(());
    };

    println!(
        "{} {} (calibrated {})",
        style("IBM Q").cyan().bold(),
        style(&properties.backend_name).bold(),
        properties.last_update_date.as_deref().unwrap_or("unknown")
    );
    for (qubit, measurements) in properties.qubits.iter().enumerate() {
        let line: Vec<String> = measurements
            .iter()
            .map(|m| format!("{}={:.4}{}", m.name, m.value, m.unit))
            .collect();
        println!("  Q{qubit}: {}", line.join("  "));
    }
    for gate in &properties.gates {
        let error = gate
            .parameters
            .iter()
            .find(|p| p.name == "gate_error")
            .map_or_else(|| "-".to_string(), |p| format!("{:.2e}", p.value));
        println!("  {} {:?}: error {error}", gate.gate, gate.qubits);
    }
    Ok(())
}
