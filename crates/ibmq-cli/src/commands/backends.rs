//! Backends command implementation.

use anyhow::Result;
use console::style;

use ibmq_provider::BackendFilter;

use super::common::Context;

/// Execute the backends command.
pub async fn execute(
    ctx: &Context,
    simulator: Option<bool>,
    operational: bool,
    min_qubits: Option<u32>,
) -> Result<()> {
    let provider = ctx.provider().await?;

    let mut filter = BackendFilter::new();
    if let Some(sim) = simulator {
        filter = filter.simulator(sim);
    }
    if operational {
        filter = filter.operational(true);
    }
    if let Some(n) = min_qubits {
        filter = filter.min_qubits(n);
    }

    let backends = provider.backends(&filter).await?;
    if backends.is_empty() {
        println!("{} No backends match", style("!").yellow().bold());
        return Ok(());
    }

    println!("{} Available backends:\n", style("IBM Q").cyan().bold());

    for backend in &backends {
        let cfg = backend.configuration();
        let available = match backend.status().await {
            Ok(status) => status.operational,
            Err(e) => {
                tracing::warn!("status of {} unavailable: {e}", backend.name());
                false
            }
        };

        println!(
            "  {} {} {}",
            if available {
                style("●").green()
            } else {
                style("○").red()
            },
            style(backend.name()).bold(),
            if cfg.simulator { "(simulator)" } else { "" }
        );
        println!("    Account: {}", backend.account());
        println!("    Qubits: {}", cfg.n_qubits);
        println!("    Max shots: {}", cfg.max_shots);
        println!("    Gates: {}", cfg.basis_gates.join(", "));
        println!();
    }

    let aliases = ibmq_provider::IbmqProvider::aliased_backend_names();
    let shown: Vec<_> = aliases
        .iter()
        .filter(|(_, real)| backends.iter().any(|b| b.name() == **real))
        .collect();
    if !shown.is_empty() {
        println!("{}", style("Aliases:").dim());
        for (alias, real) in shown {
            println!("  {alias} → {real}");
        }
    }

    Ok(())
}
