//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - IBM Q Experience accounts, backends and jobs",
        style("ibmq").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  ibmq-credentials  Credential discovery (QE_* variables, accounts file)");
    println!("  ibmq-provider     REST client, backends and jobs");
    println!("  ibmq-cli          Command-line interface");
}
