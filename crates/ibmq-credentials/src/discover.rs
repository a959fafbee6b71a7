//! Credential discovery across sources.

use std::path::Path;

use crate::CredentialsMap;
use crate::environ::{read_credentials_from_environ, read_credentials_from_lookup};
use crate::error::CredentialsResult;
use crate::store::read_credentials_from_file;

/// Find credentials: the environment first, then the accounts file.
///
/// The first source that yields anything wins; sources are never merged.
pub fn discover_credentials(accounts_file: &Path) -> CredentialsResult<CredentialsMap> {
    discover_with(read_credentials_from_environ(), accounts_file)
}

/// Like [`discover_credentials`], reading `QE_*` variables through `lookup`.
pub fn discover_credentials_from_lookup<F>(
    lookup: F,
    accounts_file: &Path,
) -> CredentialsResult<CredentialsMap>
where
    F: Fn(&str) -> Option<String>,
{
    discover_with(read_credentials_from_lookup(lookup), accounts_file)
}

fn discover_with(from_env: CredentialsMap, accounts_file: &Path) -> CredentialsResult<CredentialsMap> {
    if !from_env.is_empty() {
        tracing::info!("using credentials from environment variables");
        return Ok(from_env);
    }

    let from_file = read_credentials_from_file(accounts_file)?;
    if from_file.is_empty() {
        tracing::debug!("no credentials found");
    } else {
        tracing::info!(
            "using {} stored account(s) from {}",
            from_file.len(),
            accounts_file.display()
        );
    }
    Ok(from_file)
}
