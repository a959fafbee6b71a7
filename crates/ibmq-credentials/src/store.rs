//! Accounts file: credentials persisted as YAML.
//!
//! ```yaml
//! accounts:
//!   - token: "..."
//!     url: "https://quantumexperience.ng.bluemix.net/api"
//!   - token: "..."
//!     url: "https://q-console-api.mybluemix.net/api"
//!     hub: ibm-q
//!     group: open
//!     project: main
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::CredentialsMap;
use crate::credentials::{Credentials, HubGroupProject};
use crate::error::{CredentialsError, CredentialsResult};

/// Environment variable overriding the accounts file location.
pub const ACCOUNTS_FILE_ENV: &str = "IBMQ_ACCOUNTS_FILE";

#[derive(Debug, Default, Serialize, Deserialize)]
struct AccountsFile {
    #[serde(default)]
    accounts: Vec<Credentials>,
}

/// Location of the accounts file.
///
/// `$IBMQ_ACCOUNTS_FILE` if set, else `<config dir>/ibmq/accounts.yaml`.
pub fn default_accounts_path() -> CredentialsResult<PathBuf> {
    if let Ok(path) = std::env::var(ACCOUNTS_FILE_ENV) {
        if !path.is_empty() {
            return Ok(PathBuf::from(path));
        }
    }
    dirs::config_dir()
        .map(|dir| dir.join("ibmq").join("accounts.yaml"))
        .ok_or(CredentialsError::NoConfigDir)
}

/// Read all stored credentials. A missing file yields an empty map.
pub fn read_credentials_from_file(path: &Path) -> CredentialsResult<CredentialsMap> {
    let file = load(path)?;
    let mut found = CredentialsMap::new();
    for creds in file.accounts {
        let id = creds.unique_id();
        if found.insert(id.clone(), creds).is_some() {
            tracing::warn!("duplicate stored credentials for {id}, keeping the last one");
        }
    }
    Ok(found)
}

/// Store credentials, replacing an entry with the same id only when
/// `overwrite` is set.
pub fn store_credentials(
    path: &Path,
    credentials: &Credentials,
    overwrite: bool,
) -> CredentialsResult<()> {
    let mut file = load(path)?;
    let id = credentials.unique_id();

    match file.accounts.iter().position(|c| c.unique_id() == id) {
        Some(_) if !overwrite => return Err(CredentialsError::AlreadyStored(id)),
        Some(index) => file.accounts[index] = credentials.clone(),
        None => file.accounts.push(credentials.clone()),
    }

    save(path, &file)?;
    tracing::info!("stored credentials for {id} in {}", path.display());
    Ok(())
}

/// Remove the stored credentials with the given id.
pub fn remove_credentials(path: &Path, id: &HubGroupProject) -> CredentialsResult<()> {
    let mut file = load(path)?;
    let before = file.accounts.len();
    file.accounts.retain(|c| c.unique_id() != *id);

    if file.accounts.len() == before {
        return Err(CredentialsError::NotFound(id.clone()));
    }

    save(path, &file)?;
    tracing::info!("removed credentials for {id} from {}", path.display());
    Ok(())
}

fn load(path: &Path) -> CredentialsResult<AccountsFile> {
    if !path.exists() {
        return Ok(AccountsFile::default());
    }
    let contents = std::fs::read_to_string(path).map_err(|source| CredentialsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if contents.trim().is_empty() {
        return Ok(AccountsFile::default());
    }
    serde_yaml_ng::from_str(&contents).map_err(|source| CredentialsError::Yaml {
        path: path.to_path_buf(),
        source,
    })
}

fn save(path: &Path, file: &AccountsFile) -> CredentialsResult<()> {
    let io_err = |source| CredentialsError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }

    let yaml = serde_yaml_ng::to_string(file).map_err(|source| CredentialsError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, yaml).map_err(io_err)?;

    // Tokens are secrets: owner read/write only.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).map_err(io_err)?;
    }

    Ok(())
}
