//! Provider: the set of enabled accounts and the backends they expose.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use ibmq_credentials::{
    Credentials, CredentialsMap, HubGroupProject, discover_credentials_from_lookup,
    read_credentials_from_file, remove_credentials, store_credentials,
};

use crate::api::IbmqClient;
use crate::backend::{BackendConfiguration, IbmqBackend};
use crate::config::ClientConfig;
use crate::error::{IbmqError, IbmqResult};

/// Display names that map onto a real backend name.
const ALIASED_BACKEND_NAMES: [(&str, &str); 4] = [
    ("ibmq_5_yorktown", "ibmqx2"),
    ("ibmq_5_tenerife", "ibmqx4"),
    ("ibmq_16_rueschlikon", "ibmqx5"),
    ("ibmq_20_austin", "QS1_1"),
];

/// Retired names and their replacements.
const DEPRECATED_BACKEND_NAMES: [(&str, &str); 3] = [
    ("ibmqx_qasm_simulator", "ibmq_qasm_simulator"),
    ("ibmqx_hpc_qasm_simulator", "ibmq_qasm_simulator"),
    ("real", "ibmqx1"),
];

/// One enabled account.
#[derive(Debug)]
struct Account {
    client: Arc<IbmqClient>,
    backends: Vec<IbmqBackend>,
}

/// Backend selection criteria. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendFilter {
    pub simulator: Option<bool>,
    pub operational: Option<bool>,
    pub min_qubits: Option<u32>,
    pub name: Option<String>,
}

impl BackendFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn simulator(mut self, simulator: bool) -> Self {
        self.simulator = Some(simulator);
        self
    }

    /// Requires a status request per candidate backend.
    pub fn operational(mut self, operational: bool) -> Self {
        self.operational = Some(operational);
        self
    }

    pub fn min_qubits(mut self, n: u32) -> Self {
        self.min_qubits = Some(n);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    fn matches_static(&self, configuration: &BackendConfiguration, resolved_name: Option<&str>) -> bool {
        if let Some(sim) = self.simulator {
            if configuration.simulator != sim {
                return false;
            }
        }
        if let Some(min) = self.min_qubits {
            if configuration.n_qubits < min {
                return false;
            }
        }
        if let Some(name) = resolved_name {
            if configuration.backend_name != name {
                return false;
            }
        }
        true
    }
}

/// IBM Q provider over any number of accounts.
#[derive(Debug)]
pub struct IbmqProvider {
    accounts: BTreeMap<HubGroupProject, Account>,
    config: Arc<ClientConfig>,
}

impl Default for IbmqProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl IbmqProvider {
    /// Provider with no accounts and default client settings.
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    pub fn with_config(config: ClientConfig) -> Self {
        Self {
            accounts: BTreeMap::new(),
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Authenticate and register an account.
    ///
    /// Fails with [`IbmqError::CredentialsInUse`] when an account with the
    /// same hub/group/project is already enabled.
    pub async fn enable_account(&mut self, credentials: Credentials) -> IbmqResult<HubGroupProject> {
        let id = credentials.unique_id();
        if self.accounts.contains_key(&id) {
            return Err(IbmqError::CredentialsInUse(id));
        }

        let client = Arc::new(IbmqClient::login(credentials, &self.config).await?);
        let mut backends = Vec::new();
        for raw in client.list_backends().await? {
            match serde_json::from_value::<BackendConfiguration>(raw) {
                Ok(configuration) => backends.push(IbmqBackend::new(
                    Arc::clone(&client),
                    configuration,
                    Arc::clone(&self.config),
                )),
                Err(e) => tracing::warn!("skipping backend with malformed configuration: {e}"),
            }
        }

        tracing::info!("enabled account {id} with {} backends", backends.len());
        self.accounts.insert(id.clone(), Account { client, backends });
        Ok(id)
    }

    /// Enable every credential found by discovery (environment, then file).
    ///
    /// Accounts that are already enabled are skipped.
    pub async fn load_accounts(&mut self, accounts_file: &Path) -> IbmqResult<Vec<HubGroupProject>> {
        self.load_accounts_with(|name| std::env::var(name).ok(), accounts_file)
            .await
    }

    /// [`load_accounts`](Self::load_accounts) with `QE_*` variables read through `lookup`.
    pub async fn load_accounts_with<F>(
        &mut self,
        lookup: F,
        accounts_file: &Path,
    ) -> IbmqResult<Vec<HubGroupProject>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let discovered = discover_credentials_from_lookup(lookup, accounts_file)?;
        if discovered.is_empty() {
            return Err(IbmqError::NoCredentials);
        }

        let mut enabled = Vec::new();
        for (id, credentials) in discovered {
            if self.accounts.contains_key(&id) {
                tracing::warn!("account {id} is already enabled, skipping");
                continue;
            }
            enabled.push(self.enable_account(credentials).await?);
        }
        Ok(enabled)
    }

    /// Drop every enabled account.
    pub fn disable_accounts(&mut self) {
        let n = self.accounts.len();
        self.accounts.clear();
        tracing::debug!("disabled {n} accounts");
    }

    /// Credentials of the enabled accounts, keyed by unique id.
    pub fn active_accounts(&self) -> CredentialsMap {
        self.accounts
            .iter()
            .map(|(id, account)| (id.clone(), account.client.credentials().clone()))
            .collect()
    }

    /// Persist credentials to the accounts file.
    pub fn save_account(
        accounts_file: &Path,
        credentials: &Credentials,
        overwrite: bool,
    ) -> IbmqResult<()> {
        store_credentials(accounts_file, credentials, overwrite)?;
        Ok(())
    }

    /// Remove stored credentials from the accounts file.
    pub fn delete_account(accounts_file: &Path, id: &HubGroupProject) -> IbmqResult<()> {
        remove_credentials(accounts_file, id)?;
        Ok(())
    }

    /// Credentials in the accounts file.
    pub fn stored_accounts(accounts_file: &Path) -> IbmqResult<CredentialsMap> {
        Ok(read_credentials_from_file(accounts_file)?)
    }

    /// Backends of every enabled account that match `filter`.
    pub async fn backends(&self, filter: &BackendFilter) -> IbmqResult<Vec<IbmqBackend>> {
        let resolved = filter.name.as_deref().map(resolve_backend_name);

        let mut selected = Vec::new();
        for account in self.accounts.values() {
            for backend in &account.backends {
                if !filter.matches_static(backend.configuration(), resolved.as_deref()) {
                    continue;
                }
                if let Some(operational) = filter.operational {
                    if backend.status().await?.operational != operational {
                        continue;
                    }
                }
                selected.push(backend.clone());
            }
        }
        Ok(selected)
    }

    /// The single backend called `name` (after alias and deprecation
    /// resolution) across all enabled accounts.
    pub async fn get_backend(&self, name: &str) -> IbmqResult<IbmqBackend> {
        let mut matches = self.backends(&BackendFilter::new().name(name)).await?;
        match matches.len() {
            0 => Err(IbmqError::BackendNotFound(name.to_string())),
            1 => Ok(matches.remove(0)),
            _ => Err(IbmqError::AmbiguousBackend {
                name: name.to_string(),
                accounts: matches
                    .iter()
                    .map(|b| b.account().to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            }),
        }
    }

    /// Display name → real backend name.
    pub fn aliased_backend_names() -> BTreeMap<&'static str, &'static str> {
        ALIASED_BACKEND_NAMES.into_iter().collect()
    }

    /// Retired name → current backend name.
    pub fn deprecated_backend_names() -> BTreeMap<&'static str, &'static str> {
        DEPRECATED_BACKEND_NAMES.into_iter().collect()
    }
}

/// Apply deprecation, then aliasing, to a user-supplied backend name.
fn resolve_backend_name(name: &str) -> String {
    let mut resolved = name;
    if let Some((_, current)) = DEPRECATED_BACKEND_NAMES
        .into_iter()
        .find(|&(old, _)| old == name)
    {
        tracing::warn!("backend '{name}' is deprecated, use '{current}'");
        resolved = current;
    }
    if let Some((_, real)) = ALIASED_BACKEND_NAMES
        .into_iter()
        .find(|&(alias, _)| alias == resolved)
    {
        resolved = real;
    }
    resolved.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_deprecated_name() {
        assert_eq!(resolve_backend_name("ibmqx_qasm_simulator"), "ibmq_qasm_simulator");
        assert_eq!(resolve_backend_name("real"), "ibmqx1");
    }

    #[test]
    fn test_resolve_aliased_name() {
        assert_eq!(resolve_backend_name("ibmq_5_tenerife"), "ibmqx4");
        assert_eq!(resolve_backend_name("ibmq_20_austin"), "QS1_1");
    }

    #[test]
    fn test_resolve_plain_name_unchanged() {
        assert_eq!(resolve_backend_name("ibmqx4"), "ibmqx4");
        assert_eq!(resolve_backend_name("ibmq_20_tokyo"), "ibmq_20_tokyo");
    }

    #[test]
    fn test_name_maps() {
        let aliases = IbmqProvider::aliased_backend_names();
        assert_eq!(aliases["ibmq_5_yorktown"], "ibmqx2");
        assert_eq!(aliases.len(), 4);

        let deprecated = IbmqProvider::deprecated_backend_names();
        assert_eq!(deprecated["ibmqx_hpc_qasm_simulator"], "ibmq_qasm_simulator");
        assert_eq!(deprecated.len(), 3);
    }

    #[test]
    fn test_filter_static_matching() {
        let cfg: BackendConfiguration = serde_json::from_value(serde_json::json!({
            "backend_name": "ibmqx4",
            "n_qubits": 5,
            "simulator": false
        }))
        .unwrap();

        assert!(BackendFilter::new().matches_static(&cfg, None));
        assert!(BackendFilter::new().simulator(false).matches_static(&cfg, None));
        assert!(!BackendFilter::new().simulator(true).matches_static(&cfg, None));
        assert!(BackendFilter::new().min_qubits(5).matches_static(&cfg, None));
        assert!(!BackendFilter::new().min_qubits(6).matches_static(&cfg, None));
        assert!(BackendFilter::new().matches_static(&cfg, Some("ibmqx4")));
        assert!(!BackendFilter::new().matches_static(&cfg, Some("ibmqx2")));
    }

    #[test]
    fn test_new_provider_has_no_accounts() {
        let provider = IbmqProvider::new();
        assert!(provider.active_accounts().is_empty());
        assert_eq!(provider.config(), &ClientConfig::default());
    }

    #[test]
    fn test_stored_accounts_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let accounts = IbmqProvider::stored_accounts(&dir.path().join("accounts.yaml")).unwrap();
        assert!(accounts.is_empty());
    }

    #[test]
    fn test_save_and_delete_account() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("accounts.yaml");
        let creds = Credentials::new("token", "https://quantumexperience.ng.bluemix.net/api");

        IbmqProvider::save_account(&path, &creds, false).unwrap();
        let err = IbmqProvider::save_account(&path, &creds, false).unwrap_err();
        assert!(matches!(err, IbmqError::Credentials(_)));

        IbmqProvider::delete_account(&path, &creds.unique_id()).unwrap();
        assert!(IbmqProvider::stored_accounts(&path).unwrap().is_empty());
    }
}
