//! Reading credentials from `QE_*` environment variables.

use crate::CredentialsMap;
use crate::credentials::{Credentials, RawCredentials};

/// Environment variable name → credential field.
pub const VARIABLES_MAP: [(&str, &str); 6] = [
    ("QE_TOKEN", "token"),
    ("QE_URL", "url"),
    ("QE_WEBSOCKET_URL", "websocket_url"),
    ("QE_HUB", "hub"),
    ("QE_GROUP", "group"),
    ("QE_PROJECT", "project"),
];

/// Read credentials from the process environment.
///
/// Returns an empty map unless both `QE_TOKEN` and `QE_URL` are set and
/// non-empty. Otherwise returns exactly one entry keyed by the credentials'
/// unique id.
pub fn read_credentials_from_environ() -> CredentialsMap {
    read_credentials_from_lookup(|name| std::env::var(name).ok())
}

/// Read credentials through an arbitrary variable lookup.
///
/// Same contract as [`read_credentials_from_environ`]. Empty values count as
/// unset; values are not validated.
pub fn read_credentials_from_lookup<F>(lookup: F) -> CredentialsMap
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| lookup(name).filter(|v| !v.is_empty());

    let mut found = CredentialsMap::new();

    let (Some(token), Some(url)) = (get("QE_TOKEN"), get("QE_URL")) else {
        tracing::debug!("QE_TOKEN or QE_URL not set, no credentials in environment");
        return found;
    };

    let raw = RawCredentials {
        token,
        url,
        websocket_url: get("QE_WEBSOCKET_URL"),
        hub: get("QE_HUB"),
        group: get("QE_GROUP"),
        project: get("QE_PROJECT"),
        ..RawCredentials::default()
    };

    let credentials = Credentials::from(raw);
    found.insert(credentials.unique_id(), credentials);
    found
}
