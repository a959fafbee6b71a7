//! The credential record and its unique id.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique id of a set of credentials: the hub/group/project triple.
///
/// Credentials without routing information share the default id (all `None`).
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HubGroupProject {
    pub hub: Option<String>,
    pub group: Option<String>,
    pub project: Option<String>,
}

impl HubGroupProject {
    /// Create a fully specified id.
    pub fn new(
        hub: impl Into<String>,
        group: impl Into<String>,
        project: impl Into<String>,
    ) -> Self {
        Self {
            hub: Some(hub.into()),
            group: Some(group.into()),
            project: Some(project.into()),
        }
    }

    /// Whether this is the default (unrouted) id.
    pub fn is_default(&self) -> bool {
        self.hub.is_none() && self.group.is_none() && self.project.is_none()
    }

    /// Whether hub, group and project are all set.
    pub fn is_complete(&self) -> bool {
        self.hub.is_some() && self.group.is_some() && self.project.is_some()
    }
}

impl fmt::Display for HubGroupProject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_default() {
            return f.write_str("default");
        }
        let part = |p: &Option<String>| p.clone().unwrap_or_else(|| "-".to_string());
        write!(
            f,
            "{}/{}/{}",
            part(&self.hub),
            part(&self.group),
            part(&self.project)
        )
    }
}

/// Credentials for one IBM Q Experience account.
///
/// Immutable once built: fields are private and the `with_*` methods consume
/// the value. The token is redacted from `Debug` output.
///
/// If the URL embeds routing (`.../api/Hubs/<h>/Groups/<g>/Projects/<p>`), the
/// record keeps only the `.../api` prefix as its URL and the routing from the
/// URL takes precedence over hub/group/project given alongside it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawCredentials", into = "RawCredentials")]
pub struct Credentials {
    token: String,
    url: String,
    websocket_url: Option<String>,
    hub: Option<String>,
    group: Option<String>,
    project: Option<String>,
    verify: bool,
}

impl Credentials {
    /// Create credentials from a token and an API URL.
    pub fn new(token: impl Into<String>, url: impl Into<String>) -> Self {
        RawCredentials {
            token: token.into(),
            url: url.into(),
            ..RawCredentials::default()
        }
        .into()
    }

    /// Set the websocket endpoint.
    pub fn with_websocket_url(mut self, websocket_url: impl Into<String>) -> Self {
        self.websocket_url = Some(websocket_url.into());
        self
    }

    /// Set the hub.
    pub fn with_hub(mut self, hub: impl Into<String>) -> Self {
        self.hub = Some(hub.into());
        self
    }

    /// Set the group.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Set the project.
    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    /// Set hub, group and project at once.
    pub fn with_hub_group_project(self, hgp: HubGroupProject) -> Self {
        Self {
            hub: hgp.hub,
            group: hgp.group,
            project: hgp.project,
            ..self
        }
    }

    /// Enable or disable TLS certificate verification.
    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn websocket_url(&self) -> Option<&str> {
        self.websocket_url.as_deref()
    }

    pub fn hub(&self) -> Option<&str> {
        self.hub.as_deref()
    }

    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn project(&self) -> Option<&str> {
        self.project.as_deref()
    }

    pub fn verify(&self) -> bool {
        self.verify
    }

    /// The unique id of these credentials.
    pub fn unique_id(&self) -> HubGroupProject {
        HubGroupProject {
            hub: self.hub.clone(),
            group: self.group.clone(),
            project: self.project.clone(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"[REDACTED]")
            .field("url", &self.url)
            .field("websocket_url", &self.websocket_url)
            .field("hub", &self.hub)
            .field("group", &self.group)
            .field("project", &self.project)
            .field("verify", &self.verify)
            .finish()
    }
}

/// Field-for-field form used by the loaders and the accounts file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct RawCredentials {
    pub token: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub websocket_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default = "default_verify")]
    pub verify: bool,
}

fn default_verify() -> bool {
    true
}

impl Default for RawCredentials {
    fn default() -> Self {
        Self {
            token: String::new(),
            url: String::new(),
            websocket_url: None,
            hub: None,
            group: None,
            project: None,
            verify: default_verify(),
        }
    }
}

impl From<RawCredentials> for Credentials {
    fn from(raw: RawCredentials) -> Self {
        let (url, routing) = split_routing_url(&raw.url);
        let (hub, group, project) = match routing {
            Some(hgp) => (hgp.hub, hgp.group, hgp.project),
            None => (raw.hub, raw.group, raw.project),
        };
        Self {
            token: raw.token,
            url,
            websocket_url: raw.websocket_url,
            hub,
            group,
            project,
            verify: raw.verify,
        }
    }
}

impl From<Credentials> for RawCredentials {
    fn from(creds: Credentials) -> Self {
        Self {
            token: creds.token,
            url: creds.url,
            websocket_url: creds.websocket_url,
            hub: creds.hub,
            group: creds.group,
            project: creds.project,
            verify: creds.verify,
        }
    }
}

/// Split `https://host/.../api/Hubs/<h>/Groups/<g>/Projects/<p>` into the
/// `.../api` prefix and its routing. Keywords match case-insensitively; any
/// other URL is returned unchanged with no routing.
fn split_routing_url(url: &str) -> (String, Option<HubGroupProject>) {
    let unchanged = (url.to_string(), None);

    if !url.to_ascii_lowercase().starts_with("https://") {
        return unchanged;
    }

    let segments: Vec<&str> = url.trim_end_matches('/').split('/').collect();
    // scheme, "", host, ..., "api", Hubs, h, Groups, g, Projects, p
    if segments.len() < 10 {
        return unchanged;
    }
    let tail = &segments[segments.len() - 7..];
    let keywords_match = tail[0].eq_ignore_ascii_case("api")
        && tail[1].eq_ignore_ascii_case("hubs")
        && tail[3].eq_ignore_ascii_case("groups")
        && tail[5].eq_ignore_ascii_case("projects");
    if !keywords_match || [tail[2], tail[4], tail[6]].iter().any(|s| s.is_empty()) {
        return unchanged;
    }

    let prefix = segments[..segments.len() - 6].join("/");
    (prefix, Some(HubGroupProject::new(tail[2], tail[4], tail[6])))
}
