// API client module: a small blocking HTTP client for the Cloud SQL Admin
// API. Only two calls are needed: read the instance's authorized networks and
// replace them.

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub const DEFAULT_API_URL: &str = "https://sqladmin.googleapis.com/sql/v1beta4";

/// `kind` tag the API uses for authorized-network entries.
pub const ACL_ENTRY_KIND: &str = "sql#aclEntry";

/// Build the HTTP client shared by every outgoing request.
pub fn http_client() -> Result<Client> {
    Client::builder()
        .user_agent(concat!("sqlwhitelist/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")
}

/// Project and instance identifying one Cloud SQL instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceRef {
    pub project_id: String,
    pub instance_id: String,
}

/// One authorized network. Fields the API returns that we do not model
/// (`expirationTime`, ...) are kept in `extra` and sent back unchanged; a
/// missing `kind` or `name` stays missing.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AclEntry {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(default)]
    pub value: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl AclEntry {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        AclEntry {
            kind: ACL_ENTRY_KIND.to_string(),
            value: value.into(),
            name: name.into(),
            extra: serde_json::Map::new(),
        }
    }
}

/// The slice of a `DatabaseInstance` resource this tool reads and writes.
/// The same shape serves as the GET response and the PATCH body.
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct DatabaseInstance {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Settings>,
}

#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_configuration: Option<IpConfiguration>,
}

#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct IpConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorized_networks: Option<Vec<AclEntry>>,
}

impl DatabaseInstance {
    pub fn with_authorized_networks(entries: Vec<AclEntry>) -> Self {
        DatabaseInstance {
            settings: Some(Settings {
                ip_configuration: Some(IpConfiguration {
                    authorized_networks: Some(entries),
                }),
            }),
        }
    }

    /// `settings.ipConfiguration.authorizedNetworks`, if the path exists.
    pub fn into_authorized_networks(self) -> Option<Vec<AclEntry>> {
        self.settings?.ip_configuration?.authorized_networks
    }
}

/// Reads and replaces an instance's authorized networks.
pub trait InstanceStateClient {
    /// Store the bearer token used for subsequent calls.
    fn set_token(&mut self, token: &str);
    fn authorized_networks(&self, instance: &InstanceRef) -> Result<Vec<AclEntry>>;
    /// Replace the whole list. Succeeds only on HTTP 200.
    fn set_authorized_networks(&self, instance: &InstanceRef, entries: &[AclEntry]) -> Result<()>;
}

/// Cloud SQL Admin API client holding the HTTP client, the API base URL and
/// the bearer token.
#[derive(Clone)]
pub struct SqlAdminClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl SqlAdminClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        SqlAdminClient {
            client,
            base_url: base_url.into(),
            token: None,
        }
    }

    pub fn instance_url(&self, instance: &InstanceRef) -> String {
        format!(
            "{}/projects/{}/instances/{}",
            self.base_url.trim_end_matches('/'),
            instance.project_id,
            instance.instance_id
        )
    }

    fn auth_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        if let Some(t) = &self.token {
            let val = HeaderValue::from_str(&format!("Bearer {}", t))
                .context("Access token is not a valid header value")?;
            headers.insert(AUTHORIZATION, val);
        }
        Ok(headers)
    }
}

impl InstanceStateClient for SqlAdminClient {
    fn set_token(&mut self, token: &str) {
        self.token = Some(token.to_string());
    }

    fn authorized_networks(&self, instance: &InstanceRef) -> Result<Vec<AclEntry>> {
        let url = self.instance_url(instance);
        debug!(url = %url, "fetching instance settings");
        let res = self
            .client
            .get(&url)
            .query(&[("fields", "settings")])
            .headers(self.auth_headers()?)
            .send()
            .context("Failed to send instance settings request")?;
        if !res.status().is_success() {
            let status = res.status();
            let txt = res.text().unwrap_or_default();
            anyhow::bail!("Fetching instance settings failed: {} - {}", status, txt);
        }
        let instance: DatabaseInstance = res.json().context("Parsing instance settings json")?;
        let entries = instance
            .into_authorized_networks()
            .context("Response has no settings.ipConfiguration.authorizedNetworks")?;
        info!(count = entries.len(), "fetched authorized networks");
        Ok(entries)
    }

    fn set_authorized_networks(&self, instance: &InstanceRef, entries: &[AclEntry]) -> Result<()> {
        let url = self.instance_url(instance);
        let body = DatabaseInstance::with_authorized_networks(entries.to_vec());
        debug!(url = %url, count = entries.len(), "patching authorized networks");
        let res = self
            .client
            .patch(&url)
            .headers(self.auth_headers()?)
            .json(&body)
            .send()
            .context("Failed to send instance patch request")?;
        if res.status() != StatusCode::OK {
            let status = res.status();
            let txt = res.text().unwrap_or_default();
            anyhow::bail!("Updating authorized networks failed: {} - {}", status, txt);
        }
        info!(count = entries.len(), "authorized networks replaced");
        Ok(())
    }
}
