//! Fabric API client and the HTTP-backed segment resolver
//!
//! Every call is a fresh blocking round trip; nothing is cached. Timeouts
//! come from `[api].timeout_secs`.

use anyhow::{Context, Result, bail};
use reconcile::{Error as ResolveError, MapResolver, Resolver};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::adapter::ConnectorPayload;
use crate::config::{ApiConfig, NetformConfig};

/// A segment as listed by the fabric
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SegmentRecord {
    pub id: String,
    pub name: String,
}

/// Blocking client for the fabric REST API
pub struct FabricClient {
    agent: ureq::Agent,
    base_url: String,
    token: Option<String>,
}

impl FabricClient {
    /// Create a client from config, reading the token from the environment
    pub fn new(api: &ApiConfig) -> Self {
        let token = std::env::var(&api.token_env).ok().filter(|t| !t.is_empty());
        if token.is_none() {
            log::warn!("{} is not set, calling the API without a token", api.token_env);
        }
        Self::with_token(api, token)
    }

    /// Create a client with an explicit token (useful for testing)
    pub fn with_token(api: &ApiConfig, token: Option<String>) -> Self {
        let agent = match api.timeout_secs {
            Some(secs) => {
                let config = ureq::Agent::config_builder()
                    .timeout_global(Some(Duration::from_secs(secs)))
                    .build();
                ureq::Agent::new_with_config(config)
            }
            None => ureq::Agent::new_with_defaults(),
        };
        Self {
            agent,
            base_url: api.base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Build a URL under the API base
    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> std::result::Result<T, ureq::Error> {
        let url = self.url(path);
        log::debug!("GET {url}");

        let mut request = self
            .agent
            .get(&url)
            .header("Accept", "application/json")
            .header("User-Agent", "netform");
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }

        request.call()?.body_mut().read_json()
    }

    /// List all segments
    pub fn list_segments(&self) -> reconcile::Result<Vec<SegmentRecord>> {
        self.get_json("segments")
            .map_err(|e| ResolveError::transport(format!("listing segments: {e}")))
    }

    /// Fetch the observed state of one connector
    pub fn fetch_connector(&self, name: &str) -> Result<ConnectorPayload> {
        match self.get_json(&format!("connectors/{name}")) {
            Ok(payload) => Ok(payload),
            Err(ureq::Error::StatusCode(404)) => {
                bail!("Connector '{name}' does not exist in the fabric")
            }
            Err(e) => Err(e).with_context(|| format!("Failed to fetch connector '{name}'")),
        }
    }
}

/// Segment resolver backed by the fabric API
///
/// Each lookup lists segments again; results are never reused across calls.
pub struct HttpResolver {
    client: FabricClient,
}

impl HttpResolver {
    pub fn new(client: FabricClient) -> Self {
        Self { client }
    }
}

impl Resolver for HttpResolver {
    fn resolve_id_to_name(&self, id: &str) -> reconcile::Result<String> {
        self.client
            .list_segments()?
            .into_iter()
            .find(|s| s.id == id)
            .map(|s| s.name)
            .ok_or_else(|| ResolveError::not_found("segment id", id))
    }

    fn resolve_name_to_id(&self, name: &str) -> reconcile::Result<String> {
        self.client
            .list_segments()?
            .into_iter()
            .find(|s| s.name == name)
            .map(|s| s.id)
            .ok_or_else(|| ResolveError::not_found("segment name", name))
    }
}

/// Pick the segment resolver for a config
///
/// A static `[segments]` table wins over the API.
pub fn segment_resolver(config: &NetformConfig) -> Result<Box<dyn Resolver>> {
    if !config.segments.is_empty() {
        log::debug!("Using static segment table ({} entries)", config.segments.len());
        let table = MapResolver::from_pairs("segment", &config.segments)
            .context("Invalid [segments] table")?;
        return Ok(Box::new(table));
    }

    match &config.api {
        Some(api) => {
            log::debug!("Resolving segments through {}", api.base_url);
            Ok(Box::new(HttpResolver::new(FabricClient::new(api))))
        }
        None => bail!("No segment source configured: add a [segments] table or an [api] section"),
    }
}

/// Client for reading observed connectors, if the API is configured
pub fn client(config: &NetformConfig) -> Result<FabricClient> {
    config
        .api
        .as_ref()
        .map(FabricClient::new)
        .context("No [api] section configured; pass --response to read a saved response instead")
}

#[cfg(test)]
mod tests {
    use super::*;
    use reconcile::ErrorCategory;
    use std::collections::BTreeMap;

    fn api(base_url: &str) -> ApiConfig {
        ApiConfig {
            base_url: base_url.to_string(),
            token_env: "NETFORM_TEST_TOKEN_UNSET".to_string(),
            timeout_secs: Some(2),
        }
    }

    #[test]
    fn test_url_joining() {
        let client = FabricClient::with_token(&api("https://fabric.example.net/api/v1/"), None);
        assert_eq!(
            client.url("/segments"),
            "https://fabric.example.net/api/v1/segments"
        );
        assert_eq!(
            client.url("connectors/dc-east"),
            "https://fabric.example.net/api/v1/connectors/dc-east"
        );
    }

    #[test]
    fn test_unreachable_api_is_transport_error() {
        // Nothing listens on the discard port
        let resolver = HttpResolver::new(FabricClient::with_token(&api("http://127.0.0.1:9"), None));

        let err = resolver.resolve_name_to_id("Blue").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Transport);
    }

    #[test]
    fn test_static_table_preferred() {
        let config = NetformConfig {
            api: Some(api("http://127.0.0.1:9")),
            segments: BTreeMap::from([("Blue".to_string(), "seg-1".to_string())]),
            connectors: Vec::new(),
        };

        let resolver = segment_resolver(&config).unwrap();
        assert_eq!(resolver.resolve_name_to_id("Blue").unwrap(), "seg-1");
        assert_eq!(resolver.resolve_id_to_name("seg-1").unwrap(), "Blue");
    }

    #[test]
    fn test_static_table_must_be_bijective() {
        let config = NetformConfig {
            segments: BTreeMap::from([
                ("Blue".to_string(), "seg-1".to_string()),
                ("Navy".to_string(), "seg-1".to_string()),
            ]),
            ..NetformConfig::default()
        };
        assert!(segment_resolver(&config).is_err());
    }

    #[test]
    fn test_no_segment_source() {
        assert!(segment_resolver(&NetformConfig::default()).is_err());
        assert!(client(&NetformConfig::default()).is_err());
    }
}
