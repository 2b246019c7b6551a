//! DNS provider client: the record read/rewrite side of failover.
//!
//! The monitor steers traffic by rewriting a single DNS record's answer to
//! the host of whichever endpoint should be active. This module provides the
//! [`DnsProvider`] seam the core decides against, plus the concrete client
//! for a name.com-style records API.
//!
//! Every method is total: transport failures, non-2xx responses and
//! unparseable bodies normalize to `false` / `None` / [`EndpointId::None`]
//! and are logged, never raised. A failed rewrite is retried naturally on
//! the next poll because the condition that wanted it persists.

use crate::config::Config;
use crate::types::EndpointId;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

/// External DNS collaborator as seen by the decision engine and controller.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Map the record's current answer to a configured endpoint.
    /// Unreachable APIs and unrecognized answers resolve to
    /// [`EndpointId::None`] - never a guess.
    async fn detect_active(&self) -> EndpointId;

    /// Rewrite the record to point at `endpoint`. Idempotent; returns
    /// whether the provider accepted the update.
    async fn switch_to(&self, endpoint: EndpointId) -> bool;

    /// Raw current answer of the managed record, for diagnostics.
    async fn current_answer(&self) -> Option<String>;
}

/// Body for the provider's record update call.
#[derive(Debug, Serialize)]
struct DnsRecordUpdate {
    host: String,
    fqdn: String,
    #[serde(rename = "type")]
    record_type: String,
    answer: String,
    ttl: u32,
}

/// Subset of the provider's record representation we read back.
#[derive(Debug, Deserialize)]
struct DnsRecord {
    answer: Option<String>,
}

/// Client for a name.com v4-style records API.
pub struct NameComDnsClient {
    client: Client,
    config: Config,
}

impl NameComDnsClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(config.timing.connection_timeout).build()?;
        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// URL of the one record this monitor manages.
    fn record_url(&self) -> Option<Url> {
        let dns = &self.config.dns;
        let path = format!("v4/domains/{}/records/{}", dns.domain, dns.record_id);
        match dns.api_base_url.join(&path) {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::error!("Invalid DNS API URL ({} + {}): {}", dns.api_base_url, path, e);
                None
            }
        }
    }

    async fn fetch_record(&self) -> Option<DnsRecord> {
        let url = self.record_url()?;
        let dns = &self.config.dns;

        let response = self
            .client
            .get(url)
            .basic_auth(&dns.username, Some(&dns.password))
            .send()
            .await;

        match response {
            Ok(resp) if resp.status() == StatusCode::OK => match resp.json::<DnsRecord>().await {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!("Failed to parse DNS record response: {}", e);
                    None
                }
            },
            Ok(resp) => {
                tracing::warn!("Failed to read DNS record: HTTP {}", resp.status());
                None
            }
            Err(e) => {
                tracing::warn!("Error reading DNS record: {}", e);
                None
            }
        }
    }
}

#[async_trait]
impl DnsProvider for NameComDnsClient {
    async fn detect_active(&self) -> EndpointId {
        let Some(answer) = self.current_answer().await else {
            return EndpointId::None;
        };

        if answer == self.config.primary.host {
            EndpointId::Primary
        } else if answer == self.config.secondary.host {
            EndpointId::Secondary
        } else {
            tracing::warn!("DNS answer '{}' matches neither configured endpoint", answer);
            EndpointId::None
        }
    }

    async fn switch_to(&self, endpoint: EndpointId) -> bool {
        let server = match endpoint {
            EndpointId::Primary => &self.config.primary,
            EndpointId::Secondary => &self.config.secondary,
            EndpointId::None => {
                tracing::error!("Cannot switch DNS to NONE - no server specified");
                return false;
            }
        };

        let Some(url) = self.record_url() else {
            return false;
        };
        let dns = &self.config.dns;

        let request = DnsRecordUpdate {
            host: dns.record_host.clone(),
            fqdn: dns.record_fqdn.clone(),
            record_type: dns.record_type.clone(),
            answer: server.host.clone(),
            ttl: dns.record_ttl,
        };

        tracing::info!("Switching DNS to {} ({}: {})", endpoint, server.name, server.host);

        let response = self
            .client
            .put(url)
            .basic_auth(&dns.username, Some(&dns.password))
            .json(&request)
            .send()
            .await;

        match response {
            Ok(resp) if resp.status() == StatusCode::OK => {
                tracing::info!("Successfully switched DNS to {}", endpoint);
                true
            }
            Ok(resp) => {
                tracing::error!("Failed to switch DNS to {}: HTTP {}", endpoint, resp.status());
                false
            }
            Err(e) => {
                tracing::error!("Error switching DNS to {}: {}", endpoint, e);
                false
            }
        }
    }

    async fn current_answer(&self) -> Option<String> {
        self.fetch_record().await?.answer
    }
}
