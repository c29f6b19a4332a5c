use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use weir_core::{
    RequestProfile, SelectorConfig, DEFAULT_ACQUISITION_TIMEOUT, DEFAULT_REFRESH_INTERVAL,
};

/// configuration settings loaded from the config file
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct LoadConfiguration {
    /// HTTP server configuration
    pub(crate) server: ServerConfig,
    /// Scoring and refresh configuration
    pub(crate) selector: SelectorNode,
    /// Metric source configuration
    pub(crate) source: SourceConfig,
}

/// configuration settings for the weir selection service
/// everything is validated here once, the running service never re-checks it
#[derive(Debug)]
pub(crate) struct ServiceConfiguration {
    /// Address serving the selection API
    pub(crate) listen_addr: SocketAddr,
    /// Prometheus exporter address
    pub(crate) prom_exporter: Option<SocketAddr>,
    /// Validated scoring configuration handed to the engine
    pub(crate) selector: SelectorConfig,
    /// Metric source configuration
    pub(crate) source: SourceConfig,
}

/// HTTP server configuration
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ServerConfig {
    /// Hostname or IP address the service binds to
    pub(crate) host: String,
    /// Port configuration
    pub(crate) ports: ServerPorts,
}

/// Server port configuration
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ServerPorts {
    /// Selection API port
    pub(crate) http: usize,
    /// Prometheus metrics exporter port (optional)
    pub(crate) prometheus: Option<usize>,
}

/// Scoring and refresh configuration node
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct SelectorNode {
    /// Seconds between refresh cycles; missing or non-positive falls back to 30
    pub(crate) refresh_interval_seconds: Option<i64>,
    /// Per-source acquisition timeout in seconds; missing or non-positive falls back to 10
    pub(crate) acquisition_timeout_seconds: Option<i64>,
    /// Global importance weight per resource dimension
    pub(crate) weights: BTreeMap<String, f64>,
    /// Maximum expected raw reading per dimension, scales usage into [0, 1]
    pub(crate) bounds: BTreeMap<String, f64>,
    /// Demand coefficients per request type
    pub(crate) request_profiles: BTreeMap<String, BTreeMap<String, f64>>,
}

/// Metric source configuration enum (tagged by `kind`)
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(tag = "kind")]
pub(crate) enum SourceConfig {
    #[serde(rename = "synthetic")]
    Synthetic {
        /// Shard names to synthesize readings for
        shards: Vec<String>,
    },
    #[serde(rename = "prometheus")]
    Prometheus {
        /// Base URL of the Prometheus API, e.g. http://localhost:9090
        endpoint: String,
        /// PromQL instant query per resource dimension
        queries: BTreeMap<String, String>,
        /// Per-query HTTP timeout in seconds (defaults to 10)
        timeout_seconds: Option<u64>,
        /// Authorization header value, if the endpoint requires one
        authorization: Option<String>,
        /// Label carrying the shard identifier (defaults to "pod")
        shard_label: Option<String>,
    },
}

/// Implementing the TryFrom trait to transform LoadConfiguration into ServiceConfiguration
impl TryFrom<LoadConfiguration> for ServiceConfiguration {
    type Error = anyhow::Error;

    fn try_from(config: LoadConfiguration) -> Result<Self> {
        // Construct listen_addr from server.host and server.ports.http
        let listen_addr: SocketAddr =
            format!("{}:{}", config.server.host, config.server.ports.http)
                .parse()
                .context("Failed to create listen_addr")?;

        // Construct prom_exporter from server.host and server.ports.prometheus if provided
        let prom_exporter: Option<SocketAddr> =
            if let Some(prom_port) = config.server.ports.prometheus {
                Some(
                    format!("{}:{}", config.server.host, prom_port)
                        .parse()
                        .context("Failed to create prom_exporter")?,
                )
            } else {
                None
            };

        let refresh_interval = duration_or_default(
            config.selector.refresh_interval_seconds,
            DEFAULT_REFRESH_INTERVAL,
            "refresh_interval_seconds",
        );
        let acquisition_timeout = duration_or_default(
            config.selector.acquisition_timeout_seconds,
            DEFAULT_ACQUISITION_TIMEOUT,
            "acquisition_timeout_seconds",
        );

        // The engine validates weights, bounds and profiles as one unit
        let profiles = config
            .selector
            .request_profiles
            .into_iter()
            .map(|(name, demand)| (name, RequestProfile::from(demand)))
            .collect();
        let selector = SelectorConfig::new(
            config.selector.weights,
            config.selector.bounds,
            profiles,
            refresh_interval,
            acquisition_timeout,
        )
        .context("Invalid selector configuration")?;

        Ok(ServiceConfiguration {
            listen_addr,
            prom_exporter,
            selector,
            source: config.source,
        })
    }
}

/// Seconds from the config file, falling back to the engine default when the
/// value is missing or non-positive.
fn duration_or_default(configured: Option<i64>, default: Duration, field: &'static str) -> Duration {
    match configured {
        Some(seconds) if seconds > 0 => Duration::from_secs(seconds as u64),
        Some(seconds) => {
            warn!(
                field = field,
                configured = seconds,
                default_seconds = default.as_secs(),
                "non-positive interval in config, falling back to default"
            );
            default
        }
        None => default,
    }
}
