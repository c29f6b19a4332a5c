use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use weir_core::{DimensionReadings, MetricSource};

/// Metric source backed by a Prometheus instant query.
///
/// One source runs one PromQL query against /api/v1/query and turns each
/// returned sample into a shard reading, taking the shard identifier from a
/// configurable label. Samples without that label or with an unparsable
/// value are skipped rather than failing the acquisition.
pub(crate) struct PrometheusSource {
    dimension: String,
    endpoint: String,
    query: String,
    shard_label: String,
    authorization: Option<String>,
    http: reqwest::Client,
}

/// Instant query response envelope, api/v1/query format.
#[derive(Debug, Deserialize)]
pub(crate) struct PromResponse {
    pub(crate) status: String,
    pub(crate) data: PromData,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PromData {
    #[serde(default)]
    pub(crate) result: Vec<PromSample>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PromSample {
    #[serde(default)]
    pub(crate) metric: HashMap<String, String>,
    /// Prometheus encodes a sample as [unix_seconds, "value"].
    pub(crate) value: (f64, String),
}

impl PrometheusSource {
    pub(crate) fn new(
        dimension: String,
        endpoint: String,
        query: String,
        shard_label: String,
        authorization: Option<String>,
        http: reqwest::Client,
    ) -> Self {
        Self {
            dimension,
            endpoint,
            query,
            shard_label,
            authorization,
            http,
        }
    }

    /// One reading per sample carrying the shard label and a numeric value.
    fn readings_from(&self, response: PromResponse) -> DimensionReadings {
        let mut readings = DimensionReadings::new();
        for sample in response.data.result {
            let Some(shard) = sample.metric.get(&self.shard_label) else {
                debug!(
                    dimension = %self.dimension,
                    shard_label = %self.shard_label,
                    "sample without shard label, skipping"
                );
                continue;
            };
            // "NaN" parses as a float, so finiteness needs its own check.
            match sample.value.1.parse::<f64>() {
                Ok(value) if value.is_finite() => {
                    readings.insert(shard.clone(), value);
                }
                Ok(_) | Err(_) => {
                    warn!(
                        dimension = %self.dimension,
                        shard = %shard,
                        raw = %sample.value.1,
                        "unparsable sample value, skipping"
                    );
                }
            }
        }
        readings
    }
}

#[async_trait]
impl MetricSource for PrometheusSource {
    fn dimension(&self) -> &str {
        &self.dimension
    }

    async fn collect(&self) -> anyhow::Result<DimensionReadings> {
        let url = format!("{}/api/v1/query", self.endpoint);
        let mut request = self
            .http
            .get(&url)
            .query(&[("query", self.query.as_str())]);
        if let Some(authorization) = &self.authorization {
            request = request.header(reqwest::header::AUTHORIZATION, authorization);
        }

        let response = request.send().await?.error_for_status()?;
        let parsed: PromResponse = response.json().await?;
        if parsed.status != "success" {
            anyhow::bail!(
                "prometheus query for '{}' returned status '{}'",
                self.dimension,
                parsed.status
            );
        }

        Ok(self.readings_from(parsed))
    }
}
