mod prometheus;
mod synthetic;

use std::time::Duration;

use anyhow::{bail, Result};
use tracing::{info, warn};

use weir_core::{MetricSource, SelectorConfig};

use crate::service_configuration::SourceConfig;
use prometheus::PrometheusSource;
use synthetic::SyntheticSource;

/// Default per-query timeout for the Prometheus source.
const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Label carrying the shard identifier unless configured otherwise.
const DEFAULT_SHARD_LABEL: &str = "pod";

/// Builds one metric source per weighted dimension from the configuration.
///
/// The synthetic variant reuses each dimension's normalization bound as the
/// range of its invented readings. The prometheus variant requires a query
/// for every weighted dimension and shares one HTTP client across sources.
pub(crate) fn build_sources(
    source: &SourceConfig,
    selector: &SelectorConfig,
) -> Result<Vec<Box<dyn MetricSource>>> {
    match source {
        SourceConfig::Synthetic { shards } => {
            if shards.is_empty() {
                bail!("synthetic source requires at least one shard name");
            }
            info!(shards = shards.len(), "using synthetic metric sources");
            Ok(selector
                .bounds
                .iter()
                .map(|(dimension, bound)| {
                    Box::new(SyntheticSource::new(
                        dimension.clone(),
                        *bound,
                        shards.clone(),
                    )) as Box<dyn MetricSource>
                })
                .collect())
        }
        SourceConfig::Prometheus {
            endpoint,
            queries,
            timeout_seconds,
            authorization,
            shard_label,
        } => {
            let timeout = match timeout_seconds {
                Some(seconds) if *seconds > 0 => Duration::from_secs(*seconds),
                _ => DEFAULT_QUERY_TIMEOUT,
            };
            let http = reqwest::Client::builder().timeout(timeout).build()?;
            let shard_label = shard_label
                .clone()
                .unwrap_or_else(|| DEFAULT_SHARD_LABEL.to_string());

            for dimension in queries.keys() {
                if !selector.weights.contains_key(dimension) {
                    warn!(
                        dimension = %dimension,
                        "query configured for an unweighted dimension, ignoring"
                    );
                }
            }

            info!(
                endpoint = %endpoint,
                queries = queries.len(),
                "using prometheus metric sources"
            );
            selector
                .weights
                .keys()
                .map(|dimension| {
                    let query = queries.get(dimension).ok_or_else(|| {
                        anyhow::anyhow!(
                            "no PromQL query configured for weighted dimension '{}'",
                            dimension
                        )
                    })?;
                    Ok(Box::new(PrometheusSource::new(
                        dimension.clone(),
                        endpoint.trim_end_matches('/').to_string(),
                        query.clone(),
                        shard_label.clone(),
                        authorization.clone(),
                        http.clone(),
                    )) as Box<dyn MetricSource>)
                })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use weir_core::RequestProfile;

    fn selector() -> SelectorConfig {
        SelectorConfig::new(
            BTreeMap::from([("cpu".to_string(), 0.5), ("io".to_string(), 0.5)]),
            BTreeMap::from([("cpu".to_string(), 2.0), ("io".to_string(), 100.0)]),
            BTreeMap::from([(
                "analytics".to_string(),
                RequestProfile::from(BTreeMap::from([("cpu".to_string(), 1.0)])),
            )]),
            Duration::from_secs(30),
            Duration::from_secs(10),
        )
        .unwrap()
    }

    #[test]
    fn synthetic_builds_one_source_per_dimension() {
        let source = SourceConfig::Synthetic {
            shards: vec!["shard-0".to_string()],
        };

        let sources = build_sources(&source, &selector()).unwrap();

        let mut dimensions: Vec<&str> = sources.iter().map(|s| s.dimension()).collect();
        dimensions.sort_unstable();
        assert_eq!(dimensions, vec!["cpu", "io"]);
    }

    #[test]
    fn synthetic_without_shards_is_an_error() {
        let source = SourceConfig::Synthetic { shards: Vec::new() };

        let result = build_sources(&source, &selector());

        assert!(result.is_err());
    }

    #[test]
    fn prometheus_builds_one_source_per_weighted_dimension() {
        let source = SourceConfig::Prometheus {
            endpoint: "http://localhost:9090/".to_string(),
            queries: BTreeMap::from([
                ("cpu".to_string(), "cpu_query".to_string()),
                ("io".to_string(), "io_query".to_string()),
            ]),
            timeout_seconds: Some(5),
            authorization: None,
            shard_label: None,
        };

        let sources = build_sources(&source, &selector()).unwrap();

        assert_eq!(sources.len(), 2);
    }

    #[test]
    fn prometheus_missing_a_query_is_an_error() {
        let source = SourceConfig::Prometheus {
            endpoint: "http://localhost:9090".to_string(),
            queries: BTreeMap::from([("cpu".to_string(), "cpu_query".to_string())]),
            timeout_seconds: None,
            authorization: None,
            shard_label: None,
        };

        let result = build_sources(&source, &selector());

        assert!(result.is_err());
        assert!(result.err().unwrap().to_string().contains("io"));
    }
}
