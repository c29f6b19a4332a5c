use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::errors::{Result, SelectorError};
use crate::source::MetricSource;
use crate::types::Shard;

/// All shards observed at one instant, keyed by shard identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceSnapshot {
    pub shards: BTreeMap<String, Shard>,
    /// When the acquisition finished.
    pub captured_at: DateTime<Utc>,
}

/// Acquires every source once and assembles a consistent snapshot.
///
/// The shard set is the union over all sources; a shard missing from one
/// source still appears, with that dimension absent from its usage map.
/// Each acquisition is bounded by `acquisition_timeout`, and any source
/// error or timeout fails the whole build so a cycle never scores a
/// half-acquired view.
pub async fn build(
    sources: &[Box<dyn MetricSource>],
    acquisition_timeout: Duration,
) -> Result<ResourceSnapshot> {
    let mut usage_by_shard: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();

    for source in sources {
        let dimension = source.dimension();
        let readings = match tokio::time::timeout(acquisition_timeout, source.collect()).await {
            Ok(Ok(readings)) => readings,
            Ok(Err(e)) => {
                return Err(SelectorError::Acquisition {
                    dimension: dimension.to_string(),
                    reason: e.to_string(),
                })
            }
            Err(_) => {
                return Err(SelectorError::Acquisition {
                    dimension: dimension.to_string(),
                    reason: format!("timed out after {:?}", acquisition_timeout),
                })
            }
        };
        debug!(
            dimension = %dimension,
            shards = readings.len(),
            "acquired dimension readings"
        );
        for (shard, value) in readings {
            // A negative reading is a reporter bug, clamp instead of rejecting.
            usage_by_shard
                .entry(shard)
                .or_default()
                .insert(dimension.to_string(), value.max(0.0));
        }
    }

    let shards = usage_by_shard
        .into_iter()
        .map(|(name, usage)| {
            let shard = Shard {
                name: name.clone(),
                usage,
            };
            (name, shard)
        })
        .collect();

    Ok(ResourceSnapshot {
        shards,
        captured_at: Utc::now(),
    })
}
