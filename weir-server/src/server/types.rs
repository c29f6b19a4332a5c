use std::collections::BTreeMap;

use serde::Serialize;
use weir_core::Selection;

/// Body of a successful GET /select_shard response.
#[derive(Debug, Serialize)]
pub(crate) struct ShardSelectionDto {
    /// Name of the least-loaded shard for the requested type.
    pub(crate) selected_shard: String,
    /// Readings and score of the selected shard.
    pub(crate) selected_metrics: ShardMetricsDto,
    /// Every observed shard, ordered by ascending score.
    pub(crate) all_shards: Vec<RankedShardDto>,
    /// RFC 3339 capture time of the snapshot behind this selection.
    pub(crate) last_updated: String,
}

/// Usage readings of one shard, flattened next to its score.
#[derive(Debug, Serialize)]
pub(crate) struct ShardMetricsDto {
    #[serde(flatten)]
    pub(crate) usage: BTreeMap<String, f64>,
    pub(crate) score: f64,
}

/// One entry of the ranked shard list.
#[derive(Debug, Serialize)]
pub(crate) struct RankedShardDto {
    pub(crate) name: String,
    #[serde(flatten)]
    pub(crate) usage: BTreeMap<String, f64>,
    pub(crate) score: f64,
}

#[derive(Debug, Serialize)]
pub(crate) struct HealthDto {
    pub(crate) status: &'static str,
    /// Number of request types with a published selection.
    pub(crate) request_types: usize,
    /// RFC 3339 timestamp of the newest published selection, if any.
    pub(crate) last_updated: Option<String>,
    /// True when the newest publication is older than two refresh intervals.
    pub(crate) stale: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct ErrorBody {
    pub(crate) error: String,
}

impl ErrorBody {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

impl ShardSelectionDto {
    pub(crate) fn from_selection(selection: &Selection) -> Self {
        Self {
            selected_shard: selection.shard.name.clone(),
            selected_metrics: ShardMetricsDto {
                usage: selection.shard.usage.clone(),
                score: selection.score,
            },
            all_shards: selection
                .ranked
                .iter()
                .map(|scored| RankedShardDto {
                    name: scored.shard.name.clone(),
                    usage: scored.shard.usage.clone(),
                    score: scored.score,
                })
                .collect(),
            last_updated: selection.snapshot_at.to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use weir_core::{ScoredShard, Shard};

    #[test]
    fn selection_serializes_with_flattened_readings() {
        let shard = Shard {
            name: "shard-a".to_string(),
            usage: BTreeMap::from([("cpu".to_string(), 1.0), ("io".to_string(), 0.25)]),
        };
        let selection = Selection {
            request_type: "analytics".to_string(),
            shard: shard.clone(),
            score: 0.495,
            ranked: vec![ScoredShard {
                shard,
                score: 0.495,
            }],
            snapshot_at: Utc::now(),
        };

        let dto = ShardSelectionDto::from_selection(&selection);
        let json = serde_json::to_value(&dto).unwrap();

        assert_eq!(json["selected_shard"], "shard-a");
        assert_eq!(json["selected_metrics"]["cpu"], 1.0);
        assert_eq!(json["selected_metrics"]["io"], 0.25);
        assert_eq!(json["selected_metrics"]["score"], 0.495);
        assert_eq!(json["all_shards"][0]["name"], "shard-a");
        assert!(json["last_updated"].is_string());
    }
}
