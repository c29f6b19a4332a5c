use async_trait::async_trait;
use rand::{rng, Rng};

use weir_core::{DimensionReadings, MetricSource};

/// Metric source that invents readings for a fixed shard list.
///
/// Every collect draws one uniform value in [0, bound] per shard, so the
/// service can be exercised end to end without a metrics backend. The bound
/// equals the dimension's normalization bound, which keeps the synthetic
/// readings inside the range real shards would report.
pub(crate) struct SyntheticSource {
    dimension: String,
    bound: f64,
    shards: Vec<String>,
}

impl SyntheticSource {
    pub(crate) fn new(dimension: String, bound: f64, shards: Vec<String>) -> Self {
        Self {
            dimension,
            bound,
            shards,
        }
    }
}

#[async_trait]
impl MetricSource for SyntheticSource {
    fn dimension(&self) -> &str {
        &self.dimension
    }

    async fn collect(&self) -> anyhow::Result<DimensionReadings> {
        let mut rng = rng();
        Ok(self
            .shards
            .iter()
            .map(|shard| (shard.clone(), rng.random_range(0.0..=self.bound)))
            .collect())
    }
}
