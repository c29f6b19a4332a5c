use std::collections::HashMap;

use async_trait::async_trait;

/// Raw readings for one resource dimension, keyed by shard identifier.
pub type DimensionReadings = HashMap<String, f64>;

/// A provider of raw usage readings for exactly one resource dimension.
///
/// Implementations decide where the numbers come from, the snapshot builder
/// only unions their answers. A source reports the shards it can currently
/// see; shards differing between sources is expected, not an error.
#[async_trait]
pub trait MetricSource: Send + Sync {
    /// The resource dimension this source reports, e.g. "cpu".
    fn dimension(&self) -> &str;

    /// Collect one reading per visible shard.
    async fn collect(&self) -> anyhow::Result<DimensionReadings>;
}
