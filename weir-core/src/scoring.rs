use std::collections::BTreeMap;

use crate::types::{RequestProfile, Shard};

/// Weighted, normalized least-load score of one shard for one request type.
///
/// ## Algorithm
/// For every weighted dimension the raw reading is scaled against its
/// normalization bound and clamped into [0, 1], then multiplied by the
/// dimension weight and the profile's demand coefficient:
/// - score = sum over dimensions of weight * clamp(usage / bound, 0, 1) * demand
/// - a dimension absent from the profile demands nothing and adds zero
/// - a reading absent from the shard counts as saturated (normalized 1.0),
///   never as idle
///
/// ## Returns
/// Non-negative finite score; lower means the shard is a better fit.
pub fn score(
    shard: &Shard,
    profile: &RequestProfile,
    weights: &BTreeMap<String, f64>,
    bounds: &BTreeMap<String, f64>,
) -> f64 {
    let mut total = 0.0;

    for (dimension, weight) in weights {
        let demand = profile.demand.get(dimension).copied().unwrap_or(0.0);
        let normalized = match (shard.usage.get(dimension), bounds.get(dimension)) {
            (Some(raw), Some(bound)) => (raw / bound).clamp(0.0, 1.0),
            _ => 1.0,
        };
        total += weight * normalized * demand;
    }

    total
}
