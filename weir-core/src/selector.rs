use crate::config::SelectorConfig;
use crate::errors::{Result, SelectorError};
use crate::scoring::score;
use crate::snapshot::ResourceSnapshot;
use crate::types::{ScoredShard, Selection};

/// Picks the least-loaded shard for a request type from one snapshot.
///
/// ## Algorithm
/// Scores every shard in the snapshot with the request type's profile, then
/// orders by ascending score with the shard name as tie-break. The head of
/// the ranking wins. `total_cmp` keeps the float ordering total and the name
/// tie-break makes reruns over the same snapshot byte-for-byte identical.
///
/// ## Returns
/// The winning shard together with the full ranking, or
/// [`SelectorError::UnknownRequestType`] / [`SelectorError::NoShardsAvailable`]
/// when the request type is not configured or the snapshot is empty.
pub fn select_best(
    snapshot: &ResourceSnapshot,
    request_type: &str,
    config: &SelectorConfig,
) -> Result<Selection> {
    let profile = config
        .profiles
        .get(request_type)
        .ok_or_else(|| SelectorError::UnknownRequestType(request_type.to_string()))?;

    if snapshot.shards.is_empty() {
        return Err(SelectorError::NoShardsAvailable);
    }

    let mut ranked: Vec<ScoredShard> = snapshot
        .shards
        .values()
        .map(|shard| ScoredShard {
            shard: shard.clone(),
            score: score(shard, profile, &config.weights, &config.bounds),
        })
        .collect();
    ranked.sort_by(|a, b| {
        a.score
            .total_cmp(&b.score)
            .then_with(|| a.shard.name.cmp(&b.shard.name))
    });

    let best = &ranked[0];
    Ok(Selection {
        request_type: request_type.to_string(),
        shard: best.shard.clone(),
        score: best.score,
        ranked,
        snapshot_at: snapshot.captured_at,
    })
}
