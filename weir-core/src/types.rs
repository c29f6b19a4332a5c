use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

/// One backend worker as observed in a resource snapshot.
///
/// The usage map is sparse: it carries only the dimensions a source actually
/// reported for this shard. Scoring treats an absent dimension as saturated,
/// so a shard never benefits from a gap in its readings.
#[derive(Debug, Clone, PartialEq)]
pub struct Shard {
    /// Stable shard identifier, also the tie-break key during selection.
    pub name: String,
    /// Raw readings keyed by dimension name, clamped to be non-negative.
    pub usage: BTreeMap<String, f64>,
}

/// Resource demand coefficients for one request type.
///
/// A dimension missing from the map demands nothing and contributes zero to
/// the score for that request type.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestProfile {
    pub demand: BTreeMap<String, f64>,
}

impl From<BTreeMap<String, f64>> for RequestProfile {
    fn from(demand: BTreeMap<String, f64>) -> Self {
        Self { demand }
    }
}

/// A shard paired with its score for one request type.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredShard {
    pub shard: Shard,
    pub score: f64,
}

/// The outcome of selecting a shard for one request type against one snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Request type this selection answers.
    pub request_type: String,
    /// The winning shard, equal to the head of `ranked`.
    pub shard: Shard,
    /// Score of the winning shard; lower means less loaded.
    pub score: f64,
    /// Every observed shard ordered by ascending score, names breaking ties.
    pub ranked: Vec<ScoredShard>,
    /// Capture time of the snapshot this selection was computed from.
    pub snapshot_at: DateTime<Utc>,
}
