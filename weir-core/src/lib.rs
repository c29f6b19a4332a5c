mod errors;
pub use errors::{Result, SelectorError};

mod types;
pub use types::{RequestProfile, ScoredShard, Selection, Shard};

mod config;
pub use config::{SelectorConfig, DEFAULT_ACQUISITION_TIMEOUT, DEFAULT_REFRESH_INTERVAL};

// Scoring and selection over one snapshot
mod scoring;
pub use scoring::score;

mod selector;
pub use selector::select_best;

// Snapshot acquisition from metric sources
pub mod snapshot;
pub use snapshot::ResourceSnapshot;

mod source;
pub use source::{DimensionReadings, MetricSource};

// Published selections and the loop that renews them
mod store;
pub use store::SelectionStore;

mod refresher;
pub use refresher::Refresher;

pub mod telemetry;
