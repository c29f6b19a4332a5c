use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::types::Selection;

/// Atomically published selections, one per request type.
///
/// Readers load the current map wait-free and never block the refresher.
/// The refresher is the single writer and always swaps the whole map, so a
/// reader sees either the previous cycle or the next one, never a mix.
pub struct SelectionStore {
    selections: ArcSwap<HashMap<String, Arc<Selection>>>,
}

impl SelectionStore {
    /// Starts empty; reads return nothing until the first publish.
    pub fn new() -> Self {
        Self {
            selections: ArcSwap::from_pointee(HashMap::new()),
        }
    }

    /// Current selection for a request type, if one has been published.
    pub fn read(&self, request_type: &str) -> Option<Arc<Selection>> {
        self.selections.load().get(request_type).cloned()
    }

    /// Replaces the published map wholesale.
    pub fn publish(&self, next: HashMap<String, Arc<Selection>>) {
        self.selections.store(Arc::new(next));
    }

    /// The full published map, pinned at the moment of the call.
    pub fn selections(&self) -> Arc<HashMap<String, Arc<Selection>>> {
        self.selections.load_full()
    }

    /// Number of request types currently published.
    pub fn len(&self) -> usize {
        self.selections.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.selections.load().is_empty()
    }
}

impl Default for SelectionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Shard;
    use chrono::Utc;
    use std::collections::BTreeMap;

    fn selection(request_type: &str, shard_name: &str) -> Arc<Selection> {
        Arc::new(Selection {
            request_type: request_type.to_string(),
            shard: Shard {
                name: shard_name.to_string(),
                usage: BTreeMap::new(),
            },
            score: 0.0,
            ranked: Vec::new(),
            snapshot_at: Utc::now(),
        })
    }

    #[test]
    fn empty_store_reads_nothing() {
        let store = SelectionStore::new();

        assert!(store.read("analytics").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn publish_makes_selections_readable() {
        let store = SelectionStore::new();

        store.publish(HashMap::from([
            ("analytics".to_string(), selection("analytics", "shard-a")),
            (
                "simple_read".to_string(),
                selection("simple_read", "shard-b"),
            ),
        ]));

        assert_eq!(store.len(), 2);
        assert_eq!(store.read("analytics").unwrap().shard.name, "shard-a");
        assert_eq!(store.read("simple_read").unwrap().shard.name, "shard-b");
    }

    #[test]
    fn publish_replaces_the_whole_map() {
        let store = SelectionStore::new();
        store.publish(HashMap::from([(
            "analytics".to_string(),
            selection("analytics", "shard-a"),
        )]));

        store.publish(HashMap::from([(
            "simple_read".to_string(),
            selection("simple_read", "shard-b"),
        )]));

        assert!(store.read("analytics").is_none());
        assert_eq!(store.read("simple_read").unwrap().shard.name, "shard-b");
    }

    #[test]
    fn republishing_the_same_map_is_idempotent() {
        let store = SelectionStore::new();
        let map = HashMap::from([("analytics".to_string(), selection("analytics", "shard-a"))]);

        store.publish(map.clone());
        let first = store.read("analytics").unwrap();
        store.publish(map);
        let second = store.read("analytics").unwrap();

        assert_eq!(first, second);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn pinned_map_survives_a_later_publish() {
        let store = SelectionStore::new();
        store.publish(HashMap::from([(
            "analytics".to_string(),
            selection("analytics", "shard-a"),
        )]));

        let pinned = store.selections();
        store.publish(HashMap::new());

        assert_eq!(pinned["analytics"].shard.name, "shard-a");
        assert!(store.is_empty());
    }
}
