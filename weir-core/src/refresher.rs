use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::SelectorConfig;
use crate::errors::Result;
use crate::selector::select_best;
use crate::snapshot;
use crate::source::MetricSource;
use crate::store::SelectionStore;
use crate::telemetry::{
    PUBLISHED_REQUEST_TYPES, REFRESH_CYCLES_TOTAL, REFRESH_CYCLE_DURATION_MS, SHARDS_OBSERVED,
};
use crate::types::Selection;

/// Refresher periodically acquires a resource snapshot, recomputes the
/// selection for every configured request type and publishes the result to
/// the [`SelectionStore`]. It is the store's single writer.
pub struct Refresher {
    config: Arc<SelectorConfig>,
    sources: Vec<Box<dyn MetricSource>>,
    store: Arc<SelectionStore>,
}

impl Refresher {
    pub fn new(
        config: Arc<SelectorConfig>,
        sources: Vec<Box<dyn MetricSource>>,
        store: Arc<SelectionStore>,
    ) -> Self {
        Self {
            config,
            sources,
            store,
        }
    }

    /// Start without an explicit cancellation token.
    /// Used by tests; for production, prefer start_with_cancel so callers can stop the loop.
    pub fn start(self: Arc<Self>) -> JoinHandle<Result<()>> {
        let token = CancellationToken::new();
        self.start_with_cancel(token)
    }

    /// Start the background refresh loop with an explicit cancellation token.
    ///
    /// An in-flight cycle is never interrupted mid-publish; cancellation takes
    /// effect between cycles, so stopping waits at most one acquisition.
    pub fn start_with_cancel(
        self: Arc<Self>,
        cancel: CancellationToken,
    ) -> JoinHandle<Result<()>> {
        tokio::spawn(async move {
            info!(
                target = "refresher",
                interval_seconds = self.config.refresh_interval.as_secs(),
                sources = self.sources.len(),
                request_types = self.config.profiles.len(),
                "refresher started"
            );

            // Run one immediate cycle so the store is populated at startup.
            if let Err(e) = self.run_once().await {
                error!(
                    target = "refresher",
                    error = %e,
                    "refresh cycle failed on startup"
                );
                counter!(REFRESH_CYCLES_TOTAL.name, "result" => "error").increment(1);
            }

            let mut ticker = tokio::time::interval(self.config.refresh_interval);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        info!(target = "refresher", "refresher stopped (cancel)");
                        break;
                    }
                    _ = ticker.tick() => {
                        if let Err(e) = self.run_once().await {
                            error!(
                                target = "refresher",
                                error = %e,
                                "refresh cycle failed"
                            );
                            counter!(REFRESH_CYCLES_TOTAL.name, "result" => "error").increment(1);
                        }
                    }
                }
            }
            Ok(())
        })
    }

    /// Run a single acquire/score/publish cycle.
    ///
    /// A failed acquisition aborts the cycle and leaves the store untouched.
    /// A request type whose selection fails keeps its previous entry in the
    /// published map; if no request type succeeds the cycle publishes nothing
    /// at all.
    pub async fn run_once(&self) -> Result<()> {
        let started = Instant::now();

        let snapshot = snapshot::build(&self.sources, self.config.acquisition_timeout).await?;
        gauge!(SHARDS_OBSERVED.name).set(snapshot.shards.len() as f64);

        // Start from the previous map so failing request types keep serving
        // their last good selection.
        let mut next: HashMap<String, Arc<Selection>> = self.store.selections().as_ref().clone();
        let mut selected = 0usize;
        for request_type in self.config.profiles.keys() {
            match select_best(&snapshot, request_type, &self.config) {
                Ok(selection) => {
                    next.insert(request_type.clone(), Arc::new(selection));
                    selected += 1;
                }
                Err(e) => {
                    warn!(
                        target = "refresher",
                        request_type = %request_type,
                        error = %e,
                        "selection failed this cycle, keeping previous entry"
                    );
                }
            }
        }

        if selected == 0 {
            warn!(
                target = "refresher",
                shards = snapshot.shards.len(),
                "no request type produced a selection, skipping publish"
            );
            counter!(REFRESH_CYCLES_TOTAL.name, "result" => "empty").increment(1);
            return Ok(());
        }

        self.store.publish(next);
        counter!(REFRESH_CYCLES_TOTAL.name, "result" => "ok").increment(1);
        gauge!(PUBLISHED_REQUEST_TYPES.name).set(self.store.len() as f64);
        histogram!(REFRESH_CYCLE_DURATION_MS.name).record(started.elapsed().as_secs_f64() * 1000.0);
        info!(
            target = "refresher",
            request_types = selected,
            shards = snapshot.shards.len(),
            "published selections"
        );
        Ok(())
    }
}

// Tests for Refresher are in refresher_test.rs
#[cfg(test)]
#[path = "refresher_test.rs"]
mod tests;
