// Centralized metric name constants for the selector (refresh loop + HTTP surface).

#[derive(Debug, Clone, Copy)]
pub struct Metric {
    pub name: &'static str,
    pub description: &'static str,
}

// Refresh loop metrics
pub const REFRESH_CYCLES_TOTAL: Metric = Metric {
    name: "weir_refresh_cycles_total",
    description: "Total number of refresh cycles executed (result={ok,empty,error})",
};

pub const REFRESH_CYCLE_DURATION_MS: Metric = Metric {
    name: "weir_refresh_cycle_duration_ms",
    description: "Latency of one acquire/score/publish cycle",
};

pub const SHARDS_OBSERVED: Metric = Metric {
    name: "weir_shards_observed",
    description: "Number of shards in the most recent resource snapshot",
};

pub const PUBLISHED_REQUEST_TYPES: Metric = Metric {
    name: "weir_published_request_types",
    description: "Number of request types with a published selection",
};

// HTTP surface metrics
pub const SELECT_REQUESTS_TOTAL: Metric = Metric {
    name: "weir_select_requests_total",
    description: "Total selection requests served (result={ok,bad_request,unknown_type,not_ready})",
};

pub const COUNTERS: &[Metric] = &[REFRESH_CYCLES_TOTAL, SELECT_REQUESTS_TOTAL];

pub const GAUGES: &[Metric] = &[SHARDS_OBSERVED, PUBLISHED_REQUEST_TYPES];

pub const HISTOGRAMS: &[Metric] = &[REFRESH_CYCLE_DURATION_MS];
