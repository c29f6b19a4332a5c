use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::info;
use weir_core::telemetry::{Metric, COUNTERS, GAUGES, HISTOGRAMS};

pub(crate) fn init_metrics(prom_addr: Option<std::net::SocketAddr>) {
    info!("initializing metrics exporter");

    if let Some(addr) = prom_addr {
        PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()
            .expect("failed to install Prometheus recorder");
    }

    for metric in COUNTERS {
        register_counter(metric)
    }

    for metric in GAUGES {
        register_gauge(metric)
    }

    for metric in HISTOGRAMS {
        register_histogram(metric)
    }
}

/// Registers a counter with the given name.
fn register_counter(metric: &Metric) {
    metrics::describe_counter!(metric.name, metric.description);
    let _counter = metrics::counter!(metric.name);
}

/// Registers a gauge with the given name.
fn register_gauge(metric: &Metric) {
    metrics::describe_gauge!(metric.name, metric.description);
    let _gauge = metrics::gauge!(metric.name);
}

/// Registers a histogram with the given name.
fn register_histogram(metric: &Metric) {
    metrics::describe_histogram!(metric.name, metric.description);
    let _histogram = metrics::histogram!(metric.name);
}
