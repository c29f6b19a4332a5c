use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "weir-server", about = "Weighted least-load shard selector")]
pub(crate) struct Args {
    /// Path to the YAML service configuration
    #[arg(long, default_value = "config/weir.yml", env = "WEIR_CONFIG_FILE")]
    pub(crate) config_file: String,

    /// HTTP listen address, overrides the value from the config file
    #[arg(long, env = "WEIR_LISTEN_ADDR")]
    pub(crate) listen_addr: Option<String>,

    /// Prometheus exporter address, overrides the value from the config file
    #[arg(long, env = "WEIR_PROM_EXPORTER")]
    pub(crate) prom_exporter: Option<String>,

    /// Refresh interval in seconds, overrides the value from the config file
    #[arg(long, env = "WEIR_REFRESH_INTERVAL_SECONDS")]
    pub(crate) refresh_interval_seconds: Option<u64>,
}
