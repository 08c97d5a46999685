use auction_engine::SchedulerConfig;
use clap::Parser;
use persistence::FileStoreConfig;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// Gateway configuration, from command line flags or the environment
#[derive(Debug, Clone, Parser)]
#[command(name = "gateway", about = "HTTP gateway for the reverse-auction marketplace")]
pub struct Config {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0")]
    pub bind_addr: IpAddr,

    /// Snapshot file holding jobs and bids
    #[arg(long, env = "DB_PATH", default_value = "db.snap")]
    pub db_path: PathBuf,

    /// zstd-compress the snapshot file
    #[arg(long, env = "COMPRESS_SNAPSHOTS")]
    pub compress_snapshots: bool,

    /// Seconds between expiry sweeps
    #[arg(long, env = "SWEEP_INTERVAL_SECS", default_value_t = 10)]
    pub sweep_interval_secs: u64,

    /// tracing-subscriber filter directive
    #[arg(long, env = "LOG_FILTER", default_value = "info")]
    pub log_filter: String,
}

impl Config {
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }

    pub fn store_config(&self) -> FileStoreConfig {
        FileStoreConfig {
            path: self.db_path.clone(),
            compress: self.compress_snapshots,
        }
    }

    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            // A zero interval would make tokio panic
            interval: Duration::from_secs(self.sweep_interval_secs.max(1)),
        }
    }
}
