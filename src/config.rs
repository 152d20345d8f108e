//! Server configuration
//!
//! Read from command-line flags, with environment variable fallbacks.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use crate::model::{demo_model, LoadedModel};
use crate::types::{SyncError, SyncResult};

/// Serve a network graph to the netgraph browser client
#[derive(Debug, Clone, Parser)]
#[command(name = "netgraph-server", version, about)]
pub struct Config {
    /// JSON model description; a built-in demo model is served when omitted
    #[arg(long, env = "NETGRAPH_MODEL")]
    pub model: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "NETGRAPH_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to bind
    #[arg(long, env = "NETGRAPH_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Milliseconds between synchronization ticks
    #[arg(long, env = "NETGRAPH_TICK_MS", default_value_t = 50)]
    pub tick_ms: u64,
}

impl Config {
    /// `host:port` as configured, before name resolution
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Resolve the configured host and bind the listener
    pub async fn bind(&self) -> SyncResult<TcpListener> {
        TcpListener::bind((self.host.as_str(), self.port))
            .await
            .map_err(|source| SyncError::Bind {
                addr: self.listen_addr(),
                source,
            })
    }

    /// Interval between ticks, never zero
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }

    /// Load the configured model, or the demo model
    pub fn load_model(&self) -> SyncResult<LoadedModel> {
        match &self.model {
            Some(path) => {
                info!(path = %path.display(), "Loading model file");
                LoadedModel::from_file(path)
            }
            None => {
                info!("No model file configured, serving demo model");
                demo_model()
            }
        }
    }
}
