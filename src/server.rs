use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context;
use clap::Parser;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::{
    aof::{Aof, DEFAULT_AOF_PATH},
    commands::CommandDispatcher,
    connection::handle_client_connection,
    store::Store,
};

pub const DEFAULT_PORT: u16 = 6379;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    InvalidArguments(#[from] clap::Error),
}

/// Startup configuration, parsed from command line flags.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "redis-lite", about = "In-memory key-value server", disable_version_flag = true)]
pub struct ServerConfig {
    /// Print version and build metadata, then exit.
    #[arg(long)]
    pub version: bool,

    /// TCP port to listen on.
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Append-only file used for persistence. Parent directories are created.
    #[arg(long, default_value = DEFAULT_AOF_PATH)]
    pub aof_path: PathBuf,

    /// Interval between fsyncs of the append-only file, in milliseconds.
    #[arg(long, default_value_t = 1000, value_parser = clap::value_parser!(u64).range(1..))]
    pub fsync_interval_ms: u64,
}

#[derive(Debug)]
pub struct RedisServer {
    pub config: ServerConfig,
}

impl RedisServer {
    /// Builds a server from process-style arguments; the first item is the
    /// program name.
    pub fn new<I: IntoIterator<Item = String>>(command_line_args: I) -> Result<Self, CliError> {
        let config = ServerConfig::try_parse_from(command_line_args)?;

        Ok(RedisServer { config })
    }

    /// Opens and replays the persistence log, then accepts connections
    /// forever. Failing to open the log or bind the port aborts startup.
    pub async fn run(self) -> anyhow::Result<()> {
        let store = Arc::new(Store::new());

        let aof = Aof::open(&self.config.aof_path)
            .await
            .context("failed to open persistence log")?;
        let aof = Arc::new(aof);

        aof.replay(&store)
            .await
            .context("failed to replay persistence log")?;

        Arc::clone(&aof).spawn_fsync_task(Duration::from_millis(self.config.fsync_interval_ms));

        let listener = TcpListener::bind(("0.0.0.0", self.config.port))
            .await
            .with_context(|| format!("failed to bind port {}", self.config.port))?;

        info!(address = %listener.local_addr()?, "listening");

        serve(listener, CommandDispatcher::new(store, Some(aof))).await
    }
}

/// Accepts connections on `listener` and spawns one task per client.
pub async fn serve(listener: TcpListener, dispatcher: CommandDispatcher) -> anyhow::Result<()> {
    loop {
        match listener.accept().await {
            Ok((stream, address)) => {
                info!(client = %address, "accepted connection");

                let dispatcher = dispatcher.clone();
                tokio::spawn(async move {
                    handle_client_connection(stream, address.to_string(), dispatcher).await;
                });
            }
            Err(e) => {
                error!(error = %e, "failed to accept connection");
            }
        }
    }
}

pub fn version_info() -> String {
    format!(
        "Version:\t{}\nBuild time:\t{}",
        env!("CARGO_PKG_VERSION"),
        option_env!("BUILD_TIME").unwrap_or("unknown")
    )
}
