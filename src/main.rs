use anyhow::Result;
use redis_lite::server::{CliError, RedisServer, version_info};

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let server = match RedisServer::new(std::env::args()) {
        Ok(server) => server,
        Err(CliError::InvalidArguments(e)) => e.exit(),
    };

    if server.config.version {
        println!("{}", version_info());
        return Ok(());
    }

    init_tracing();

    server.run().await
}
