use mock_service::MockConfig;
use std::net::SocketAddr;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("mock_service=info,tower_http=info")),
        )
        .init();

    tokio::spawn(mock_service::throughput_task());

    let addr: SocketAddr = "0.0.0.0:4000".parse()?;
    mock_service::run(addr, MockConfig::with_default_users()).await
}
