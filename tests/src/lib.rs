//! Shared setup for the end-to-end tests against `mock-service`.
use chatload::prelude::*;
use mock_service::MockConfig;
use std::net::SocketAddr;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::error;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Installs logging and the panic hook once per test binary.
pub fn init() {
    static ONCE_LOCK: OnceLock<()> = OnceLock::new();

    ONCE_LOCK.get_or_init(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            default_panic(info);
            error!("Panic occurred: {info:?}");
        }));

        let _ = FmtSubscriber::builder()
            .with_env_filter(EnvFilter::new("chatload=debug,mock_service=debug"))
            .with_test_writer()
            .try_init();
    });
}

/// Boots a mock chat service on an ephemeral port and returns its base URL.
pub async fn start_mock(config: MockConfig) -> anyhow::Result<String> {
    init();
    let addr: SocketAddr = mock_service::spawn(config).await?;
    Ok(format!("http://{addr}"))
}

/// Configuration for a quick run: short pauses and a client timeout.
pub fn quick_config(base_url: &str, users: &[(&str, &str)], messages: usize) -> TestConfig {
    TestConfig {
        base_url: base_url.to_string(),
        room_id: "11".to_string(),
        messages_per_user: messages,
        users: users
            .iter()
            .map(|(username, password)| Credential::new(*username, *password))
            .collect(),
        delay: DelayRange::new(Duration::from_millis(1), Duration::from_millis(5)),
        request_timeout: Some(Duration::from_secs(5)),
    }
}

/// Number of messages the mock accepted into `room_id`.
pub async fn accepted_messages(base_url: &str, room_id: &str) -> anyhow::Result<u64> {
    let body: serde_json::Value = reqwest::get(format!("{base_url}/rooms/{room_id}/messages"))
        .await?
        .error_for_status()?
        .json()
        .await?;
    body["total"]
        .as_u64()
        .ok_or_else(|| anyhow::anyhow!("missing total in {body}"))
}
