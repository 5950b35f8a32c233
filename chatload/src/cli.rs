//! Command line of the `chatload` binary.
use chatload_core::{ConfigError, Credential, TestConfig};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Simulates concurrent chat users and reports request latencies.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct ChatloadCli {
    /// JSON configuration file. Flags given on the command line take precedence.
    #[arg(short, long, env = "CHATLOAD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Base address of the chat service.
    #[arg(short, long, env = "CHATLOAD_BASE_URL")]
    pub base_url: Option<String>,

    /// Room the messages are posted to.
    #[arg(short, long)]
    pub room: Option<String>,

    /// Messages sent by every user.
    #[arg(short, long)]
    pub messages: Option<usize>,

    /// Simulated user, repeatable.
    #[arg(short, long = "user", value_name = "USERNAME:PASSWORD")]
    pub users: Vec<Credential>,

    #[arg(long)]
    pub min_delay_ms: Option<u64>,

    #[arg(long)]
    pub max_delay_ms: Option<u64>,

    /// Per-request timeout, e.g. `30s` or `500ms`.
    #[arg(short, long, value_parser = humantime::parse_duration)]
    pub timeout: Option<Duration>,

    /// Register every user before the run. Existing accounts are left alone.
    #[arg(long)]
    pub register: bool,
}

impl ChatloadCli {
    /// Layers defaults, the configuration file and the flags, then validates the result.
    pub fn test_config(&self) -> Result<TestConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => TestConfig::from_file(path)?,
            None => TestConfig::default(),
        };

        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(room) = &self.room {
            config.room_id = room.clone();
        }
        if let Some(messages) = self.messages {
            config.messages_per_user = messages;
        }
        if !self.users.is_empty() {
            config.users = self.users.clone();
        }
        if let Some(ms) = self.min_delay_ms {
            config.delay.min = Duration::from_millis(ms);
        }
        if let Some(ms) = self.max_delay_ms {
            config.delay.max = Duration::from_millis(ms);
        }
        if self.timeout.is_some() {
            config.request_timeout = self.timeout;
        }

        config.validate()?;
        Ok(config)
    }
}
