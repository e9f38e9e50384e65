use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AppConfig {
    pub logging: LogConfig,
    pub slack: SlackConfig,
    pub events: EventsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogConfig {
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SlackConfig {
    pub api_base_url: String,
    /// Overrides the token file location under the config directory.
    pub token_file: Option<PathBuf>,
    pub request_timeout_ms: u64,
    /// How long one realtime read waits for a frame before returning an empty batch.
    pub read_timeout_ms: u64,
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://slack.com/api".to_owned(),
            token_file: None,
            request_timeout_ms: 10_000,
            read_timeout_ms: 1_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventsConfig {
    /// Pause after each drained read cycle.
    pub idle_sleep_ms: u64,
    pub echo_unrecognized: bool,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            idle_sleep_ms: 500,
            echo_unrecognized: false,
        }
    }
}
