use std::path::PathBuf;

use serde::Deserialize;

use crate::infra::config::{AppConfig, EventsConfig, LogConfig, SlackConfig};

#[derive(Debug, Deserialize, Default)]
pub struct FileConfig {
    pub logging: Option<FileLogConfig>,
    pub slack: Option<FileSlackConfig>,
    pub events: Option<FileEventsConfig>,
}

impl FileConfig {
    pub fn merge_into(self, config: &mut AppConfig) {
        if let Some(logging) = self.logging {
            logging.merge_into(&mut config.logging);
        }

        if let Some(slack) = self.slack {
            slack.merge_into(&mut config.slack);
        }

        if let Some(events) = self.events {
            events.merge_into(&mut config.events);
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileLogConfig {
    pub level: Option<String>,
}

impl FileLogConfig {
    fn merge_into(self, config: &mut LogConfig) {
        if let Some(level) = self.level {
            config.level = level;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileSlackConfig {
    pub api_base_url: Option<String>,
    pub token_file: Option<PathBuf>,
    pub request_timeout_ms: Option<u64>,
    pub read_timeout_ms: Option<u64>,
}

impl FileSlackConfig {
    fn merge_into(self, config: &mut SlackConfig) {
        if let Some(api_base_url) = self.api_base_url {
            config.api_base_url = api_base_url.trim_end_matches('/').to_owned();
        }

        if let Some(token_file) = self.token_file {
            config.token_file = Some(token_file);
        }

        if let Some(timeout_ms) = self.request_timeout_ms {
            config.request_timeout_ms = timeout_ms;
        }

        if let Some(timeout_ms) = self.read_timeout_ms {
            config.read_timeout_ms = timeout_ms;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileEventsConfig {
    pub idle_sleep_ms: Option<u64>,
    pub echo_unrecognized: Option<bool>,
}

impl FileEventsConfig {
    fn merge_into(self, config: &mut EventsConfig) {
        if let Some(idle_sleep_ms) = self.idle_sleep_ms {
            config.idle_sleep_ms = idle_sleep_ms;
        }

        if let Some(echo) = self.echo_unrecognized {
            config.echo_unrecognized = echo;
        }
    }
}
