mod app_config;
mod file_config;
mod loader;

pub use app_config::{AppConfig, EventsConfig, LogConfig, SlackConfig};
pub use loader::load;
