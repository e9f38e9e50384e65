use crate::{infra::config::AppConfig, slack::SlackTransport, usecases::gateway::Gateway};

pub struct AppContext {
    pub config: AppConfig,
    pub gateway: Gateway<SlackTransport>,
}

impl AppContext {
    pub fn new(config: AppConfig, gateway: Gateway<SlackTransport>) -> Self {
        Self { config, gateway }
    }
}
