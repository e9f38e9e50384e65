use std::path::Path;

use crate::{
    infra::{self, config::AppConfig, error::AppError},
    slack::SlackTransport,
    usecases::{context::AppContext, gateway::Gateway},
};

pub fn bootstrap(config_path: Option<&Path>) -> Result<AppContext, AppError> {
    let config = infra::config::load(config_path)?;
    infra::logging::init(&config.logging)?;

    build_context(config)
}

fn build_context(config: AppConfig) -> Result<AppContext, AppError> {
    let token = infra::secrets::load_token(&config.slack)?;
    let transport = SlackTransport::new(&config.slack, token)?;
    let gateway = Gateway::new(transport).with_unrecognized_echo(config.events.echo_unrecognized);

    Ok(AppContext::new(config, gateway))
}
