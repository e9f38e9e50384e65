use std::{env, path::PathBuf};

use crate::infra::error::AppError;

const APP_DIR_NAME: &str = "slackgate";
const TOKEN_FILE_NAME: &str = "token";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLayout {
    pub config_dir: PathBuf,
}

impl StorageLayout {
    pub fn resolve() -> Result<Self, AppError> {
        let config_base = env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .ok_or_else(|| AppError::StoragePathResolution {
                details: "unable to resolve config base directory (XDG_CONFIG_HOME/HOME)".into(),
            })?;

        Ok(Self {
            config_dir: config_base.join(APP_DIR_NAME),
        })
    }

    pub fn token_file(&self) -> PathBuf {
        self.config_dir.join(TOKEN_FILE_NAME)
    }
}
