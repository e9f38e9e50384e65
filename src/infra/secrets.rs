use std::{
    env, fmt, fs,
    io::ErrorKind,
    panic,
    path::{Path, PathBuf},
};

use crate::infra::{config::SlackConfig, error::AppError, storage_layout::StorageLayout};

const TOKEN_ENV: &str = "SLACK_TOKEN";
const REDACTED: &str = "[REDACTED]";

const SENSITIVE_MARKERS: [&str; 4] = ["token", "secret", "password", "bearer"];
const SLACK_TOKEN_PREFIXES: [&str; 5] = ["xoxb-", "xoxp-", "xoxa-", "xoxs-", "xapp-"];

/// An API token. Never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct SlackToken(String);

impl SlackToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SlackToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SlackToken([REDACTED])")
    }
}

/// `SLACK_TOKEN` if set, otherwise the first line of the token file.
pub fn load_token(config: &SlackConfig) -> Result<SlackToken, AppError> {
    if let Some(token) = env::var(TOKEN_ENV)
        .ok()
        .and_then(|value| non_empty_token(&value))
    {
        tracing::debug!("using Slack token from environment");
        return Ok(token);
    }

    let path = match &config.token_file {
        Some(path) => path.clone(),
        None => StorageLayout::resolve()?.token_file(),
    };

    read_token_file(&path)
}

fn read_token_file(path: &Path) -> Result<SlackToken, AppError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(source) if source.kind() == ErrorKind::NotFound => {
            return Err(AppError::TokenMissing {
                path: path.to_path_buf(),
            })
        }
        Err(source) => {
            return Err(AppError::TokenRead {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    raw.lines()
        .next()
        .and_then(non_empty_token)
        .ok_or_else(|| AppError::TokenMissing {
            path: PathBuf::from(path),
        })
}

fn non_empty_token(line: &str) -> Option<SlackToken> {
    let trimmed = line.trim();
    (!trimmed.is_empty()).then(|| SlackToken::new(trimmed))
}

pub fn redact_text(input: &str) -> String {
    input
        .split_whitespace()
        .map(redact_chunk)
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn install_panic_redaction_hook() {
    panic::set_hook(Box::new(|panic_info| {
        let payload = panic_info
            .payload()
            .downcast_ref::<&str>()
            .map(ToString::to_string)
            .or_else(|| panic_info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "panic payload omitted".to_owned());

        let scrubbed = redact_text(&payload);

        match panic_info.location() {
            Some(location) => eprintln!(
                "slackgate panic: {} at {}:{}:{}",
                scrubbed,
                location.file(),
                location.line(),
                location.column()
            ),
            None => eprintln!("slackgate panic: {}", scrubbed),
        }
    }));
}

fn redact_chunk(chunk: &str) -> String {
    let lowered = chunk.to_ascii_lowercase();
    let sensitive = SENSITIVE_MARKERS
        .iter()
        .any(|marker| lowered.contains(marker))
        || SLACK_TOKEN_PREFIXES
            .iter()
            .any(|prefix| lowered.contains(prefix));

    if sensitive {
        REDACTED.to_owned()
    } else {
        chunk.to_owned()
    }
}
