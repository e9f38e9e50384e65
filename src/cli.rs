use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "slackgate", about = "Slack realtime events and lookups from the terminal")]
pub struct Cli {
    /// Path to config file (default: ./config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Stream realtime events, one line each
    Events {
        /// Stop after this many events
        #[arg(long)]
        limit: Option<usize>,
    },
    /// List public channels and private groups
    Channels,
    /// Show one channel by id or by name
    Channel {
        #[arg(required_unless_present = "name", conflicts_with = "name")]
        id: Option<String>,
        #[arg(long)]
        name: Option<String>,
    },
    /// Show one user by id
    User { id: String },
    /// Post a message to a channel as the authenticated user
    Send { channel: String, text: String },
}

impl Cli {
    pub fn command_or_default(&self) -> Command {
        self.command
            .clone()
            .unwrap_or(Command::Events { limit: None })
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Cli, Command};

    #[test]
    fn defaults_to_unlimited_events_when_command_is_missing() {
        let cli = Cli::parse_from(["slackgate"]);

        assert_eq!(cli.command_or_default(), Command::Events { limit: None });
    }

    #[test]
    fn parses_events_limit_and_config() {
        let cli = Cli::parse_from(["slackgate", "events", "--limit", "5", "--config", "custom.toml"]);

        assert_eq!(cli.command_or_default(), Command::Events { limit: Some(5) });
        assert_eq!(
            cli.config
                .as_deref()
                .map(|p| p.to_string_lossy().to_string()),
            Some("custom.toml".to_owned())
        );
    }

    #[test]
    fn channel_accepts_id_or_name_but_not_neither() {
        let by_id = Cli::parse_from(["slackgate", "channel", "C1"]);
        let by_name = Cli::parse_from(["slackgate", "channel", "--name", "general"]);

        assert_eq!(
            by_id.command_or_default(),
            Command::Channel {
                id: Some("C1".to_owned()),
                name: None
            }
        );
        assert_eq!(
            by_name.command_or_default(),
            Command::Channel {
                id: None,
                name: Some("general".to_owned())
            }
        );
        assert!(Cli::try_parse_from(["slackgate", "channel"]).is_err());
    }

    #[test]
    fn send_takes_channel_and_text() {
        let cli = Cli::parse_from(["slackgate", "send", "C1", "hello there"]);

        assert_eq!(
            cli.command_or_default(),
            Command::Send {
                channel: "C1".to_owned(),
                text: "hello there".to_owned()
            }
        );
    }
}
