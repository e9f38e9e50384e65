use std::{
    io::{ErrorKind, Write},
    thread,
    time::Duration,
};

use anyhow::{Context, Result};

use crate::{
    cli::{Cli, Command},
    domain::{self, channel::Channel, user::User},
    infra, slack,
    usecases::{
        self, bootstrap, contracts::Transport, describe_event::describe_event, gateway::Gateway,
    },
};

const EVENT_STREAM_ENDED: &str = "EVENT_STREAM_ENDED";
const EVENT_OUTPUT_CLOSED: &str = "EVENT_OUTPUT_CLOSED";

pub fn run(cli: Cli) -> Result<()> {
    tracing::debug!(
        domain = domain::module_name(),
        slack = slack::module_name(),
        usecases = usecases::module_name(),
        infra = infra::module_name(),
        "module boundaries loaded"
    );

    let command = cli.command_or_default();
    let mut context = bootstrap::bootstrap(cli.config.as_deref())?;
    let gateway = &mut context.gateway;
    let mut out = std::io::stdout().lock();

    match command {
        Command::Events { limit } => {
            let idle = Duration::from_millis(context.config.events.idle_sleep_ms);
            let delivered = stream_events(gateway, idle, limit, &mut out)?;
            tracing::info!(code = EVENT_STREAM_ENDED, delivered, "event stream finished");
        }
        Command::Channels => {
            for channel in gateway.channels()? {
                writeln!(out, "{}", channel_line(channel))?;
            }
        }
        Command::Channel { id, name } => {
            let channel = match (id, name) {
                (Some(id), _) => gateway.get_channel(&id)?,
                (None, Some(name)) => gateway.get_channel_by_name(&name)?,
                (None, None) => anyhow::bail!("a channel id or --name is required"),
            };
            writeln!(out, "{}", channel_line(&channel))?;
            writeln!(out, "purpose: {}", channel.purpose.value)?;
            writeln!(out, "members: {}", channel.members.len())?;
        }
        Command::User { id } => {
            let user = gateway.get_user(&id)?;
            writeln!(out, "{}", user_line(&user))?;
        }
        Command::Send { channel, text } => {
            gateway
                .send_message(&channel, &text)
                .with_context(|| format!("failed to send message to {channel}"))?;
            tracing::info!(channel = %channel, "message sent");
        }
    }

    Ok(())
}

/// Writes one line per event until `limit` events were written or the stream ends.
/// Sleeps `idle` after every drained read cycle. A closed output cancels the
/// stream before its next read.
fn stream_events<T: Transport>(
    gateway: &mut Gateway<T>,
    idle: Duration,
    limit: Option<usize>,
    out: &mut impl Write,
) -> Result<usize> {
    let mut delivered = 0;
    let mut events = gateway.events();
    let cancel = events.cancel_handle();

    while !limit.is_some_and(|limit| delivered >= limit) {
        let Some(item) = events.next() else {
            break;
        };

        match item? {
            Some(_) if cancel.is_cancelled() => {}
            Some(event) => {
                tracing::debug!(kind = event.kind(), channel = event.channel(), "event received");
                let line = describe_event(events.gateway(), &event)?;
                match writeln!(out, "{line}") {
                    Ok(()) => delivered += 1,
                    Err(error) if error.kind() == ErrorKind::BrokenPipe => {
                        tracing::info!(
                            code = EVENT_OUTPUT_CLOSED,
                            "output closed; stopping stream"
                        );
                        cancel.cancel();
                    }
                    Err(error) => return Err(error.into()),
                }
            }
            None if cancel.is_cancelled() => {}
            None => thread::sleep(idle),
        }
    }

    Ok(delivered)
}

fn channel_line(channel: &Channel) -> String {
    format!("{}\t#{}\t{}", channel.id, channel.name(), channel.real_topic())
}

fn user_line(user: &User) -> String {
    let mut line = format!("{}\t{}\t{}", user.id, user.name, user.real_name());
    if user.is_admin {
        line.push_str("\tadmin");
    }
    line
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{
        domain::channel::Topic,
        test_support::ScriptedTransport,
        usecases::error::{GatewayError, TransportError},
    };

    fn workspace() -> ScriptedTransport {
        ScriptedTransport::new()
            .respond(
                "channels.list",
                json!({"ok": true, "channels": [{
                    "id": "C1",
                    "name_normalized": "general",
                    "purpose": {"value": ""},
                    "topic": {"value": "daily chatter"},
                    "members": ["U1"]
                }]}),
            )
            .respond("groups.list", json!({"ok": true, "groups": []}))
            .respond_for(
                "users.info",
                "U1",
                json!({"ok": true, "user": {"id": "U1", "name": "alice", "profile": {}}}),
            )
    }

    #[test]
    fn stream_events_stops_at_the_limit() {
        let transport = workspace()
            .with_read(Ok(vec![
                json!({"type": "hello"}),
                json!({"type": "message", "channel": "C1", "user": "U1", "text": "first"}),
            ]))
            .with_read(Ok(vec![]))
            .with_read(Ok(vec![
                json!({"type": "user_typing", "channel": "C1", "user": "U1"}),
                json!({"type": "message", "channel": "C1", "user": "U1", "text": "never"}),
            ]));
        let mut gateway = Gateway::new(transport);
        let mut out = Vec::new();

        let delivered = stream_events(&mut gateway, Duration::ZERO, Some(2), &mut out)
            .expect("stream should succeed");

        assert_eq!(delivered, 2);
        assert_eq!(
            String::from_utf8(out).expect("output is utf-8"),
            "#general <alice> first\n#general alice is typing\n"
        );
    }

    #[test]
    fn stream_events_with_zero_limit_reads_nothing() {
        let mut gateway = Gateway::new(ScriptedTransport::new());
        let mut out = Vec::new();

        let delivered = stream_events(&mut gateway, Duration::ZERO, Some(0), &mut out)
            .expect("stream should succeed");

        assert_eq!(delivered, 0);
        assert_eq!(gateway.transport().read_count(), 0);
    }

    #[test]
    fn stream_events_surfaces_unrecoverable_read_failure() {
        let transport = ScriptedTransport::new()
            .with_connects([true, false])
            .with_read(Err(TransportError::BrokenPipe("reset".to_owned())));
        let mut gateway = Gateway::new(transport);
        let mut out = Vec::new();

        let err =
            stream_events(&mut gateway, Duration::ZERO, None, &mut out).expect_err("must fail");

        assert_eq!(
            err.downcast_ref::<GatewayError>(),
            Some(&GatewayError::Transport(TransportError::BrokenPipe(
                "reset".to_owned()
            )))
        );
        assert!(out.is_empty());
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn closed_output_cancels_before_the_next_read() {
        let transport = workspace().with_read(Ok(vec![
            json!({"type": "message", "channel": "C1", "user": "U1", "text": "one"}),
            json!({"type": "message", "channel": "C1", "user": "U1", "text": "two"}),
        ]));
        let mut gateway = Gateway::new(transport);

        let delivered = stream_events(&mut gateway, Duration::ZERO, None, &mut ClosedPipe)
            .expect("closed output should end the stream cleanly");

        assert_eq!(delivered, 0);
        assert_eq!(gateway.transport().read_count(), 1);
    }

    #[test]
    fn channel_and_user_lines_are_tab_separated() {
        let channel = Channel {
            id: "C1".to_owned(),
            name_normalized: "general".to_owned(),
            purpose: Topic::new(""),
            topic: Topic::new("daily chatter"),
            members: Default::default(),
        };
        let user = User {
            id: "U1".to_owned(),
            name: "alice".to_owned(),
            profile: Default::default(),
            is_admin: true,
        };

        assert_eq!(channel_line(&channel), "C1\t#general\tdaily chatter");
        assert_eq!(user_line(&user), "U1\talice\tnoname\tadmin");
    }
}
