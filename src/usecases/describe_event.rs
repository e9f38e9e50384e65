use crate::{
    domain::events::SlackEvent,
    usecases::{contracts::Transport, error::GatewayError, gateway::Gateway},
};

/// Renders an event as one line, with channel and user ids resolved to names
/// where the gateway knows them. Direct conversations are not part of the
/// channel list and keep their raw id.
pub fn describe_event<T: Transport>(
    gateway: &mut Gateway<T>,
    event: &SlackEvent,
) -> Result<String, GatewayError> {
    let line = match event {
        SlackEvent::Message(message) => format!(
            "{} <{}> {}",
            channel_label(gateway, &message.channel)?,
            user_label(gateway, &message.user)?,
            message.text
        ),
        SlackEvent::MessageEdit(edit) => format!(
            "{} <{}> edited: {} -> {}",
            channel_label(gateway, &edit.current.channel)?,
            user_label(gateway, &edit.current.user)?,
            edit.previous.text,
            edit.current.text
        ),
        SlackEvent::MessageDelete(deleted) => {
            let message = deleted.message();
            format!(
                "{} <{}> deleted: {}",
                channel_label(gateway, &message.channel)?,
                user_label(gateway, &message.user)?,
                message.text
            )
        }
        SlackEvent::UserTyping(typing) => format!(
            "{} {} is typing",
            channel_label(gateway, &typing.channel)?,
            user_label(gateway, &typing.user)?
        ),
        SlackEvent::FileDeleted(file) => {
            if file.channel_ids.is_empty() {
                format!("file {} deleted", file.file_id)
            } else {
                let channels = file
                    .channel_ids
                    .iter()
                    .map(|id| channel_label(gateway, id))
                    .collect::<Result<Vec<_>, _>>()?;
                format!("file {} deleted from {}", file.file_id, channels.join(", "))
            }
        }
    };

    Ok(line)
}

fn channel_label<T: Transport>(
    gateway: &mut Gateway<T>,
    id: &str,
) -> Result<String, GatewayError> {
    match gateway.get_channel(id) {
        Ok(channel) => Ok(format!("#{}", channel.name())),
        Err(GatewayError::NotFound { .. }) => Ok(id.to_owned()),
        Err(error) => Err(error),
    }
}

fn user_label<T: Transport>(
    gateway: &mut Gateway<T>,
    id: &str,
) -> Result<String, GatewayError> {
    match gateway.get_user(id) {
        Ok(user) => Ok(user.name),
        Err(GatewayError::NotFound { .. }) => Ok(id.to_owned()),
        Err(error) => Err(error),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{
        domain::message::{FileDeleted, Message, MessageDelete, MessageEdit, UserTyping},
        test_support::ScriptedTransport,
    };

    fn known_world() -> ScriptedTransport {
        ScriptedTransport::new()
            .respond(
                "channels.list",
                json!({"ok": true, "channels": [{
                    "id": "C1",
                    "name_normalized": "general",
                    "purpose": {"value": ""},
                    "topic": {"value": ""},
                    "members": ["U1"]
                }]}),
            )
            .respond("groups.list", json!({"ok": true, "groups": []}))
            .respond_for(
                "users.info",
                "U1",
                json!({"ok": true, "user": {"id": "U1", "name": "alice", "profile": {}}}),
            )
            .respond("users.info", json!({"ok": false, "error": "user_not_found"}))
    }

    #[test]
    fn message_line_uses_channel_and_user_names() {
        let mut gateway = Gateway::new(known_world());
        let event = SlackEvent::Message(Message::new("C1", "U1", "hi all"));

        let line = describe_event(&mut gateway, &event).expect("describe should succeed");

        assert_eq!(line, "#general <alice> hi all");
    }

    #[test]
    fn unknown_ids_fall_back_to_raw_ids() {
        let mut gateway = Gateway::new(known_world());
        let event = SlackEvent::UserTyping(UserTyping {
            channel: "D42".to_owned(),
            user: "U9".to_owned(),
        });

        let line = describe_event(&mut gateway, &event).expect("describe should succeed");

        assert_eq!(line, "D42 U9 is typing");
    }

    #[test]
    fn edit_and_delete_show_old_content() {
        let mut gateway = Gateway::new(known_world());
        let edit = SlackEvent::MessageEdit(MessageEdit {
            previous: Message::new("C1", "U1", "teh"),
            current: Message::new("C1", "U1", "the"),
        });
        let delete = SlackEvent::MessageDelete(MessageDelete(Message::new("C1", "U1", "oops")));

        assert_eq!(
            describe_event(&mut gateway, &edit).expect("describe should succeed"),
            "#general <alice> edited: teh -> the"
        );
        assert_eq!(
            describe_event(&mut gateway, &delete).expect("describe should succeed"),
            "#general <alice> deleted: oops"
        );
    }

    #[test]
    fn file_deletion_lists_channels() {
        let mut gateway = Gateway::new(known_world());
        let event = SlackEvent::FileDeleted(FileDeleted {
            file_id: "F1".to_owned(),
            channel_ids: vec!["C1".to_owned(), "G9".to_owned()],
        });

        let line = describe_event(&mut gateway, &event).expect("describe should succeed");

        assert_eq!(line, "file F1 deleted from #general, G9");
    }

    #[test]
    fn failing_channel_listing_is_propagated() {
        let transport = ScriptedTransport::new()
            .respond("channels.list", json!({"ok": false, "error": "invalid_auth"}));
        let mut gateway = Gateway::new(transport);
        let event = SlackEvent::Message(Message::new("C1", "U1", "hi"));

        let err = describe_event(&mut gateway, &event).expect_err("must fail");

        assert!(matches!(err, GatewayError::Upstream { .. }));
    }
}
